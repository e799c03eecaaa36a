//! Run/stop/step/reset requests driving the `SimState` machine.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::app_state::SimState;
use crate::events::LabControl;
use crate::plugins::LabSet;
use crate::plugins::scheduler::{TickTimer, advance};
use crate::resources::{Lab, LabRng, LabStats};

pub struct ControlPlugin;

impl Plugin for ControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_control.in_set(LabSet::Control));
        app.add_systems(OnEnter(SimState::Finished), announce_finish);
    }
}

/// Apply this frame's control requests in order.
///
/// Requests are folded over the state they would produce, so `Step` then
/// `Run` in one frame behaves like the two presses in sequence.
#[allow(clippy::too_many_arguments)]
#[span_fn]
fn handle_control(
    mut requests: MessageReader<LabControl>,
    state: Res<State<SimState>>,
    mut next_state: ResMut<NextState<SimState>>,
    mut lab: ResMut<Lab>,
    mut rng: ResMut<LabRng>,
    mut stats: ResMut<LabStats>,
    mut timer: ResMut<TickTimer>,
    mut commands: Commands,
) {
    let mut current = *state.get();

    for request in requests.read() {
        let target = match (*request, current) {
            (LabControl::Run, SimState::Idle) => {
                timer.reset();
                SimState::Running
            }
            (LabControl::Stop, SimState::Running) => SimState::Idle,
            (LabControl::Step, SimState::Idle | SimState::Running) => {
                let outcome = advance(&mut lab, &mut rng, &mut stats, &mut commands);
                if outcome.finished {
                    SimState::Finished
                } else {
                    current
                }
            }
            (LabControl::Reset, _) => {
                lab.reset();
                *stats = LabStats::default();
                SimState::Idle
            }
            (request, now) => {
                debug!("ignoring {:?} while {:?}", request, now);
                current
            }
        };

        if target != current {
            debug!("lab state {:?} -> {:?}", current, target);
            current = target;
        }
    }

    if current != *state.get() {
        next_state.set(current);
    }
}

fn announce_finish(lab: Res<Lab>, stats: Res<LabStats>) {
    info!(
        "goal ({}, {}) reached after {} ticks, {} cells visited",
        lab.goal.row,
        lab.goal.col,
        stats.ticks,
        lab.visited.len()
    );
}
