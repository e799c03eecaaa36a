//! Timed run loop: a repeating timer that ticks the lab while the
//! simulation is `Running`.
//!
//! Leaving `Running` (stop, reset or reaching the goal) is the cancellation:
//! the tick system is gated on the state, so no further ticks are scheduled.
//! A transition requested earlier in the frame already counts as leaving.

use std::time::Duration;

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::ai::policy::StepOutcome;
use crate::app_state::SimState;
use crate::events::{AgentMoved, GoalReached};
use crate::plugins::LabSet;
use crate::resources::{Lab, LabRng, LabStats};

pub struct SchedulerPlugin;

impl Plugin for SchedulerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            run_tick
                .in_set(LabSet::Tick)
                .run_if(in_state(SimState::Running).and(no_pending_transition)),
        );
    }
}

/// Interval between ticks of the run loop.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct TickTimer(pub Timer);

impl TickTimer {
    pub fn from_millis(ms: u64) -> Self {
        Self(Timer::new(Duration::from_millis(ms), TimerMode::Repeating))
    }
}

/// False once a control request or a finishing step has queued a state
/// change this frame.
fn no_pending_transition(next: Res<NextState<SimState>>) -> bool {
    matches!(*next, NextState::Unchanged)
}

/// Advance the lab by one tick when the timer fires.
#[span_fn]
fn run_tick(
    time: Res<Time>,
    mut timer: ResMut<TickTimer>,
    mut lab: ResMut<Lab>,
    mut rng: ResMut<LabRng>,
    mut stats: ResMut<LabStats>,
    mut next_state: ResMut<NextState<SimState>>,
    mut commands: Commands,
) {
    timer.tick(time.delta());
    if !timer.just_finished() {
        return;
    }

    let outcome = advance(&mut lab, &mut rng, &mut stats, &mut commands);
    if outcome.finished {
        next_state.set(SimState::Finished);
    }
}

/// One tick of the step policy plus bookkeeping. Shared by the run loop and
/// manual single steps.
pub(crate) fn advance(
    lab: &mut Lab,
    rng: &mut LabRng,
    stats: &mut LabStats,
    commands: &mut Commands,
) -> StepOutcome {
    span_scope!("lab_tick");
    imetric!("lab_tick", "count", 1);
    let from = lab.agent;
    let outcome = lab.tick(&mut rng.rng);
    let first_arrival = stats.record(&outcome);

    if outcome.moved() {
        commands.trigger(AgentMoved {
            from,
            to: outcome.agent,
            action: outcome.action,
        });
    }
    if first_arrival {
        commands.trigger(GoalReached { ticks: stats.ticks });
    }
    outcome
}
