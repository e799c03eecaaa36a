//! Tick-level telemetry: move metrics and run summaries via Micromegas.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use crate::ai::policy::StepAction;
use crate::app_state::SimState;
use crate::events::{AgentMoved, GoalReached};
use crate::resources::{Lab, LabView};

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_agent_moved);
        app.add_observer(on_goal_reached);
        app.add_systems(
            Last,
            run_telemetry.run_if(in_state(SimState::Running)),
        );
    }
}

fn on_agent_moved(trigger: On<AgentMoved>) {
    let moved = trigger.event();
    match moved.action {
        StepAction::Vision => {
            imetric!("lab_moves_vision", "count", 1);
        }
        StepAction::Hearing => {
            imetric!("lab_moves_hearing", "count", 1);
        }
        _ => {
            imetric!("lab_moves_explore", "count", 1);
        }
    }
    debug!(
        "agent ({}, {}) -> ({}, {}) by {:?}",
        moved.from.row, moved.from.col, moved.to.row, moved.to.col, moved.action
    );
}

fn on_goal_reached(trigger: On<GoalReached>) {
    let ticks = trigger.event().ticks;
    imetric!("lab_ticks_to_goal", "count", ticks);
    info!("goal reached in {} ticks", ticks);
}

fn run_telemetry(lab: Res<Lab>, view: Res<LabView>) {
    span_scope!("lab_frame");
    imetric!("lab_visited", "count", lab.visited.len() as u64);
    let path_len = view.path.as_ref().map_or(0, |p| p.len() as u64);
    imetric!("lab_path_len", "count", path_len);
}
