//! Control requests from the presentation layer (messages) and simulation
//! events triggered for it to observe.

use bevy::prelude::*;

use crate::ai::policy::StepAction;
use crate::grid::Point;

/// Run-loop requests.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabControl {
    /// Start the timed run loop.
    Run,
    /// Cancel the run loop; the current tick (if any) completes.
    Stop,
    /// Execute exactly one tick without starting the loop.
    Step,
    /// Stop, restore the starting agent and goal, forget visited cells.
    Reset,
}

/// Sandbox edits.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum GridEdit {
    Wall(Point),
    Erase(Point),
    PlaceAgent(Point),
    PlaceGoal(Point),
    /// Random walls with the given density in `[0, 1]`.
    Randomize(f64),
    ClearAll,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AgentMoved {
    pub from: Point,
    pub to: Point,
    pub action: StepAction,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GoalReached {
    pub ticks: u64,
}
