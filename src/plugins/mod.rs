pub mod control;
pub mod sandbox;
pub mod scheduler;
pub mod telemetry;

use bevy::prelude::*;

/// Frame ordering for the lab: edits land first, then control requests,
/// then the timed tick, so a tick always sees this frame's edits.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabSet {
    Edit,
    Control,
    Tick,
}
