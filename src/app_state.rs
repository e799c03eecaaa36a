use bevy::prelude::*;

/// Lifecycle of a simulation run.
///
/// `Finished` is terminal until a reset returns the lab to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum SimState {
    #[default]
    Idle,
    Running,
    Finished,
}
