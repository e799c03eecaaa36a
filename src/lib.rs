pub mod ai;
pub mod app_state;
pub mod config;
pub mod events;
pub mod grid;
pub mod plugins;
pub mod resources;
pub mod tracing_bridge;

use bevy::prelude::*;
use micromegas_tracing::prelude::*;

use app_state::SimState;
use config::LabConfig;
use events::{GridEdit, LabControl};
use plugins::LabSet;
use plugins::control::ControlPlugin;
use plugins::sandbox::SandboxPlugin;
use plugins::scheduler::{SchedulerPlugin, TickTimer};
use plugins::telemetry::TelemetryPlugin;
use resources::{Lab, LabRng, LabStats};

/// The grid lab: state machine, simulation context, run loop and sandbox
/// edits. Requires `StatesPlugin` (part of `DefaultPlugins`).
#[derive(Default)]
pub struct MiniLabPlugin {
    pub config: LabConfig,
}

impl Plugin for MiniLabPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SimState>();
        app.add_message::<LabControl>();
        app.add_message::<GridEdit>();
        app.configure_sets(
            Update,
            (LabSet::Edit, LabSet::Control, LabSet::Tick).chain(),
        );

        let mut rng = LabRng::new(self.config.seed);
        let built = self.config.clone().validated().and_then(|config| {
            let lab = Lab::from_config(&config, &mut rng.rng)?;
            Ok((config, lab))
        });
        let (config, lab) = match built {
            Ok(built) => built,
            Err(e) => {
                warn!("invalid lab config ({}), using defaults", e);
                (LabConfig::default(), default_lab())
            }
        };
        info!(
            "lab ready: {}x{} grid, {} walls, mode {:?}, seed {}",
            lab.grid.rows(),
            lab.grid.cols(),
            lab.grid.wall_count(),
            lab.mode,
            rng.seed
        );

        app.insert_resource(lab.view());
        app.insert_resource(lab);
        app.insert_resource(rng);
        app.insert_resource(TickTimer::from_millis(config.tick_interval_ms));
        app.insert_resource(config);
        app.init_resource::<LabStats>();

        app.add_plugins((SandboxPlugin, ControlPlugin, SchedulerPlugin, TelemetryPlugin));
    }
}

fn default_lab() -> Lab {
    let config = LabConfig::default();
    Lab::new(
        grid::Grid::new(config.rows, config.cols),
        config.agent,
        config.goal,
        config.mode,
        config.hearing_radius,
    )
}
