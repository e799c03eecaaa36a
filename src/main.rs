use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::init_thread_stream;
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::*;
use minilab::MiniLabPlugin;
use minilab::app_state::SimState;
use minilab::config::LabConfig;
use minilab::events::LabControl;
use minilab::resources::{Lab, LabStats, LabView};
use minilab::tracing_bridge::MicromegasBridgeLayer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

/// Frame pacing for the headless loop; ticks are paced by the lab's own timer.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() {
    // 1. Telemetry first so config errors are logged.
    //    Spans require MICROMEGAS_ENABLE_CPU_TRACING=true; logs and metrics
    //    always work.
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .expect("failed to initialize telemetry");

    // 2. Bridge Bevy schedule spans (emitted via `tracing`) into Micromegas.
    let log_layer = TracingCaptureLayer {
        max_level: LevelFilter::Info,
    };
    let subscriber = Registry::default()
        .with(MicromegasBridgeLayer::default())
        .with(log_layer);
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let config = match std::env::args().nth(1) {
        Some(path) => LabConfig::load(&path),
        None => Ok(LabConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("minilab: {}", e);
            std::process::exit(2);
        }
    };
    info!(
        "AI mini-lab starting: mode {:?}, hearing radius {}, tick {}ms",
        config.mode, config.hearing_radius, config.tick_interval_ms
    );

    // 3. Pre-init ComputeTaskPool with Micromegas thread callbacks, before
    //    App::new() so TaskPoolPlugin keeps this pool.
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(|| {
                init_thread_stream();
            })
            .on_thread_destroy(|| {
                micromegas_tracing::dispatch::flush_thread_buffer();
                micromegas_tracing::dispatch::unregister_thread_stream();
            })
            .build()
    });

    // 4. Run headless until the goal is reached or the tick budget runs out.
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_INTERVAL)))
        .add_plugins(StatesPlugin)
        .add_plugins(MiniLabPlugin { config })
        .add_systems(Startup, start_run)
        .add_systems(Last, exit_when_done)
        .run();
}

fn start_run(mut control: MessageWriter<LabControl>) {
    control.write(LabControl::Run);
}

fn exit_when_done(
    state: Res<State<SimState>>,
    lab: Res<Lab>,
    view: Res<LabView>,
    stats: Res<LabStats>,
    config: Res<LabConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    let finished = *state.get() == SimState::Finished;
    if !finished && stats.ticks < u64::from(config.max_ticks) {
        return;
    }

    let map = lab.grid.render(lab.agent, lab.goal, view.path.as_deref());
    info!("final grid:\n{}", map);
    let mut by_action: Vec<String> = stats
        .moves_by_action
        .iter()
        .map(|(action, count)| format!("{:?}: {}", action, count))
        .collect();
    by_action.sort();
    info!(
        "{} after {} ticks ({} moves; {})",
        if finished { "goal reached" } else { "tick budget exhausted" },
        stats.ticks,
        stats.moves(),
        by_action.join(", ")
    );
    exit.write(AppExit::Success);
}
