//! Integration tests for the full lab plugin: run loop, manual steps,
//! sandbox edits and resets in a headless app.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use minilab::MiniLabPlugin;
use minilab::ai::policy::StepAction;
use minilab::ai::sensing::SensingMode;
use minilab::app_state::SimState;
use minilab::config::LabConfig;
use minilab::events::{GoalReached, GridEdit, LabControl};
use minilab::grid::Point;
use minilab::resources::{Lab, LabStats, LabView};

#[derive(Resource, Default)]
struct Arrivals(Vec<u64>);

fn corridor_config() -> LabConfig {
    LabConfig {
        rows: 5,
        cols: 5,
        agent: Point::new(0, 0),
        goal: Point::new(0, 4),
        mode: SensingMode::Vision,
        ..Default::default()
    }
}

fn setup_app(config: LabConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(120)));
    app.add_plugins(MiniLabPlugin { config });
    app.init_resource::<Arrivals>();
    app.add_observer(|trigger: On<GoalReached>, mut arrivals: ResMut<Arrivals>| {
        arrivals.0.push(trigger.event().ticks);
    });
    app.finish();
    app.cleanup();
    app
}

fn send<M: Message>(app: &mut App, message: M) {
    app.world_mut().write_message(message);
    app.update();
}

fn state(app: &App) -> SimState {
    *app.world().resource::<State<SimState>>().get()
}

fn run_until_finished(app: &mut App, max_updates: usize) -> bool {
    for _ in 0..max_updates {
        app.update();
        if state(app) == SimState::Finished {
            return true;
        }
    }
    false
}

#[test]
fn plugin_starts_idle_with_preview() {
    let mut app = setup_app(corridor_config());
    app.update();

    assert_eq!(state(&app), SimState::Idle);
    let view = app.world().resource::<LabView>();
    assert_eq!(view.path.as_ref().map(|p| p.len()), Some(5));
    assert!(view.can_see);
}

#[test]
fn run_loop_reaches_goal_once() {
    let mut app = setup_app(corridor_config());
    send(&mut app, LabControl::Run);

    assert!(run_until_finished(&mut app, 30));
    for _ in 0..5 {
        app.update();
    }

    assert_eq!(app.world().resource::<Lab>().agent, Point::new(0, 4));
    assert_eq!(app.world().resource::<LabStats>().ticks, 4);
    assert_eq!(app.world().resource::<Arrivals>().0, vec![4]);
}

#[test]
fn manual_steps_do_not_start_loop() {
    let mut app = setup_app(corridor_config());
    send(&mut app, LabControl::Step);
    for _ in 0..5 {
        app.update();
    }

    assert_eq!(state(&app), SimState::Idle);
    assert_eq!(app.world().resource::<Lab>().agent, Point::new(0, 1));
}

#[test]
fn edits_apply_before_the_next_tick() {
    let mut app = setup_app(corridor_config());
    // Same frame: wall the corridor, then step.
    app.world_mut().write_message(GridEdit::Wall(Point::new(0, 1)));
    app.world_mut().write_message(LabControl::Step);
    app.update();

    let lab = app.world().resource::<Lab>();
    assert!(lab.grid.is_wall(Point::new(0, 1)));
    assert_eq!(lab.agent, Point::new(1, 0));
}

#[test]
fn reset_after_finish_allows_another_run() {
    let mut app = setup_app(corridor_config());
    send(&mut app, LabControl::Run);
    assert!(run_until_finished(&mut app, 30));

    send(&mut app, LabControl::Reset);
    app.update();
    assert_eq!(state(&app), SimState::Idle);
    assert_eq!(app.world().resource::<Lab>().agent, Point::new(0, 0));
    assert_eq!(app.world().resource::<LabStats>().ticks, 0);

    send(&mut app, LabControl::Run);
    assert!(run_until_finished(&mut app, 30));
    assert_eq!(app.world().resource::<Arrivals>().0, vec![4, 4]);
}

#[test]
fn relocating_goal_mid_run_redirects_agent() {
    let mut app = setup_app(corridor_config());
    send(&mut app, LabControl::Run);
    send(&mut app, GridEdit::PlaceGoal(Point::new(4, 0)));

    assert!(run_until_finished(&mut app, 50));
    assert_eq!(app.world().resource::<Lab>().agent, Point::new(4, 0));
}

#[test]
fn random_maze_run_terminates_or_exhausts_budget() {
    let config = LabConfig {
        randomize_on_start: true,
        wall_density: 0.2,
        seed: 1234,
        ..Default::default()
    };
    let mut app = setup_app(config);
    {
        let lab = app.world().resource::<Lab>();
        assert!(lab.grid.wall_count() > 0);
        assert!(lab.grid.is_open(lab.agent));
        assert!(lab.grid.is_open(lab.goal));
    }

    send(&mut app, LabControl::Run);
    for _ in 0..300 {
        app.update();
    }

    let stats = app.world().resource::<LabStats>();
    let lab = app.world().resource::<Lab>();
    assert!(stats.ticks > 0 && stats.ticks <= 300);
    assert!(lab.grid.is_open(lab.agent));
    assert_eq!(stats.finished_at.is_some(), lab.at_goal());
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let config = LabConfig {
        layout: Some("no markers here".to_string()),
        ..Default::default()
    };
    let app = setup_app(config);
    let lab = app.world().resource::<Lab>();
    assert_eq!(lab.grid.rows(), 18);
    assert_eq!(lab.grid.cols(), 30);
}

fn long_corridor_config() -> LabConfig {
    LabConfig {
        rows: 5,
        cols: 9,
        agent: Point::new(0, 0),
        goal: Point::new(0, 8),
        mode: SensingMode::Vision,
        ..Default::default()
    }
}

#[test]
fn reset_mid_run_leaves_no_extra_tick() {
    let mut app = setup_app(long_corridor_config());
    send(&mut app, LabControl::Run);
    for _ in 0..4 {
        app.update();
    }
    assert!(app.world().resource::<LabStats>().ticks > 0);

    send(&mut app, LabControl::Reset);
    for _ in 0..3 {
        app.update();
    }

    assert_eq!(state(&app), SimState::Idle);
    let lab = app.world().resource::<Lab>();
    assert_eq!(lab.agent, Point::new(0, 0));
    assert!(lab.visited.is_empty());
    assert_eq!(app.world().resource::<LabStats>().ticks, 0);
}

#[test]
fn stop_mid_run_freezes_the_lab() {
    let mut app = setup_app(long_corridor_config());
    send(&mut app, LabControl::Run);
    for _ in 0..3 {
        app.update();
    }
    let agent = app.world().resource::<Lab>().agent;
    let visited = app.world().resource::<Lab>().visited.clone();
    let ticks = app.world().resource::<LabStats>().ticks;
    assert!(ticks > 0);

    send(&mut app, LabControl::Stop);
    for _ in 0..5 {
        app.update();
    }

    assert_eq!(state(&app), SimState::Idle);
    let lab = app.world().resource::<Lab>();
    assert_eq!(lab.agent, agent);
    assert_eq!(lab.visited, visited);
    assert_eq!(app.world().resource::<LabStats>().ticks, ticks);
}

#[test]
fn finishing_step_while_running_is_the_last_tick() {
    let mut app = setup_app(corridor_config());
    for _ in 0..3 {
        send(&mut app, LabControl::Step);
    }
    assert_eq!(app.world().resource::<Lab>().agent, Point::new(0, 3));

    send(&mut app, LabControl::Run);
    // Running from this frame on; the step lands on the goal.
    send(&mut app, LabControl::Step);
    app.update();

    assert_eq!(state(&app), SimState::Finished);
    let stats = app.world().resource::<LabStats>();
    assert_eq!(stats.ticks, 4);
    assert_eq!(stats.finished_at, Some(4));
    assert!(!stats.moves_by_action.contains_key(&StepAction::Arrived));
}

#[test]
fn plugin_clamps_hearing_radius() {
    let config = LabConfig {
        hearing_radius: 40,
        ..Default::default()
    };
    let app = setup_app(config);
    assert_eq!(app.world().resource::<Lab>().hearing_radius, 12);
    assert_eq!(app.world().resource::<LabConfig>().hearing_radius, 12);
}

#[test]
fn plugin_rejects_invalid_density_and_interval() {
    for config in [
        LabConfig {
            rows: 5,
            cols: 5,
            agent: Point::new(0, 0),
            goal: Point::new(4, 4),
            wall_density: 5.0,
            ..Default::default()
        },
        LabConfig {
            rows: 5,
            cols: 5,
            agent: Point::new(0, 0),
            goal: Point::new(4, 4),
            tick_interval_ms: 0,
            ..Default::default()
        },
    ] {
        let app = setup_app(config);
        let lab = app.world().resource::<Lab>();
        assert_eq!(lab.grid.rows(), 18);
        assert_eq!(lab.grid.cols(), 30);
        assert_eq!(*app.world().resource::<LabConfig>(), LabConfig::default());
    }
}
