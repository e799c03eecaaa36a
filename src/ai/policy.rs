//! Step policy: choose the agent's next cell for one simulation tick.
//!
//! Priority order: follow the shortest path while the goal is in sight, step
//! greedily toward it while it is within earshot, otherwise explore, biased
//! toward cells not visited yet in this run.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::ai::sensing::{SensingMode, perceive};
use crate::ai::{compute_path, manhattan};
use crate::grid::{Grid, Point};

/// Cells the agent has occupied during the current run.
pub type VisitedSet = HashSet<Point>;

/// Which branch of the policy decided the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepAction {
    /// The agent was already on the goal; nothing moved.
    Arrived,
    /// Followed the A* path with the goal in sight.
    Vision,
    /// Greedy step toward a goal within hearing range.
    Hearing,
    /// Random step, preferring unvisited neighbors.
    Explore,
    /// Fully enclosed; nothing moved.
    Stuck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Agent position after the tick.
    pub agent: Point,
    /// True when the agent stands on the goal after the tick.
    pub finished: bool,
    pub action: StepAction,
}

impl StepOutcome {
    pub fn moved(&self) -> bool {
        matches!(
            self.action,
            StepAction::Vision | StepAction::Hearing | StepAction::Explore
        )
    }
}

/// Run one tick of the policy against the given snapshot.
///
/// Marks the current agent cell as visited before choosing. Never fails:
/// a missing path falls through to hearing and then to exploration, and an
/// enclosed agent simply stays put.
pub fn step<R: Rng + ?Sized>(
    grid: &Grid,
    agent: Point,
    goal: Point,
    mode: SensingMode,
    hearing_radius: u32,
    visited: &mut VisitedSet,
    rng: &mut R,
) -> StepOutcome {
    if agent == goal {
        return StepOutcome {
            agent,
            finished: true,
            action: StepAction::Arrived,
        };
    }

    visited.insert(agent);
    let senses = perceive(grid, agent, goal, mode, hearing_radius);

    let chosen = senses
        .can_see
        .then(|| follow_path(grid, agent, goal))
        .flatten()
        .map(|next| (next, StepAction::Vision))
        .or_else(|| {
            senses
                .can_hear
                .then(|| approach_by_ear(grid, agent, goal, visited))
                .flatten()
                .map(|next| (next, StepAction::Hearing))
        })
        .or_else(|| explore(grid, agent, visited, rng).map(|next| (next, StepAction::Explore)));

    match chosen {
        Some((next, action)) => StepOutcome {
            agent: next,
            finished: next == goal,
            action,
        },
        None => StepOutcome {
            agent,
            finished: false,
            action: StepAction::Stuck,
        },
    }
}

/// Second waypoint of a fresh shortest path, if one exists.
fn follow_path(grid: &Grid, agent: Point, goal: Point) -> Option<Point> {
    let path = compute_path(grid, agent, goal)?;
    path.get(1).copied()
}

/// One step along each axis toward the goal; keep the open cells that
/// strictly close the distance, unvisited ones first.
fn approach_by_ear(grid: &Grid, agent: Point, goal: Point, visited: &VisitedSet) -> Option<Point> {
    let remaining = manhattan(&agent, &goal);
    let mut candidates: Vec<Point> = [
        Point::new(agent.row + (goal.row - agent.row).signum(), agent.col),
        Point::new(agent.row, agent.col + (goal.col - agent.col).signum()),
    ]
    .into_iter()
    .filter(|p| grid.is_open(*p) && manhattan(p, &goal) < remaining)
    .collect();

    // Stable: row-axis candidate wins ties.
    candidates.sort_by_key(|p| visited.contains(p));
    candidates.first().copied()
}

/// Uniformly random open neighbor, drawn from the unvisited ones when any.
fn explore<R: Rng + ?Sized>(
    grid: &Grid,
    agent: Point,
    visited: &VisitedSet,
    rng: &mut R,
) -> Option<Point> {
    let neighbors = grid.open_neighbors(agent);
    let unvisited: Vec<Point> = neighbors
        .iter()
        .copied()
        .filter(|n| !visited.contains(n))
        .collect();
    let pool = if unvisited.is_empty() {
        &neighbors
    } else {
        &unvisited
    };
    pool.choose(rng).copied()
}
