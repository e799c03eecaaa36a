//! Agent AI: shortest-path planning, sensing, and the per-tick step policy.

pub mod policy;
pub mod sensing;

use crate::grid::{Grid, Point};

/// Waypoints from start to goal, both inclusive.
pub type Path = Vec<Point>;

/// Shortest 4-connected path from `start` to `goal` avoiding walls.
///
/// Returns None when either endpoint is not an open cell or the goal is
/// unreachable. Ties between equally scored frontier nodes are resolved by
/// the A* heap (deeper node first, then expansion order up/down/left/right),
/// which is deterministic for a given grid.
pub fn compute_path(grid: &Grid, start: Point, goal: Point) -> Option<Path> {
    if !grid.is_open(start) || !grid.is_open(goal) {
        return None;
    }
    pathfinding::prelude::astar(
        &start,
        |pos| grid.open_neighbors(*pos).into_iter().map(|n| (n, 1u32)),
        |pos| manhattan(pos, &goal),
        |pos| *pos == goal,
    )
    .map(|(steps, _cost)| steps)
}

/// Manhattan distance heuristic.
pub fn manhattan(a: &Point, b: &Point) -> u32 {
    (a.row - b.row).unsigned_abs() + (a.col - b.col).unsigned_abs()
}
