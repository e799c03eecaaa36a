//! Perception: line-of-sight and hearing tests between two cells.

use serde::{Deserialize, Serialize};

use crate::ai::manhattan;
use crate::grid::{Grid, Point};

/// Which senses the agent uses to locate the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensingMode {
    Vision,
    Hearing,
    #[default]
    Both,
}

impl SensingMode {
    pub fn uses_vision(self) -> bool {
        matches!(self, SensingMode::Vision | SensingMode::Both)
    }

    pub fn uses_hearing(self) -> bool {
        matches!(self, SensingMode::Hearing | SensingMode::Both)
    }
}

/// What the agent currently perceives of the goal. Senses disabled by the
/// mode always read false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Perception {
    pub can_see: bool,
    pub can_hear: bool,
}

pub fn perceive(
    grid: &Grid,
    agent: Point,
    goal: Point,
    mode: SensingMode,
    hearing_radius: u32,
) -> Perception {
    Perception {
        can_see: mode.uses_vision() && has_line_of_sight(grid, agent, goal),
        can_hear: mode.uses_hearing() && within_hearing(agent, goal, hearing_radius),
    }
}

/// Supercover Bresenham visibility test from `a` to `b`.
///
/// Every cell the line passes through, except `a` itself, must be open.
/// When a step moves along both axes the line crosses a lattice corner, and
/// the two cells brushed at that corner must be open too, so sight cannot
/// leak through a diagonal slit between two walls touching at a point.
/// Cells outside the grid never block.
pub fn has_line_of_sight(grid: &Grid, a: Point, b: Point) -> bool {
    let (mut x, mut y) = (a.col, a.row);
    let (x2, y2) = (b.col, b.row);

    let dx = (x2 - x).abs();
    let dy = (y2 - y).abs();
    let sx = if x < x2 { 1 } else { -1 };
    let sy = if y < y2 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        if (x, y) != (a.col, a.row) && grid.is_wall(Point::new(y, x)) {
            return false;
        }
        if x == x2 && y == y2 {
            return true;
        }

        let e2 = err;
        let moved_x = e2 > -dy;
        if moved_x {
            err -= dy;
            x += sx;
        }
        let moved_y = e2 < dx;
        if moved_y {
            err += dx;
            y += sy;
        }

        if moved_x && moved_y {
            let stepped_y_first = Point::new(y - sy, x);
            let stepped_x_first = Point::new(y, x - sx);
            if grid.is_wall(stepped_y_first) || grid.is_wall(stepped_x_first) {
                return false;
            }
        }
    }
}

/// Hearing ignores walls: only the Manhattan distance matters.
pub fn within_hearing(a: Point, b: Point, radius: u32) -> bool {
    manhattan(&a, &b) <= radius
}
