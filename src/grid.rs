//! Occupancy grid for the lab sandbox.
//!
//! Cells are either open or walls and are addressed by `(row, col)` with the
//! origin at the top-left. Out-of-bounds queries answer "not inside" / "not
//! open" instead of failing, so callers can probe neighbors freely.

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Points and directions
// ---------------------------------------------------------------------------

/// A cell coordinate. Signed so that neighbors of edge cells can be formed
/// and then rejected by the bounds check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The adjacent point one step in `dir`.
    pub fn step(self, dir: Direction) -> Point {
        let (dr, dc) = dir.delta();
        Point::new(self.row + dr, self.col + dc)
    }
}

/// Cardinal direction for movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbor expansion order used by the planner and the explorer.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(row, col)` offset for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Open,
    Wall,
}

/// Fixed-size occupancy grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-open grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Open; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_inside(&self, p: Point) -> bool {
        self.index(p).is_some()
    }

    /// Inside the grid and not a wall.
    pub fn is_open(&self, p: Point) -> bool {
        self.cell_at(p) == Some(Cell::Open)
    }

    /// Inside the grid and a wall. Cells outside the grid are never walls.
    pub fn is_wall(&self, p: Point) -> bool {
        self.cell_at(p) == Some(Cell::Wall)
    }

    /// Get the cell at a position, or None if out of bounds.
    pub fn cell_at(&self, p: Point) -> Option<Cell> {
        self.index(p).map(|i| self.cells[i])
    }

    /// Turn a cell into a wall. Returns false if `p` is out of bounds.
    pub fn set_wall(&mut self, p: Point) -> bool {
        self.assign(p, Cell::Wall)
    }

    /// Turn a cell back into open floor. Returns false if `p` is out of bounds.
    pub fn clear_wall(&mut self, p: Point) -> bool {
        self.assign(p, Cell::Open)
    }

    /// Make every cell a wall with probability `density`, open otherwise.
    /// The density is clamped to `[0, 1]`; NaN counts as zero.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        let p = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };
        for cell in &mut self.cells {
            *cell = if rng.gen_bool(p) { Cell::Wall } else { Cell::Open };
        }
    }

    /// Open every cell.
    pub fn clear_all(&mut self) {
        self.cells.fill(Cell::Open);
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Wall).count()
    }

    /// Open 4-neighbors of `p`, in `Direction::ALL` order.
    pub fn open_neighbors(&self, p: Point) -> Vec<Point> {
        Direction::ALL
            .iter()
            .map(|d| p.step(*d))
            .filter(|n| self.is_open(*n))
            .collect()
    }

    /// ASCII rendering: `#` wall, `.` open, `*` path, `A` agent, `G` goal.
    pub fn render(&self, agent: Point, goal: Point, path: Option<&[Point]>) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                let p = Point::new(row, col);
                let ch = if p == agent {
                    'A'
                } else if p == goal {
                    'G'
                } else if self.is_wall(p) {
                    '#'
                } else if path.is_some_and(|path| path.contains(&p)) {
                    '*'
                } else {
                    '.'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.row < 0 || p.col < 0 {
            return None;
        }
        let (row, col) = (p.row as usize, p.col as usize);
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    fn assign(&mut self, p: Point, cell: Cell) -> bool {
        match self.index(p) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// ASCII layouts
// ---------------------------------------------------------------------------

/// A grid together with the agent and goal positions parsed from ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub grid: Grid,
    pub agent: Point,
    pub goal: Point,
}

impl Layout {
    /// Parse an ASCII layout.
    ///
    /// `#` is a wall, `.` or space is open floor, `A` marks the agent and `G`
    /// the goal (both on open floor). Short rows are padded with open floor.
    pub fn parse(text: &str) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err("Empty layout".to_string());
        }

        let rows = lines.len();
        let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if cols == 0 {
            return Err("Layout has zero width".to_string());
        }

        let mut grid = Grid::new(rows, cols);
        let mut agent = None;
        let mut goal = None;

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let p = Point::new(row as i32, col as i32);
                match ch {
                    '#' => {
                        grid.set_wall(p);
                    }
                    '.' | ' ' => {}
                    'A' => {
                        if agent.replace(p).is_some() {
                            return Err(format!("Multiple agents at ({}, {})", row, col));
                        }
                    }
                    'G' => {
                        if goal.replace(p).is_some() {
                            return Err(format!("Multiple goals at ({}, {})", row, col));
                        }
                    }
                    _ => {
                        return Err(format!(
                            "Unknown cell character '{}' at ({}, {})",
                            ch, row, col
                        ));
                    }
                }
            }
        }

        let agent = agent.ok_or("No agent ('A') found in layout")?;
        let goal = goal.ok_or("No goal ('G') found in layout")?;

        Ok(Layout { grid, agent, goal })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
