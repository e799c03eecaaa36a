//! Lab configuration, loaded from JSON.
//!
//! Every field has a default matching the interactive demo (18x30 grid, agent
//! at (2,2), goal at (12,24), both senses, hearing radius 6, 110ms ticks), so
//! a config file only needs the fields it changes.

use bevy::prelude::*;
use micromegas_tracing::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::sensing::SensingMode;
use crate::grid::{Grid, Layout, Point};

/// Hearing radii outside this range are clamped.
pub const HEARING_RADIUS_RANGE: std::ops::RangeInclusive<u32> = 1..=12;

/// Largest accepted row or column count.
pub const MAX_GRID_SIDE: usize = 1024;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    pub rows: usize,
    pub cols: usize,
    pub agent: Point,
    pub goal: Point,
    pub mode: SensingMode,
    pub hearing_radius: u32,
    /// Wall probability used by randomized grids.
    pub wall_density: f64,
    /// Fill the grid with random walls before the first tick.
    pub randomize_on_start: bool,
    pub tick_interval_ms: u64,
    pub seed: u64,
    /// Tick budget for the headless runner.
    pub max_ticks: u32,
    /// ASCII layout (see `Layout::parse`). Overrides the dimensions and the
    /// agent and goal positions when present.
    pub layout: Option<String>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            rows: 18,
            cols: 30,
            agent: Point::new(2, 2),
            goal: Point::new(12, 24),
            mode: SensingMode::Both,
            hearing_radius: 6,
            wall_density: 0.2,
            randomize_on_start: false,
            tick_interval_ms: 110,
            seed: 42,
            max_ticks: 2000,
            layout: None,
        }
    }
}

impl LabConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &str) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path, e))?;
        Self::from_json(&text).map_err(|e| format!("Invalid config {}: {}", path, e))
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: LabConfig = serde_json::from_str(text).map_err(|e| e.to_string())?;
        config.validated()
    }

    /// Check the config for values the simulation cannot run with.
    /// An out-of-range hearing radius is clamped rather than rejected.
    pub fn validated(mut self) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(format!(
                "wall_density must be within [0, 1], got {}",
                self.wall_density
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }

        let clamped = self
            .hearing_radius
            .clamp(*HEARING_RADIUS_RANGE.start(), *HEARING_RADIUS_RANGE.end());
        if clamped != self.hearing_radius {
            warn!(
                "hearing_radius {} out of range, clamped to {}",
                self.hearing_radius, clamped
            );
            self.hearing_radius = clamped;
        }

        self.resolve_layout()?;
        Ok(self)
    }

    /// Build the starting grid, agent and goal: from the ASCII layout if
    /// one is given, otherwise an open grid of the configured size.
    pub fn resolve_layout(&self) -> Result<Layout, String> {
        let layout = match &self.layout {
            Some(text) => Layout::parse(text)?,
            None => self.sized_layout()?,
        };
        let (rows, cols) = (layout.grid.rows(), layout.grid.cols());
        if rows > MAX_GRID_SIDE || cols > MAX_GRID_SIDE {
            return Err(format!(
                "grid {}x{} exceeds the {}x{} limit",
                rows, cols, MAX_GRID_SIDE, MAX_GRID_SIDE
            ));
        }
        Ok(layout)
    }

    fn sized_layout(&self) -> Result<Layout, String> {
        if self.rows == 0 || self.cols == 0 {
            return Err(format!(
                "grid must be non-empty, got {}x{}",
                self.rows, self.cols
            ));
        }
        if self.rows > MAX_GRID_SIDE || self.cols > MAX_GRID_SIDE {
            return Err(format!(
                "grid {}x{} exceeds the {}x{} limit",
                self.rows, self.cols, MAX_GRID_SIDE, MAX_GRID_SIDE
            ));
        }
        let grid = Grid::new(self.rows, self.cols);
        for (name, p) in [("agent", self.agent), ("goal", self.goal)] {
            if !grid.is_inside(p) {
                return Err(format!(
                    "{} ({}, {}) is outside the {}x{} grid",
                    name, p.row, p.col, self.rows, self.cols
                ));
            }
        }
        Ok(Layout {
            grid,
            agent: self.agent,
            goal: self.goal,
        })
    }
}
