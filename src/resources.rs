use std::collections::HashMap;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ai::policy::{self, StepAction, StepOutcome, VisitedSet};
use crate::ai::sensing::{SensingMode, perceive};
use crate::ai::{Path, compute_path};
use crate::config::LabConfig;
use crate::grid::{Grid, Point};

// ---------------------------------------------------------------------------
// Simulation context
// ---------------------------------------------------------------------------

/// Everything one simulation run reads and mutates: the grid, the agent and
/// goal, the sensing setup and the visited memory.
///
/// The agent and goal cells are kept open; every edit that would wall them
/// over is refused and every relocation opens the destination cell.
#[derive(Resource, Debug, Clone)]
pub struct Lab {
    pub grid: Grid,
    pub agent: Point,
    pub goal: Point,
    pub mode: SensingMode,
    pub hearing_radius: u32,
    pub visited: VisitedSet,
    initial_agent: Point,
    initial_goal: Point,
}

impl Lab {
    /// `agent` and `goal` must lie inside `grid`; their cells are opened.
    pub fn new(
        mut grid: Grid,
        agent: Point,
        goal: Point,
        mode: SensingMode,
        hearing_radius: u32,
    ) -> Self {
        grid.clear_wall(agent);
        grid.clear_wall(goal);
        Self {
            grid,
            agent,
            goal,
            mode,
            hearing_radius,
            visited: VisitedSet::new(),
            initial_agent: agent,
            initial_goal: goal,
        }
    }

    pub fn from_config<R: Rng + ?Sized>(config: &LabConfig, rng: &mut R) -> Result<Self, String> {
        let layout = config.resolve_layout()?;
        let mut lab = Self::new(
            layout.grid,
            layout.agent,
            layout.goal,
            config.mode,
            config.hearing_radius,
        );
        if config.randomize_on_start {
            lab.randomize(config.wall_density, rng);
        }
        Ok(lab)
    }

    /// Advance one tick and move the agent to the chosen cell.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StepOutcome {
        let outcome = policy::step(
            &self.grid,
            self.agent,
            self.goal,
            self.mode,
            self.hearing_radius,
            &mut self.visited,
            rng,
        );
        self.agent = outcome.agent;
        outcome
    }

    pub fn at_goal(&self) -> bool {
        self.agent == self.goal
    }

    /// Wall off a cell. Refused on the agent and goal cells and out of bounds.
    pub fn place_wall(&mut self, p: Point) -> bool {
        if p == self.agent || p == self.goal {
            return false;
        }
        self.grid.set_wall(p)
    }

    pub fn erase(&mut self, p: Point) -> bool {
        self.grid.clear_wall(p)
    }

    /// Move the agent, opening the target cell and forgetting visited cells.
    pub fn place_agent(&mut self, p: Point) -> bool {
        if !self.grid.clear_wall(p) {
            return false;
        }
        self.agent = p;
        self.visited.clear();
        true
    }

    /// Move the goal, opening the target cell and forgetting visited cells.
    pub fn place_goal(&mut self, p: Point) -> bool {
        if !self.grid.clear_wall(p) {
            return false;
        }
        self.goal = p;
        self.visited.clear();
        true
    }

    /// Random walls at `density`, keeping the agent and goal cells open.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        self.grid.randomize(density, rng);
        self.grid.clear_wall(self.agent);
        self.grid.clear_wall(self.goal);
        self.visited.clear();
    }

    pub fn clear_walls(&mut self) {
        self.grid.clear_all();
        self.visited.clear();
    }

    /// Put the agent and goal back where the run started and forget visited
    /// cells. Walls are left as they are.
    pub fn reset(&mut self) {
        self.grid.clear_wall(self.initial_agent);
        self.grid.clear_wall(self.initial_goal);
        self.agent = self.initial_agent;
        self.goal = self.initial_goal;
        self.visited.clear();
    }

    /// Preview of the current state for the presentation layer.
    pub fn view(&self) -> LabView {
        let senses = perceive(
            &self.grid,
            self.agent,
            self.goal,
            self.mode,
            self.hearing_radius,
        );
        LabView {
            path: compute_path(&self.grid, self.agent, self.goal),
            can_see: senses.can_see,
            can_hear: senses.can_hear,
        }
    }
}

/// Read-back for the presentation layer: the shortest path overlay and
/// whether the goal is currently seen or heard. Refreshed whenever `Lab`
/// changes.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct LabView {
    pub path: Option<Path>,
    pub can_see: bool,
    pub can_hear: bool,
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// Seeded RNG shared by exploration and randomized grids, so a run is
/// reproducible from its seed.
#[derive(Resource)]
pub struct LabRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl LabRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

// ---------------------------------------------------------------------------
// Run stats
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Default)]
pub struct LabStats {
    pub ticks: u64,
    pub moves_by_action: HashMap<StepAction, u32>,
    /// Tick on which the goal was first reached in this run.
    pub finished_at: Option<u64>,
}

impl LabStats {
    /// Count a tick. Returns true the first time the run reaches the goal.
    pub fn record(&mut self, outcome: &StepOutcome) -> bool {
        self.ticks += 1;
        *self.moves_by_action.entry(outcome.action).or_insert(0) += 1;
        if outcome.finished && self.finished_at.is_none() {
            self.finished_at = Some(self.ticks);
            return true;
        }
        false
    }

    pub fn moves(&self) -> u32 {
        self.moves_by_action
            .iter()
            .filter(|(action, _)| !matches!(action, StepAction::Arrived | StepAction::Stuck))
            .map(|(_, count)| count)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
