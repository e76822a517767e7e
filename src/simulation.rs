use crate::error::SimulationError;
use crate::grid::AggregationGrid;
use crate::settings::SimulationSettings;
use crate::walker::{ParticleWalker, WalkOutcome};
use rand::Rng;
use tracing::{debug, info};

/// Occupied coordinates of a finished run, seed included.
///
/// Cells are kept in column-major order (x outer, y inner) with no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    width: usize,
    height: usize,
    cells: Vec<(usize, usize)>,
}

impl ResultSet {
    /// Build a result set from loose cells. Every cell must lie inside `width` x `height`.
    pub fn new(
        width: usize,
        height: usize,
        mut cells: Vec<(usize, usize)>,
    ) -> Result<Self, SimulationError> {
        if let Some(&(x, y)) = cells.iter().find(|&&(x, y)| x >= width || y >= height) {
            return Err(SimulationError::CellOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        cells.sort_unstable();
        cells.dedup();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn from_grid(grid: &AggregationGrid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid.occupied_cells().collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[allow(dead_code)]
    pub fn contains(&self, cell: (usize, usize)) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    #[allow(dead_code)]
    pub fn into_cells(self) -> Vec<(usize, usize)> {
        self.cells
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub released: u64,
    pub stuck: u64,
    pub escaped: u64,
    pub walk_steps: u64,
}

/// Owns the grid for one run and releases particles until the target is met
pub struct SimulationDriver {
    settings: SimulationSettings,
    grid: AggregationGrid,
    walker: ParticleWalker,
    /// Particles that still have to stick
    remaining: usize,
    stats: RunStats,
    progress_interval: usize,
}

impl SimulationDriver {
    /// Seed a fresh grid. Rejects settings under which the target can never be reached.
    pub fn new(settings: SimulationSettings) -> Result<Self, SimulationError> {
        if settings.width < 3 || settings.height < 3 {
            return Err(SimulationError::GridTooSmall {
                width: settings.width,
                height: settings.height,
            });
        }

        let grid = AggregationGrid::new(settings.width, settings.height);
        let capacity = grid.sticking_capacity(settings.adjacency);
        if settings.target_count > capacity {
            return Err(SimulationError::TargetExceedsCapacity {
                target: settings.target_count,
                capacity,
                adjacency: settings.adjacency.name().to_string(),
            });
        }

        Ok(Self {
            walker: ParticleWalker::new(settings.adjacency),
            remaining: settings.target_count,
            stats: RunStats::default(),
            progress_interval: (settings.target_count / 10).max(1),
            grid,
            settings,
        })
    }

    pub fn grid(&self) -> &AggregationGrid {
        &self.grid
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Get run progress as a ratio (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.settings.target_count == 0 {
            return 1.0;
        }
        (self.settings.target_count - self.remaining) as f32 / self.settings.target_count as f32
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Pick a spawn uniformly over `[0, W-2] x [0, H-2]`
    fn spawn_position<R: Rng>(&self, rng: &mut R) -> (i64, i64) {
        (
            rng.gen_range(0..self.settings.width - 1) as i64,
            rng.gen_range(0..self.settings.height - 1) as i64,
        )
    }

    /// Release one particle at a random spawn. Returns `None` once the run is complete.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Option<WalkOutcome> {
        if self.is_complete() {
            return None;
        }
        let spawn = self.spawn_position(rng);
        self.release_at(spawn, rng)
    }

    /// Release one particle at a chosen position
    pub fn release_at<R: Rng>(&mut self, spawn: (i64, i64), rng: &mut R) -> Option<WalkOutcome> {
        if self.is_complete() {
            return None;
        }

        let outcome = self.walker.walk(&mut self.grid, spawn, rng);
        self.stats.released += 1;
        self.stats.walk_steps += outcome.steps;

        if outcome.stuck() {
            self.stats.stuck += 1;
            self.remaining -= 1;
            let done = self.settings.target_count - self.remaining;
            if done % self.progress_interval == 0 {
                debug!(
                    stuck = done,
                    target = self.settings.target_count,
                    progress = self.progress(),
                    released = self.stats.released,
                    escaped = self.stats.escaped,
                    "Aggregate growing"
                );
            }
        } else {
            self.stats.escaped += 1;
        }

        Some(outcome)
    }

    /// Run to completion and hand over the occupied cells
    pub fn run_with_rng<R: Rng>(mut self, rng: &mut R) -> ResultSet {
        info!(
            width = self.settings.width,
            height = self.settings.height,
            target = self.settings.target_count,
            adjacency = self.settings.adjacency.name(),
            "Starting DLA simulation"
        );

        while self.step(rng).is_some() {}

        let stats = self.stats();
        info!(
            cells = self.grid().occupied_count(),
            released = stats.released,
            stuck = stats.stuck,
            escaped = stats.escaped,
            walk_steps = stats.walk_steps,
            "Completed DLA simulation"
        );
        self.into_result()
    }

    pub fn run(self) -> ResultSet {
        self.run_with_rng(&mut rand::thread_rng())
    }

    pub fn into_result(self) -> ResultSet {
        ResultSet::from_grid(&self.grid)
    }
}

/// Grow an aggregate of `target_count` particles on a `width` x `height` grid
#[allow(dead_code)]
pub fn run(target_count: usize, width: usize, height: usize) -> Result<ResultSet, SimulationError> {
    let settings = SimulationSettings::new(width, height, target_count);
    Ok(SimulationDriver::new(settings)?.run())
}
