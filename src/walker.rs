use crate::grid::AggregationGrid;
use crate::settings::Adjacency;
use rand::Rng;

/// Lifecycle state of a single particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Wandering,
    Stuck,
    Escaped,
}

/// How a particle's walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Either `Stuck` or `Escaped`
    pub state: WalkState,
    /// Final position (the new cluster cell when stuck)
    pub position: (i64, i64),
    /// Random steps taken before resolution
    pub steps: u64,
}

impl WalkOutcome {
    pub fn stuck(&self) -> bool {
        self.state == WalkState::Stuck
    }
}

/// Classify a position without mutating the grid.
///
/// The boundary (or anywhere past it) is checked before the cluster, so a
/// particle on the outer ring escapes even when it touches the aggregate.
/// A particle sitting on an occupied cell cannot stick there and keeps wandering.
pub fn evaluate(grid: &AggregationGrid, (x, y): (i64, i64), adjacency: Adjacency) -> WalkState {
    if !grid.contains(x, y) || grid.is_boundary(x, y) {
        WalkState::Escaped
    } else if !grid.is_occupied(x, y) && grid.has_occupied_neighbor(x, y, adjacency) {
        WalkState::Stuck
    } else {
        WalkState::Wandering
    }
}

/// One lattice step: each axis moves by -1, 0 or +1 independently
pub fn random_step<R: Rng>((x, y): (i64, i64), rng: &mut R) -> (i64, i64) {
    (x + rng.gen_range(-1..=1), y + rng.gen_range(-1..=1))
}

/// Drives one particle from spawn until it sticks or escapes
pub struct ParticleWalker {
    adjacency: Adjacency,
}

impl ParticleWalker {
    pub fn new(adjacency: Adjacency) -> Self {
        Self { adjacency }
    }

    /// Walk a particle released at `spawn`. On `Stuck` the grid gains exactly one cell.
    pub fn walk<R: Rng>(
        &self,
        grid: &mut AggregationGrid,
        spawn: (i64, i64),
        rng: &mut R,
    ) -> WalkOutcome {
        let mut position = spawn;
        let mut steps = 0u64;

        loop {
            match evaluate(grid, position, self.adjacency) {
                WalkState::Wandering => {
                    position = random_step(position, rng);
                    steps += 1;
                }
                WalkState::Stuck => {
                    grid.mark_occupied(position.0, position.1);
                    return WalkOutcome {
                        state: WalkState::Stuck,
                        position,
                        steps,
                    };
                }
                WalkState::Escaped => {
                    return WalkOutcome {
                        state: WalkState::Escaped,
                        position,
                        steps,
                    };
                }
            }
        }
    }
}
