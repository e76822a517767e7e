use crate::settings::Adjacency;

/// Fixed-size occupancy field for one aggregation run.
///
/// Cells are stored row-major. Queries take signed coordinates so a walker can
/// look past the edge: anything outside `0..width` x `0..height` reads as
/// empty and is never on the boundary ring. Occupied cells are never cleared.
#[derive(Debug, Clone)]
pub struct AggregationGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    occupied: usize,
}

impl AggregationGrid {
    /// Allocate a cleared `width` x `height` field and occupy the center seed
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Self {
            width,
            height,
            cells: vec![false; width * height],
            occupied: 0,
        };
        let (sx, sy) = grid.seed();
        grid.mark_occupied(sx as i64, sy as i64);
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The seed cell, `(width / 2, height / 2)`
    pub fn seed(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_some()
    }

    pub fn is_occupied(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_some_and(|idx| self.cells[idx])
    }

    /// True on the outermost ring of the grid
    pub fn is_boundary(&self, x: i64, y: i64) -> bool {
        self.contains(x, y)
            && (x == 0 || y == 0 || x == self.width as i64 - 1 || y == self.height as i64 - 1)
    }

    pub fn has_occupied_neighbor(&self, x: i64, y: i64, adjacency: Adjacency) -> bool {
        adjacency
            .offsets()
            .iter()
            .any(|&(dx, dy)| self.is_occupied(x + dx, y + dy))
    }

    /// Occupy a cell. Returns `false` if it was already occupied or lies outside the grid.
    pub fn mark_occupied(&mut self, x: i64, y: i64) -> bool {
        match self.index(x, y) {
            Some(idx) if !self.cells[idx] => {
                self.cells[idx] = true;
                self.occupied += 1;
                true
            }
            _ => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Occupied cells in column-major order (x outer, y inner)
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height)
                .filter(move |&y| self.cells[y * self.width + x])
                .map(move |y| (x, y))
        })
    }

    /// How many more particles could ever stick under `adjacency`.
    ///
    /// Particles only stick on interior cells. Diagonal adjacency confines
    /// growth to cells sharing the seed's `x + y` parity, and needs an
    /// interior at least two cells wide and tall to grow at all.
    pub fn sticking_capacity(&self, adjacency: Adjacency) -> usize {
        if self.width < 3 || self.height < 3 {
            return 0;
        }
        let inner_w = self.width - 2;
        let inner_h = self.height - 2;
        let (sx, sy) = self.seed();

        if adjacency.covers_full_lattice() {
            return inner_w * inner_h - 1;
        }
        if inner_w < 2 || inner_h < 2 {
            return 0;
        }

        let parity = (sx + sy) % 2;
        let same_parity = (1..=inner_w)
            .flat_map(|x| (1..=inner_h).map(move |y| (x, y)))
            .filter(|&(x, y)| (x + y) % 2 == parity)
            .count();
        same_parity - 1
    }
}
