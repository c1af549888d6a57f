use crate::{
    grid::{Encoding, Grid},
    rule::next_state,
};

/// Straightforward single-threaded engine: full second buffer, one pass per
/// generation, dead cells beyond the edges.
///
/// Slow on purpose; it is the yardstick the pool is checked against.
pub struct NaiveLife {
    cells_curr: Vec<bool>,
    cells_next: Vec<bool>,
    rows: usize,
    cols: usize,
}

impl NaiveLife {
    pub fn blank(rows: usize, cols: usize) -> Self {
        assert!(rows >= 1 && cols >= 1);
        let size = (rows + 2) * (cols + 2);
        Self {
            cells_curr: vec![false; size],
            cells_next: vec![false; size],
            rows,
            cols,
        }
    }

    pub fn from_grid<E: Encoding>(grid: &Grid<E>) -> Self {
        let mut result = Self::blank(grid.rows(), grid.cols());
        result.set_cells(&grid.cells());
        result
    }

    #[inline]
    fn idx(&self, y: usize, x: usize) -> usize {
        (y + 1) * (self.cols + 2) + x + 1
    }

    fn count_neibs(&self, y: usize, x: usize) -> u8 {
        let c = self.idx(y, x);
        let w = self.cols + 2;
        [c - w - 1, c - w, c - w + 1, c - 1, c + 1, c + w - 1, c + w, c + w + 1]
            .into_iter()
            .filter(|&i| self.cells_curr[i])
            .count() as u8
    }

    pub fn get(&self, y: usize, x: usize) -> bool {
        self.cells_curr[self.idx(y, x)]
    }

    pub fn set(&mut self, y: usize, x: usize, state: bool) {
        let i = self.idx(y, x);
        self.cells_curr[i] = state;
    }

    pub fn update(&mut self, n: usize) {
        for _ in 0..n {
            for y in 0..self.rows {
                for x in 0..self.cols {
                    let i = self.idx(y, x);
                    self.cells_next[i] = next_state(self.cells_curr[i], self.count_neibs(y, x));
                }
            }
            std::mem::swap(&mut self.cells_next, &mut self.cells_curr);
        }
    }

    /// Logical cells in row-major order.
    pub fn cells(&self) -> Vec<bool> {
        let mut result = Vec::with_capacity(self.rows * self.cols);
        for y in 0..self.rows {
            for x in 0..self.cols {
                result.push(self.get(y, x));
            }
        }
        result
    }

    pub fn set_cells(&mut self, states: &[bool]) {
        assert_eq!(states.len(), self.rows * self.cols);
        for (i, &state) in states.iter().enumerate() {
            self.set(i / self.cols, i % self.cols, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_is_still_life() {
        let mut life = NaiveLife::blank(4, 4);
        for (y, x) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            life.set(y, x, true);
        }
        let before = life.cells();
        life.update(5);
        assert_eq!(life.cells(), before);
    }

    #[test]
    fn test_corner_sees_dead_edges() {
        let mut life = NaiveLife::blank(3, 3);
        for (y, x) in [(0, 0), (0, 1), (1, 0)] {
            life.set(y, x, true);
        }
        life.update(1);
        // The L becomes a block; nothing wraps around.
        assert!(life.get(1, 1));
        assert!(!life.get(2, 2));
        assert_eq!(life.cells().iter().filter(|&&c| c).count(), 4);
    }
}
