mod encoding;

pub use encoding::{Dense, Encoding, Packed};

use std::{fmt, marker::PhantomData};

use crate::{patterns::Pattern, PoolError, Result};

/// Rectangular field of `rows x cols` cells surrounded by a one-cell border.
///
/// Coordinates are logical: `(0, 0)` is the top-left cell of the field and
/// `-1`/`rows`/`cols` address the border. The border is allocated so that
/// neighbour reads never need an edge check; it stays dead unless somebody
/// writes it explicitly, and it is never part of [`Grid::cells`].
#[derive(Clone)]
pub struct Grid<E: Encoding> {
    data: Vec<E::Unit>,
    rows: usize,
    cols: usize,
    /// Storage units per physical row.
    stride: usize,
    _encoding: PhantomData<E>,
}

impl<E: Encoding> Grid<E> {
    pub const BORDER: usize = 1;

    /// Dead field of the given size.
    pub fn blank(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PoolError::EmptyGrid);
        }
        let stride = E::row_units(cols + 2 * Self::BORDER)?;
        Ok(Self {
            data: vec![E::Unit::default(); stride * (rows + 2 * Self::BORDER)],
            rows,
            cols,
            stride,
            _encoding: PhantomData,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Storage units in one physical row, border cells included.
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    fn row_offset(&self, row: isize) -> usize {
        debug_assert!(-1 <= row && row <= self.rows as isize, "row={}", row);
        (row + Self::BORDER as isize) as usize * self.stride
    }

    #[inline]
    fn physical_col(&self, col: isize) -> usize {
        debug_assert!(-1 <= col && col <= self.cols as isize, "col={}", col);
        (col + Self::BORDER as isize) as usize
    }

    /// Physical row `row`, border columns included.
    pub fn row(&self, row: isize) -> &[E::Unit] {
        let l = self.row_offset(row);
        &self.data[l..l + self.stride]
    }

    pub fn get(&self, row: isize, col: isize) -> bool {
        E::get(self.row(row), self.physical_col(col))
    }

    pub fn set(&mut self, row: isize, col: isize, state: bool) {
        let (l, c) = (self.row_offset(row), self.physical_col(col));
        E::set(&mut self.data[l..l + self.stride], c, state);
    }

    pub fn toggle(&mut self, row: isize, col: isize) {
        let state = self.get(row, col);
        self.set(row, col, !state);
    }

    /// Copies physical row `row` (border cells included) into `dst`.
    pub fn copy_row(&self, dst: &mut [E::Unit], row: isize) {
        dst.copy_from_slice(self.row(row));
    }

    /// Reads logical column `col` from a row previously taken with [`Grid::copy_row`].
    #[inline]
    pub fn get_from_row_buffer(row_buffer: &[E::Unit], col: isize) -> bool {
        E::get(row_buffer, (col + Self::BORDER as isize) as usize)
    }

    /// Writes logical column `col` of a single physical row.
    #[inline]
    pub fn set_in_row_buffer(row_buffer: &mut [E::Unit], col: isize, state: bool) {
        E::set(row_buffer, (col + Self::BORDER as isize) as usize, state);
    }

    /// Zeroed buffer able to hold one physical row.
    pub fn new_row_buffer(&self) -> Vec<E::Unit> {
        vec![E::Unit::default(); self.stride]
    }

    /// Storage of logical rows `0..rows`, row after row.
    pub(crate) fn interior_mut(&mut self) -> &mut [E::Unit] {
        let (begin, end) = (self.row_offset(0), self.row_offset(self.rows as isize));
        &mut self.data[begin..end]
    }

    /// Moves the storage out, leaving an empty husk behind.
    pub(crate) fn take(&mut self) -> Self {
        Self {
            data: std::mem::take(&mut self.data),
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
            _encoding: PhantomData,
        }
    }

    /// Every odd row alive, every even row dead.
    pub fn seed_alternating_rows(&mut self) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.set(y as isize, x as isize, y % 2 == 1);
            }
        }
    }

    pub fn randomize(&mut self, seed: Option<u64>, fill_rate: f64) {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = if let Some(x) = seed {
            ChaCha8Rng::seed_from_u64(x)
        } else {
            ChaCha8Rng::from_entropy()
        };
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.set(y as isize, x as isize, rng.gen_bool(fill_rate));
            }
        }
    }

    /// Sets the live cells of `pattern` with its top-left corner at `(row, col)`.
    ///
    /// Cells falling outside the field are dropped.
    pub fn place(&mut self, pattern: &Pattern, row: usize, col: usize) {
        for &(dy, dx) in pattern.cells {
            let (y, x) = (row + dy, col + dx);
            if y < self.rows && x < self.cols {
                self.set(y as isize, x as isize, true);
            }
        }
    }

    pub fn population(&self) -> usize {
        (0..self.rows as isize)
            .map(|y| (0..self.cols as isize).filter(|&x| self.get(y, x)).count())
            .sum()
    }

    /// Logical cells in row-major order, border excluded.
    pub fn cells(&self) -> Vec<bool> {
        let mut result = Vec::with_capacity(self.rows * self.cols);
        for y in 0..self.rows as isize {
            for x in 0..self.cols as isize {
                result.push(self.get(y, x));
            }
        }
        result
    }

    /// Inverse of [`Grid::cells`].
    pub fn set_cells(&mut self, states: &[bool]) {
        assert_eq!(states.len(), self.rows * self.cols);
        for (i, &state) in states.iter().enumerate() {
            self.set((i / self.cols) as isize, (i % self.cols) as isize, state);
        }
    }
}

impl<E: Encoding> fmt::Display for Grid<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.rows as isize {
            for x in 0..self.cols as isize {
                f.write_str(if self.get(y, x) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<E: Encoding> fmt::Debug for Grid<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("encoding", &E::NAME)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("population", &self.population())
            .finish()
    }
}
