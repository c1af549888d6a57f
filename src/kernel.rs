//! In-place update of a contiguous block of rows.
//!
//! A worker owns the storage of its rows and nothing else. Everything it has
//! to read outside of them, and everything inside them that it has already
//! overwritten, comes from three one-row buffers:
//!
//! - `above`: the pre-update state of the row above the one being updated;
//!   seeded from the grid before the generation starts, then carried over
//!   from `current` row after row.
//! - `current`: the pre-update state of the row being updated.
//! - `border`: the pre-update state of the row right below the block, which
//!   belongs to another worker (or to the grid border) and may already be
//!   overwritten by the time the last row of the block is reached.

use crate::{
    grid::{Encoding, Grid},
    rule::next_state,
};

pub struct RowBuffers<E: Encoding> {
    pub above: Vec<E::Unit>,
    pub current: Vec<E::Unit>,
    pub border: Vec<E::Unit>,
}

impl<E: Encoding> RowBuffers<E> {
    pub fn new(stride: usize) -> Self {
        Self {
            above: vec![E::Unit::default(); stride],
            current: vec![E::Unit::default(); stride],
            border: vec![E::Unit::default(); stride],
        }
    }

    /// One line per buffer with every physical cell as `0`/`1`.
    pub fn describe(&self, physical_cols: usize) -> String {
        let line = |row: &[E::Unit]| -> String {
            (0..physical_cols)
                .map(|x| if E::get(row, x) { '1' } else { '0' })
                .collect()
        };
        format!(
            "above:   {}\ncurrent: {}\nborder:  {}",
            line(&self.above),
            line(&self.current),
            line(&self.border)
        )
    }
}

/// Live cells at logical columns `x - 1`, `x`, `x + 1` of a copied row.
#[inline]
fn count_triple<E: Encoding>(row: &[E::Unit], x: isize) -> u8 {
    (x - 1..=x + 1)
        .filter(|&c| Grid::<E>::get_from_row_buffer(row, c))
        .count() as u8
}

/// Advances every row stored in `rows` by one generation.
///
/// `rows` holds whole physical rows of `stride` units each; `cols` is the
/// logical width. `buffers.above` must hold the row above the block and
/// `buffers.border` the row below it, both as of generation start.
pub fn update_rows<E: Encoding>(
    rows: &mut [E::Unit],
    stride: usize,
    cols: usize,
    buffers: &mut RowBuffers<E>,
) {
    debug_assert_eq!(rows.len() % stride, 0);
    let n = rows.len() / stride;

    for i in 0..n {
        let (head, tail) = rows.split_at_mut((i + 1) * stride);
        let dst = &mut head[i * stride..];
        buffers.current.copy_from_slice(dst);

        // Rows below `i` inside the block are still untouched this generation.
        let below: &[E::Unit] = if i + 1 < n {
            &tail[..stride]
        } else {
            &buffers.border
        };

        for x in 0..cols as isize {
            let neighbours = count_triple::<E>(&buffers.above, x)
                + Grid::<E>::get_from_row_buffer(&buffers.current, x - 1) as u8
                + Grid::<E>::get_from_row_buffer(&buffers.current, x + 1) as u8
                + count_triple::<E>(below, x);
            let alive = Grid::<E>::get_from_row_buffer(dst, x);
            Grid::<E>::set_in_row_buffer(dst, x, next_state(alive, neighbours));
        }

        std::mem::swap(&mut buffers.above, &mut buffers.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grid::{Dense, Grid, Packed},
        patterns::BLINKER,
    };

    /// Updates the whole grid as `parts` consecutive blocks, snapshotting
    /// every block's context first, the way the pool does.
    fn update_in_blocks<E: Encoding>(grid: &mut Grid<E>, parts: usize) {
        let (rows, cols, stride) = (grid.rows(), grid.cols(), grid.stride());
        let height = rows / parts;
        let mut buffers = (0..parts)
            .map(|k| {
                let mut b = RowBuffers::<E>::new(stride);
                grid.copy_row(&mut b.above, (k * height) as isize - 1);
                grid.copy_row(&mut b.border, ((k + 1) * height) as isize);
                b
            })
            .collect::<Vec<_>>();
        for (block, b) in grid
            .interior_mut()
            .chunks_mut(height * stride)
            .zip(buffers.iter_mut())
        {
            update_rows(block, stride, cols, b);
        }
    }

    fn check_blinker<E: Encoding>(parts: usize) {
        let mut grid = Grid::<E>::blank(6, 6).unwrap();
        grid.place(&BLINKER, 2, 1);
        let horizontal = grid.cells();

        update_in_blocks(&mut grid, parts);
        assert_eq!(grid.to_string(), "......\n..#...\n..#...\n..#...\n......\n......\n");

        update_in_blocks(&mut grid, parts);
        assert_eq!(grid.cells(), horizontal);
    }

    #[test]
    fn test_blinker_single_block() {
        check_blinker::<Dense>(1);
        check_blinker::<Packed>(1);
    }

    #[test]
    fn test_blinker_across_block_boundary() {
        // With 3 blocks of 2 rows the blinker's row is the last one of block 1
        // and its vertical phase spans blocks 0, 1 and 2.
        check_blinker::<Dense>(3);
        check_blinker::<Packed>(3);
    }

    #[test]
    fn test_lonely_cell_dies() {
        let mut grid = Grid::<Packed>::blank(4, 6).unwrap();
        grid.set(1, 2, true);
        update_in_blocks(&mut grid, 2);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn test_last_row_reads_border_snapshot() {
        // A horizontal triple right below the block is in the snapshot only;
        // the live row is cleared before the block is updated.
        let mut grid = Grid::<Packed>::blank(4, 6).unwrap();
        for x in 1..=3 {
            grid.set(2, x, true);
        }
        let stride = grid.stride();
        let mut buffers = RowBuffers::<Packed>::new(stride);
        grid.copy_row(&mut buffers.above, -1);
        grid.copy_row(&mut buffers.border, 2);
        for x in 1..=3 {
            grid.set(2, x, false);
        }

        let block = &mut grid.interior_mut()[..2 * stride];
        update_rows(block, stride, 6, &mut buffers);
        assert!(grid.get(1, 2));
        assert!(!grid.get(1, 1) && !grid.get(1, 3));
        assert!(!grid.get(0, 2));
    }

    #[test]
    fn test_describe_buffers() {
        let mut b = RowBuffers::<Dense>::new(4);
        b.current[1] = true;
        b.border[3] = true;
        assert_eq!(b.describe(4), "above:   0000\ncurrent: 0100\nborder:  0001");
    }
}
