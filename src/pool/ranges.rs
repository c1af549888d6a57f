use crate::{PoolError, Result};

/// Rows `[begin, end)` updated by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowRange {
    pub begin: usize,
    pub end: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Row right above the range, `-1` for the first worker.
    pub fn above(&self) -> isize {
        self.begin as isize - 1
    }

    /// Row right below the range, `rows` for the last worker.
    pub fn below(&self) -> isize {
        self.end as isize
    }
}

/// Splits `[0, rows)` into `workers` equal contiguous ranges.
pub fn partition(rows: usize, workers: usize) -> Result<Vec<RowRange>> {
    if workers == 0 {
        return Err(PoolError::ZeroWorkers);
    }
    if rows == 0 {
        return Err(PoolError::EmptyGrid);
    }
    if rows % workers != 0 {
        return Err(PoolError::RowsNotDivisible { rows, workers });
    }
    let height = rows / workers;
    Ok((0..workers)
        .map(|k| RowRange {
            begin: k * height,
            end: (k + 1) * height,
        })
        .collect())
}
