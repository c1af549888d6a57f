use thiserror::Error;

/// Reasons a [`WorkerPool`](crate::WorkerPool) or [`Grid`](crate::Grid) could not be built.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("{rows} rows cannot be split evenly between {workers} workers")]
    RowsNotDivisible { rows: usize, workers: usize },

    #[error("physical row of {physical_cols} cells is not a multiple of {factor}")]
    RowNotByteAligned { physical_cols: usize, factor: usize },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PoolError>;
