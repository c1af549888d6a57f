#![warn(clippy::all)]

mod config;
mod error;
pub mod grid;
pub mod kernel;
pub mod patterns;
mod pool;
pub mod reference;
pub mod rule;
mod utils;

pub use config::{PoolConfig, Seed};
pub use error::{PoolError, Result};
pub use grid::{Dense, Encoding, Grid, Packed};
pub use pool::{partition, RowRange, WorkerPool};
pub use utils::NiceInt;
