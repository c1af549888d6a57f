use crate::{
    grid::{Encoding, Grid},
    patterns::Pattern,
    pool::partition,
    Result,
};

/// Initial contents of a freshly built grid.
#[derive(Clone, Copy, Debug)]
pub enum Seed {
    Blank,
    /// Odd rows alive, even rows dead.
    AlternatingRows,
    /// `seed` - random seed (if `None`, then random seed is generated)
    Random { seed: Option<u64>, fill_rate: f64 },
    Pattern {
        pattern: &'static Pattern,
        row: usize,
        col: usize,
    },
}

impl Seed {
    pub fn apply<E: Encoding>(&self, grid: &mut Grid<E>) {
        match *self {
            Seed::Blank => {}
            Seed::AlternatingRows => grid.seed_alternating_rows(),
            Seed::Random { seed, fill_rate } => grid.randomize(seed, fill_rate),
            Seed::Pattern { pattern, row, col } => grid.place(pattern, row, col),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PoolConfig {
    pub rows: usize,
    pub cols: usize,
    pub workers: usize,
    pub seed: Seed,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_ROWS,
            cols: Self::DEFAULT_COLS,
            workers: Self::DEFAULT_WORKERS,
            seed: Seed::AlternatingRows,
        }
    }
}

impl PoolConfig {
    pub const DEFAULT_ROWS: usize = 144;
    /// Physical rows of 256 cells, so the packed encoding works too.
    pub const DEFAULT_COLS: usize = 254;
    pub const DEFAULT_WORKERS: usize = 4;

    pub const ENV_WORKERS: &'static str = "CONWAY_POOL_WORKERS";
    pub const ENV_ROWS: &'static str = "CONWAY_POOL_ROWS";
    pub const ENV_COLS: &'static str = "CONWAY_POOL_COLS";

    /// Defaults with overrides taken from the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Replaces dimensions and worker count with positive integers found by `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |var: &str| {
            let parsed = lookup(var)?.trim().parse::<usize>().ok()?;
            (parsed > 0).then_some(parsed)
        };
        if let Some(workers) = positive(Self::ENV_WORKERS) {
            self.workers = workers;
        }
        if let Some(rows) = positive(Self::ENV_ROWS) {
            self.rows = rows;
        }
        if let Some(cols) = positive(Self::ENV_COLS) {
            self.cols = cols;
        }
        self
    }

    /// Checks every construction precondition for encoding `E` without allocating.
    pub fn validate<E: Encoding>(&self) -> Result<()> {
        partition(self.rows, self.workers)?;
        if self.cols == 0 {
            return Err(crate::PoolError::EmptyGrid);
        }
        E::row_units(self.cols + 2 * Grid::<E>::BORDER)?;
        Ok(())
    }
}
