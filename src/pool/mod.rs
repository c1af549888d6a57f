mod ranges;
mod worker;

pub use ranges::{partition, RowRange};

use std::{
    io,
    sync::{atomic::Ordering, Arc},
    thread::{self, JoinHandle},
};

use log::{debug, error, trace};

use crate::{
    grid::{Dense, Encoding, Grid},
    PoolConfig, Result,
};
use worker::{worker_loop, RowsView, Shared};

type WorkerBody = Box<dyn FnOnce() + Send>;

fn spawn_named(id: usize, body: WorkerBody) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("conway-worker-{}", id))
        .spawn(body)
}

/// Game of Life field advanced in parallel by a fixed set of long-lived threads.
///
/// `workers - 1` threads are spawned once at construction and parked on a
/// condition variable between generations; the thread calling
/// [`WorkerPool::advance_generation`] updates the first row range itself.
/// Every worker updates its own rows in place, reading the rows adjacent to
/// its range from snapshots taken before the generation starts.
///
/// # Example
///
/// ```rust
/// use conway_pool::{patterns::BLINKER, Grid, Packed, WorkerPool};
///
/// let mut grid = Grid::<Packed>::blank(8, 14).unwrap();
/// grid.place(&BLINKER, 3, 4);
/// let mut pool = WorkerPool::from_grid(grid, 2).unwrap();
///
/// pool.advance_generation();
/// assert!(pool.get_cell(2, 5) && pool.get_cell(3, 5) && pool.get_cell(4, 5));
/// assert!(!pool.get_cell(3, 4));
/// ```
pub struct WorkerPool<E: Encoding = Dense> {
    grid: Grid<E>,
    ranges: Vec<RowRange>,
    shared: Arc<Shared<E>>,
    handles: Vec<JoinHandle<()>>,
    generation: u64,
}

impl<E: Encoding> WorkerPool<E> {
    /// Builds and seeds a grid as described by `config`, then starts the workers.
    pub fn new(config: &PoolConfig) -> Result<Self> {
        config.validate::<E>()?;
        let mut grid = Grid::blank(config.rows, config.cols)?;
        config.seed.apply(&mut grid);
        Self::from_grid(grid, config.workers)
    }

    /// Takes ownership of `grid` and starts `workers - 1` threads.
    ///
    /// The number of rows must be divisible by `workers`.
    pub fn from_grid(grid: Grid<E>, workers: usize) -> Result<Self> {
        Self::start(grid, workers, spawn_named)
    }

    fn start<S>(grid: Grid<E>, workers: usize, mut spawn: S) -> Result<Self>
    where
        S: FnMut(usize, WorkerBody) -> io::Result<JoinHandle<()>>,
    {
        let ranges = partition(grid.rows(), workers)?;
        let shared = Arc::new(Shared::new(workers, grid.stride(), grid.cols()));
        let mut pool = Self {
            grid,
            ranges,
            shared,
            handles: Vec::with_capacity(workers - 1),
            generation: 0,
        };

        for id in 1..workers {
            let shared = Arc::clone(&pool.shared);
            // On failure `pool` is dropped, which stops the threads spawned so far.
            let handle = spawn(id, Box::new(move || worker_loop(shared, id)))?;
            pool.handles.push(handle);
        }

        debug!(
            "started {} pool: {}x{} cells, {} workers, {} rows each",
            E::NAME,
            pool.grid.rows(),
            pool.grid.cols(),
            workers,
            pool.ranges[0].len()
        );
        Ok(pool)
    }

    pub fn worker_count(&self) -> usize {
        self.ranges.len()
    }

    /// Row ranges in worker order; worker 0 is the calling thread.
    pub fn partition(&self) -> &[RowRange] {
        &self.ranges
    }

    /// Number of generations computed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid(&self) -> &Grid<E> {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn get_cell(&self, row: usize, col: usize) -> bool {
        self.grid.get(row as isize, col as isize)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, state: bool) {
        self.grid.set(row as isize, col as isize, state);
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) {
        self.grid.toggle(row as isize, col as isize);
    }

    /// Value of the completion counter. Zero whenever no generation is running.
    pub fn completion_count(&self) -> usize {
        self.shared.signal.load(Ordering::Acquire)
    }

    /// Computes exactly one generation, returning once every worker is done.
    ///
    /// # Panics
    ///
    /// If a worker thread died, in this generation or an earlier one. The
    /// remaining workers are stopped and joined first, so the grid is not
    /// shared with anybody once the panic unwinds.
    pub fn advance_generation(&mut self) {
        let shared = &*self.shared;
        assert!(
            shared.running.load(Ordering::Acquire),
            "pool was stopped after a worker thread died"
        );
        let (stride, height) = (self.grid.stride(), self.ranges[0].len());

        // Context rows next to a range may be overwritten by the neighbouring
        // worker as soon as it starts, so all of them are copied up front.
        for (range, slot) in self.ranges.iter().zip(&shared.slots) {
            let mut slot = slot.lock();
            self.grid.copy_row(&mut slot.buffers.above, range.above());
            self.grid.copy_row(&mut slot.buffers.border, range.below());
        }
        for (rows, slot) in self
            .grid
            .interior_mut()
            .chunks_mut(height * stride)
            .zip(&shared.slots)
        {
            slot.lock().rows = Some(RowsView::new(rows));
        }

        {
            let mut generation = shared.wake.lock();
            *generation += 1;
            trace!("generation {} started", *generation);
        }
        shared.cv.notify_all();

        shared.run_slot(0);
        self.wait_for_workers();
        self.generation += 1;
    }

    /// Computes `generations` generations.
    pub fn advance(&mut self, generations: u64) {
        for _ in 0..generations {
            self.advance_generation();
        }
    }

    /// Spins until every spawned worker has reported in, then resets the counter.
    fn wait_for_workers(&mut self) {
        const SPINS_BETWEEN_CHECKS: u32 = 1 << 16;

        let expected = self.worker_count() - 1;
        let mut spins = 0u32;
        while self
            .shared
            .signal
            .compare_exchange_weak(expected, 0, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            std::hint::spin_loop();
            spins = spins.wrapping_add(1);
            if spins % SPINS_BETWEEN_CHECKS == 0 && self.handles.iter().any(|h| h.is_finished()) {
                // The others may still be writing their rows.
                self.stop();
                for slot in &self.shared.slots {
                    slot.lock().rows = None;
                }
                panic!("a worker thread exited in the middle of a generation");
            }
        }
    }

    /// Stops the workers and hands back the grid.
    pub fn into_grid(mut self) -> Grid<E> {
        self.stop();
        self.grid.take()
    }

    /// Stops and joins every worker. Dropping the pool does the same.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        {
            // Cleared under the wake lock so no worker can check the flag and
            // then miss the broadcast.
            let _guard = self.shared.wake.lock();
            if !self.shared.running.swap(false, Ordering::AcqRel) {
                return;
            }
        }
        self.shared.cv.notify_all();

        for (id, handle) in self.handles.drain(..).enumerate() {
            if handle.join().is_err() {
                error!("worker {} panicked", id + 1);
            }
        }
        debug!("pool stopped after {} generations", self.generation);
    }
}

impl<E: Encoding> Drop for WorkerPool<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grid::Packed,
        patterns::{BLINKER, GLIDER},
        reference::NaiveLife,
        PoolError, Seed,
    };

    const SEED: u64 = 42;

    #[test]
    fn test_counter_is_reset_between_generations() {
        let mut grid = Grid::<Dense>::blank(32, 30).unwrap();
        grid.randomize(Some(SEED), 0.3);
        let mut pool = WorkerPool::from_grid(grid, 8).unwrap();
        for _ in 0..50 {
            pool.advance_generation();
            assert_eq!(pool.completion_count(), 0);
        }
        assert_eq!(pool.generation(), 50);
    }

    #[test]
    fn test_matches_reference() {
        let mut grid = Grid::<Packed>::blank(24, 30).unwrap();
        grid.randomize(Some(SEED), 0.3);
        let mut naive = NaiveLife::from_grid(&grid);
        let mut pool = WorkerPool::from_grid(grid, 4).unwrap();

        for _ in 0..20 {
            pool.advance_generation();
            naive.update(1);
            assert_eq!(pool.grid().cells(), naive.cells());
        }
    }

    #[test]
    fn test_blinker_split_by_range_boundary() {
        // Ranges are 4 rows each; the vertical phase spans rows 3..=5.
        let mut grid = Grid::<Dense>::blank(8, 8).unwrap();
        grid.place(&BLINKER, 4, 2);
        let horizontal = grid.cells();
        let mut pool = WorkerPool::from_grid(grid, 2).unwrap();

        pool.advance_generation();
        assert!((3..=5).all(|y| pool.get_cell(y, 3)));
        assert_eq!(pool.grid().population(), 3);

        pool.advance_generation();
        assert_eq!(pool.grid().cells(), horizontal);
    }

    #[test]
    fn test_set_cell_between_generations() {
        let mut pool = WorkerPool::<Packed>::from_grid(Grid::blank(8, 6).unwrap(), 4).unwrap();
        pool.set_cell(3, 1, true);
        pool.toggle_cell(3, 2);
        pool.set_cell(3, 3, true);
        assert!(pool.get_cell(3, 2));

        pool.advance_generation();
        assert!(pool.get_cell(2, 2) && pool.get_cell(3, 2) && pool.get_cell(4, 2));
        assert!(!pool.get_cell(3, 1) && !pool.get_cell(3, 3));
    }

    #[test]
    fn test_into_grid_returns_state() {
        let config = PoolConfig {
            rows: 20,
            cols: 20,
            workers: 2,
            seed: Seed::Pattern {
                pattern: &GLIDER,
                row: 1,
                col: 1,
            },
        };
        let mut pool = WorkerPool::<Dense>::new(&config).unwrap();
        pool.advance(4);
        let grid = pool.into_grid();
        assert_eq!(grid.population(), 5);
        for (y, x) in [(2, 3), (3, 4), (4, 2), (4, 3), (4, 4)] {
            assert!(grid.get(y, x), "y={} x={}", y, x);
        }
    }

    #[test]
    fn test_construction_errors() {
        let grid = Grid::<Dense>::blank(10, 10).unwrap();
        assert!(matches!(
            WorkerPool::from_grid(grid.clone(), 4),
            Err(PoolError::RowsNotDivisible { rows: 10, workers: 4 })
        ));
        assert!(matches!(
            WorkerPool::from_grid(grid, 0),
            Err(PoolError::ZeroWorkers)
        ));
    }

    #[test]
    fn test_failed_spawn_stops_started_workers() {
        use std::sync::atomic::AtomicUsize;

        let exited = Arc::new(AtomicUsize::new(0));
        let result = WorkerPool::<Dense>::start(Grid::blank(16, 4).unwrap(), 8, |id, body| {
            if id == 3 {
                return Err(io::Error::new(io::ErrorKind::Other, "out of threads"));
            }
            let exited = Arc::clone(&exited);
            Ok(thread::spawn(move || {
                body();
                exited.fetch_add(1, Ordering::SeqCst);
            }))
        });

        assert!(matches!(result, Err(PoolError::Spawn(_))));
        assert_eq!(exited.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dead_worker_stops_pool_before_panicking() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let mut grid = Grid::<Dense>::blank(16, 10).unwrap();
        grid.randomize(Some(SEED), 0.3);
        // Worker 2 exits right away without ever taking part in a generation.
        let mut pool = WorkerPool::start(grid, 4, |id, body| {
            if id == 2 {
                Ok(thread::spawn(move || drop(body)))
            } else {
                spawn_named(id, body)
            }
        })
        .unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| pool.advance_generation()));
        assert!(result.is_err());
        assert!(pool.handles.is_empty());
        assert!(!pool.shared.running.load(Ordering::Acquire));
        assert_eq!(pool.generation(), 0);

        // Nobody else holds the grid any more.
        pool.toggle_cell(0, 0);
        let _ = pool.grid().population();

        let result = catch_unwind(AssertUnwindSafe(|| pool.advance_generation()));
        assert!(result.is_err());
    }

    #[test]
    fn test_shutdown_joins_idle_workers() {
        let pool = WorkerPool::<Dense>::from_grid(Grid::blank(12, 4).unwrap(), 6).unwrap();
        pool.shutdown();
    }
}
