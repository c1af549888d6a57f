use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use log::{log_enabled, trace, Level};
use parking_lot::{Condvar, Mutex};

use crate::{
    grid::Encoding,
    kernel::{update_rows, RowBuffers},
};

/// A worker's block of grid rows with the borrow lifetime erased.
///
/// Built by the driver from one of the disjoint `chunks_mut` of the grid and
/// consumed by exactly one worker in the same generation.
pub(super) struct RowsView<U> {
    ptr: *mut U,
    len: usize,
}

unsafe impl<U: Send> Send for RowsView<U> {}

impl<U> RowsView<U> {
    pub(super) fn new(rows: &mut [U]) -> Self {
        Self {
            ptr: rows.as_mut_ptr(),
            len: rows.len(),
        }
    }

    /// # Safety
    ///
    /// The slice the view was made from must still be exclusively borrowed
    /// for the pool, with no other access to it, until the returned slice is
    /// dropped.
    unsafe fn into_slice<'a>(self) -> &'a mut [U] {
        std::slice::from_raw_parts_mut(self.ptr, self.len)
    }
}

/// Everything one worker touches during a generation.
pub(super) struct Slot<E: Encoding> {
    pub(super) buffers: RowBuffers<E>,
    pub(super) rows: Option<RowsView<E::Unit>>,
}

pub(super) struct Shared<E: Encoding> {
    pub(super) running: AtomicBool,
    /// Workers other than the driver that finished the current generation.
    pub(super) signal: AtomicUsize,
    /// Token of the latest generation; bumped by the driver before each broadcast.
    pub(super) wake: Mutex<u64>,
    pub(super) cv: Condvar,
    pub(super) slots: Vec<Mutex<Slot<E>>>,
    pub(super) stride: usize,
    pub(super) cols: usize,
}

impl<E: Encoding> Shared<E> {
    pub(super) fn new(workers: usize, stride: usize, cols: usize) -> Self {
        Self {
            running: AtomicBool::new(true),
            signal: AtomicUsize::new(0),
            wake: Mutex::new(0),
            cv: Condvar::new(),
            slots: (0..workers)
                .map(|_| {
                    Mutex::new(Slot {
                        buffers: RowBuffers::new(stride),
                        rows: None,
                    })
                })
                .collect(),
            stride,
            cols,
        }
    }

    pub(super) fn workers(&self) -> usize {
        self.slots.len()
    }

    /// Runs the kernel over the rows installed in slot `id`, if any.
    pub(super) fn run_slot(&self, id: usize) {
        let mut guard = self.slots[id].lock();
        let slot = &mut *guard;
        let Some(view) = slot.rows.take() else {
            return;
        };
        if log_enabled!(Level::Trace) {
            trace!(
                "worker {} context:\n{}",
                id,
                slot.buffers.describe(self.cols + 2)
            );
        }
        // SAFETY: the driver keeps the grid borrowed and untouched until every
        // worker has reported completion, and views of different slots come
        // from disjoint chunks.
        let rows = unsafe { view.into_slice() };
        update_rows(rows, self.stride, self.cols, &mut slot.buffers);
    }
}

/// Body of every spawned worker; the driver thread plays worker 0 itself.
pub(super) fn worker_loop<E: Encoding>(shared: Arc<Shared<E>>, id: usize) {
    let mut seen = 0;
    loop {
        {
            let mut generation = shared.wake.lock();
            while *generation == seen && shared.running.load(Ordering::Acquire) {
                shared.cv.wait(&mut generation);
            }
            if !shared.running.load(Ordering::Acquire) {
                break;
            }
            seen = *generation;
        }
        trace!("worker {} woke for generation {}", id, seen);

        shared.run_slot(id);

        let prev = shared.signal.fetch_add(1, Ordering::Release);
        debug_assert!(
            prev < shared.workers() - 1,
            "completion counter overflow: {} before increment",
            prev
        );
    }
    trace!("worker {} stopped", id);
}
