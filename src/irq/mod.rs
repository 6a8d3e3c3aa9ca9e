//! "Data pending" signalling between interrupt handlers and the task that
//! performs bus reads.
//!
//! An interrupt handler only calls [`RxNotifier::notify`]: it marks the
//! instance as pending and wakes a task waiting in [`RxNotifier::wait`]. The
//! bus read itself happens later, in task context, inside `receive`, so every
//! bus transaction runs from the same execution context.
//!
//! The notifier is meant to live in a `static` (or a `StaticCell`) shared by
//! the interrupt handlers and the adapter.
use core::cell::Cell;

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    signal::Signal,
};
use futures_util::Future;

use crate::config::MAX_INSTANCES;

/// Pending marks for up to [`MAX_INSTANCES`] instances plus one wake-up signal.
pub struct RxNotifier {
    pending: Mutex<CriticalSectionRawMutex, Cell<u8>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for RxNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RxNotifier {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(0)),
            wake: Signal::new(),
        }
    }

    /// Mark `index` as having data pending and wake the waiting task.
    ///
    /// Safe to call from interrupt context. Indices beyond [`MAX_INSTANCES`] are ignored.
    pub fn notify(&self, index: usize) {
        let Some(bit) = Self::bit(index) else {
            return;
        };
        self.pending.lock(|mask| mask.set(mask.get() | bit));
        self.wake.signal(());
    }

    /// Clear and return the pending mark of `index`.
    pub fn take(&self, index: usize) -> bool {
        let Some(bit) = Self::bit(index) else {
            return false;
        };
        self.pending.lock(|mask| {
            let current = mask.get();
            mask.set(current & !bit);
            current & bit != 0
        })
    }

    /// Whether `index` is marked, without clearing it.
    pub fn is_pending(&self, index: usize) -> bool {
        Self::bit(index).is_some_and(|bit| self.pending.lock(|mask| mask.get() & bit != 0))
    }

    /// Snapshot of every pending mark (bit `i` set = instance `i` pending).
    pub fn pending_mask(&self) -> u8 {
        self.pending.lock(|mask| mask.get())
    }

    /// Drop the mark of `index` without reporting it.
    pub fn clear(&self, index: usize) {
        self.take(index);
    }

    /// Drop every mark and any wake-up not yet consumed.
    pub fn reset(&self) {
        self.pending.lock(|mask| mask.set(0));
        self.wake.reset();
    }

    /// Wait until at least one instance is pending and return the pending mask.
    ///
    /// Marks are not cleared: the caller drains them by calling `receive` on
    /// each flagged index.
    pub fn wait(&self) -> impl Future<Output = u8> + '_ {
        async move {
            loop {
                let mask = self.pending_mask();
                if mask != 0 {
                    return mask;
                }
                self.wake.wait().await;
            }
        }
    }

    fn bit(index: usize) -> Option<u8> {
        (index < MAX_INSTANCES).then(|| 1u8 << index)
    }
}
