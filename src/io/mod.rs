//! Bus transaction status
//!
//! Drivers talk to a bus master (I2C, SPI, UART) asynchronously: the body
//! prepares a transfer with one of the adapter's `configure_*` methods,
//! starts it, and then waits on a [`TaskStatus`] that the completion
//! interrupt of the bus writes.
//!
//! ```ignore
//! 0 => {
//!     wait_until!(self.co, frame, self.adapter.configure_ping()
//!         && self.status.try_start(PING, || self.adapter.start()));
//! }
//! 1 => { wait_while!(self.co, frame, self.status.is_pending(PING)); }
//! ```

use portable_atomic::{AtomicU8, Ordering};

/// Marker of the operation a driver has in flight
pub type TaskMarker = u8;

/// No operation in flight, and no operation succeeded
pub const TASK_IDLE: TaskMarker = 0;

/// Shared state between a driver's coroutines and its completion interrupt
#[derive(Debug)]
pub struct TaskStatus {
    task: AtomicU8,
    success: AtomicU8,
}

impl TaskStatus {
    pub const fn new() -> Self {
        TaskStatus {
            task: AtomicU8::new(TASK_IDLE),
            success: AtomicU8::new(TASK_IDLE),
        }
    }

    /// Mark `marker` as in flight and call `start` to hand the transfer
    /// to the bus.
    ///
    /// If `start` refuses, the status goes back to idle and `false` is
    /// returned, so the call can sit in a `wait_until!` and be retried.
    pub fn try_start<F: FnOnce() -> bool>(&self, marker: TaskMarker, start: F) -> bool {
        debug_assert!(marker != TASK_IDLE);
        self.success.store(TASK_IDLE, Ordering::Relaxed);
        self.task.store(marker, Ordering::Release);
        if start() {
            true
        } else {
            self.task.store(TASK_IDLE, Ordering::Release);
            false
        }
    }

    /// `true` while `marker` is in flight
    #[inline]
    pub fn is_pending(&self, marker: TaskMarker) -> bool {
        self.task.load(Ordering::Acquire) == marker
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.task.load(Ordering::Acquire) == TASK_IDLE
    }

    /// Finish the transfer in flight. Called from the completion interrupt.
    pub fn complete(&self, success: bool) {
        let task = self.task.load(Ordering::Acquire);
        let result = if success { task } else { TASK_IDLE };
        self.success.store(result, Ordering::Relaxed);
        self.task.store(TASK_IDLE, Ordering::Release);
    }

    /// `true` if the last finished transfer was `marker` and it succeeded
    #[inline]
    pub fn succeeded(&self, marker: TaskMarker) -> bool {
        self.is_idle() && self.success.load(Ordering::Relaxed) == marker
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// A bus adapter holding a prepared transfer
pub trait Transaction {
    /// Hand the prepared transfer to the bus master.
    ///
    /// Returns `false` if the master is busy with another transfer.
    fn start(&mut self) -> bool;
}
