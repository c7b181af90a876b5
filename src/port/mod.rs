//! Port layer - CPU-specific hooks
//!
//! The tick interrupt source for `Clock` and the idle instruction the
//! main loop may park on between rounds.

#[cfg(target_arch = "arm")]
pub mod arm;

#[cfg(target_arch = "arm")]
pub use arm::*;

// Stub implementations for non-ARM targets (for testing)
#[cfg(not(target_arch = "arm"))]
pub mod stub {
    /// No tick hardware on the host; drive `Clock` or a `ManualClock` by hand
    pub fn systick_init(_reload: u32) {}

    pub fn wait_for_interrupt() {
        core::hint::spin_loop();
    }
}

#[cfg(not(target_arch = "arm"))]
pub use stub::*;
