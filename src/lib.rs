//! Cooperative coroutines and protothreads for microcontrollers
//!
//! A stackless execution model for bare-metal firmware:
//! - Coroutine engines holding one state cell per coroutine method
//! - Nested coroutines with per-level ownership and bounded depth
//! - Protothreads driven from the application's main loop
//! - Tick clock, timeouts and bus transaction status for wait conditions
//!
//! Nothing here allocates, and nothing unwinds: every outcome is a value.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;

pub mod base;
pub mod co;
pub mod io;
pub mod port;
pub mod pt;

// ============ Re-exports ============

pub use base::config;
pub use base::config::*;
pub use base::error;
pub use base::error::{CallResult, CoError, State};
pub use base::time;
pub use base::time::{Clock, ManualClock, PeriodicTimer, SysClock, TimeSource, Timeout};
pub use base::types;
pub use base::types::*;

pub use co::coroutine::Coroutine;
pub use co::{block_on, CoResult, Coroutines, Frame, Resume};
#[cfg(feature = "nested")]
pub use co::nested::NestedCoroutine;

pub use io::{TaskStatus, Transaction};
pub use pt::{run_all, Protothread, Thread};
