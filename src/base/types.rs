//! Type definitions
//!
//! State cells, tick counts, and the identities a nested engine compares.

use portable_atomic::{AtomicU32, Ordering};

/// Resume marker of one coroutine slot
pub type CoState = u8;

/// A coroutine slot that is not running
pub const CO_STOPPED: CoState = 0;

/// Resume point of a protothread
pub type PtState = u8;

/// Protothread resumes from the top of its body
pub const PT_START: PtState = 0;

/// Protothread has exited and stays stopped until restarted
pub const PT_STOPPED: PtState = PtState::MAX;

/// Clock tick count
pub type Tick = u32;

/// Identity of a coroutine method within a nested engine.
///
/// Each method of a class gets its own constant, like a slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MethodId(pub u8);

/// Token identifying one top-level caller of a nested engine.
///
/// Two call chains only share a slot if they present the same token.
/// Allocate one token per caller when the caller is created and keep it,
/// never one per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallerId(u32);

/// Next token handed out by `CallerId::unique`; raw `0` is never allocated
static NEXT_CALLER: AtomicU32 = AtomicU32::new(1);

impl CallerId {
    /// Allocate a fresh token.
    ///
    /// Tokens increase monotonically, skipping `0`. The counter only wraps
    /// after `u32::MAX` allocations.
    pub fn unique() -> Self {
        loop {
            let raw = NEXT_CALLER.fetch_add(1, Ordering::Relaxed);
            if raw != 0 {
                return CallerId(raw);
            }
        }
    }

    /// Use a statically chosen token.
    ///
    /// Callers mixing this with `unique` should pick values from a range
    /// the allocator will not reach, e.g. the top of the `u32` space.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        CallerId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
