//! Compile-time configuration
//!
//! These constants size the engines and the clock. Nothing is configured
//! at run time.

/// Clock tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Default number of coroutine methods of a `Coroutine` engine
pub const CFG_METHODS_DEFAULT: usize = 1;

/// Default number of nesting levels of a `NestedCoroutine` engine
pub const CFG_NESTING_LEVELS: usize = 4;

/// Highest resume point a coroutine body may reach.
///
/// The state cell stores `point + 1`, so `0` stays reserved for "stopped".
/// Step numbers stay below it, so the point after the last step is still
/// a resume point.
pub const CFG_CO_POINT_MAX: u8 = u8::MAX - 1;
