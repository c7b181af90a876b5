//! Time management module
//!
//! Provides the free-running tick clock, injectable time sources, and the
//! timeout types that wait conditions poll.
//!
//! The tick interrupt only ever increments the clock. Coroutine and
//! protothread state advances when the main loop re-invokes a body and a
//! wait condition finds the timeout expired.

use core::cell::Cell;

use portable_atomic::{AtomicU32, Ordering};

use crate::config::CFG_TICK_RATE_HZ;
use crate::types::Tick;

// ============ Clock ============

static TICKS: AtomicU32 = AtomicU32::new(0);

/// Process-wide monotonic tick counter
pub struct Clock;

impl Clock {
    /// Get current tick count
    #[inline]
    pub fn now() -> Tick {
        TICKS.load(Ordering::Relaxed)
    }

    /// Advance the clock by one tick.
    ///
    /// Call this from the periodic tick interrupt.
    #[inline]
    pub fn increment() {
        TICKS.fetch_add(1, Ordering::Relaxed);
    }

    /// Advance the clock by `ticks`
    #[inline]
    pub fn increment_by(ticks: Tick) {
        TICKS.fetch_add(ticks, Ordering::Relaxed);
    }
}

/// Convert milliseconds to clock ticks, rounding down
#[inline]
pub const fn ms_to_ticks(ms: u32) -> Tick {
    ((ms as u64 * CFG_TICK_RATE_HZ as u64) / 1000) as Tick
}

// ============ Time sources ============

/// Something that can tell the current tick
pub trait TimeSource {
    fn now(&self) -> Tick;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    #[inline]
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// The global `Clock` as a time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SysClock;

impl TimeSource for SysClock {
    #[inline]
    fn now(&self) -> Tick {
        Clock::now()
    }
}

/// A clock advanced by hand, for simulations and hosted tests
#[derive(Debug, Default)]
pub struct ManualClock {
    ticks: AtomicU32,
}

impl ManualClock {
    pub const fn new() -> Self {
        ManualClock { ticks: AtomicU32::new(0) }
    }

    pub const fn starting_at(tick: Tick) -> Self {
        ManualClock { ticks: AtomicU32::new(tick) }
    }

    /// Advance by `ticks`
    #[inline]
    pub fn advance(&self, ticks: Tick) {
        self.ticks.fetch_add(ticks, Ordering::Relaxed);
    }

    #[inline]
    pub fn set(&self, tick: Tick) {
        self.ticks.store(tick, Ordering::Relaxed);
    }
}

impl TimeSource for ManualClock {
    #[inline]
    fn now(&self) -> Tick {
        self.ticks.load(Ordering::Relaxed)
    }
}

// ============ Timeout ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutState {
    /// Never armed, or stopped
    Stopped,
    /// Counting down
    Armed,
    /// At least the armed number of ticks have elapsed
    Expired,
}

/// One-shot countdown.
///
/// Expiry is latched, so a timeout that has expired stays expired even if
/// the tick counter later wraps past its start.
#[derive(Debug)]
pub struct Timeout<C: TimeSource = SysClock> {
    clock: C,
    start: Tick,
    duration: Tick,
    state: Cell<TimeoutState>,
}

impl Timeout<SysClock> {
    /// Create a stopped timeout on the global clock
    pub const fn new() -> Self {
        Self::with_clock(SysClock)
    }
}

impl Default for Timeout<SysClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimeSource> Timeout<C> {
    /// Create a stopped timeout on `clock`
    pub const fn with_clock(clock: C) -> Self {
        Timeout {
            clock,
            start: 0,
            duration: 0,
            state: Cell::new(TimeoutState::Stopped),
        }
    }

    /// Arm the timeout to expire `ticks` from now
    pub fn restart(&mut self, ticks: Tick) {
        self.start = self.clock.now();
        self.duration = ticks;
        self.state.set(TimeoutState::Armed);
    }

    /// Arm the timeout to expire `ms` milliseconds from now
    #[inline]
    pub fn restart_ms(&mut self, ms: u32) {
        self.restart(ms_to_ticks(ms));
    }

    pub fn stop(&mut self) {
        self.state.set(TimeoutState::Stopped);
    }

    /// Current state, latching `Expired` once reached
    pub fn state(&self) -> TimeoutState {
        if self.state.get() == TimeoutState::Armed
            && self.clock.now().wrapping_sub(self.start) >= self.duration
        {
            self.state.set(TimeoutState::Expired);
        }
        self.state.get()
    }

    /// `true` once at least the armed number of ticks have elapsed
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.state() == TimeoutState::Expired
    }

    /// `true` while counting down
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.state() == TimeoutState::Armed
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.state() == TimeoutState::Stopped
    }

    /// Ticks left until expiry, `0` unless armed
    pub fn remaining(&self) -> Tick {
        if self.state.get() != TimeoutState::Armed {
            return 0;
        }
        // One clock read, so the deadline cannot pass between check and use
        let elapsed = self.clock.now().wrapping_sub(self.start);
        if elapsed >= self.duration {
            self.state.set(TimeoutState::Expired);
        }
        self.duration.saturating_sub(elapsed)
    }
}

// ============ Periodic timer ============

/// Fires once per period without accumulating drift
#[derive(Debug)]
pub struct PeriodicTimer<C: TimeSource = SysClock> {
    clock: C,
    start: Tick,
    period: Tick,
    running: bool,
}

impl PeriodicTimer<SysClock> {
    /// Create a timer on the global clock, first firing `period` from now
    pub fn new(period: Tick) -> Self {
        Self::with_clock(SysClock, period)
    }
}

impl<C: TimeSource> PeriodicTimer<C> {
    pub fn with_clock(clock: C, period: Tick) -> Self {
        let start = clock.now();
        PeriodicTimer { clock, start, period, running: true }
    }

    /// Restart counting with a new period
    pub fn restart(&mut self, period: Tick) {
        self.start = self.clock.now();
        self.period = period;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `true` once per elapsed period.
    ///
    /// After missing more than one period the timer resynchronises to now
    /// instead of firing repeatedly to catch up.
    pub fn execute(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let now = self.clock.now();
        let elapsed = now.wrapping_sub(self.start);
        if elapsed < self.period {
            return false;
        }

        if elapsed >= self.period.saturating_mul(2) {
            self.start = now;
        } else {
            self.start = self.start.wrapping_add(self.period);
        }
        true
    }
}
