//! Stackless coroutines
//!
//! A coroutine body is an ordinary method that is invoked over and over.
//! Its progress lives in a state cell of an engine owned by the same
//! object: on entry the body asks the engine where it last suspended
//! (`begin`), dispatches to that point with [`steps!`], and leaves through
//! one of `suspend`, `finish` or `fail`.
//!
//! ```ignore
//! struct Sensor {
//!     co: Coroutine<1>,
//!     timeout: Timeout,
//! }
//!
//! impl Sensor {
//!     fn settle(&mut self) -> CoResult<bool> {
//!         let mut frame = self.co.begin::<0>();
//!         steps!(frame {
//!             0 => { self.timeout.restart(100); }
//!             1 => { wait_until!(self.co, frame, self.timeout.is_expired()); }
//!         } end => self.co.finish(&frame, true))
//!     }
//! }
//! ```
//!
//! Every `wait_until!`, `wait_while!`, `call!` and `yield_once!` sits in
//! its own numbered step, which is the point execution resumes from.
//! Locals do not survive a suspension; keep anything needed across steps
//! in the owning struct.

use core::task::Poll;

use crate::types::{CoState, CO_STOPPED};

pub mod coroutine;
#[cfg(feature = "nested")]
pub mod nested;
mod result;

pub use result::CoResult;

// ============ Frame ============

/// Where a body is executing during one invocation.
///
/// Produced by an engine's `begin` and handed back to it when the body
/// suspends or finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    slot: u8,
    point: u8,
}

impl Frame {
    #[inline]
    pub(crate) const fn new(slot: u8, point: u8) -> Self {
        Frame { slot, point }
    }

    /// Resume a frame from a coroutine state cell
    #[inline]
    pub(crate) const fn resume(slot: u8, cell: CoState) -> Self {
        Frame {
            slot,
            point: if cell == CO_STOPPED { 0 } else { cell - 1 },
        }
    }

    /// State cell value that resumes at this frame's point
    #[inline]
    pub(crate) fn cell(&self) -> CoState {
        debug_assert!(self.point <= crate::config::CFG_CO_POINT_MAX);
        self.point.saturating_add(1)
    }

    /// Slot (or nesting level) the frame belongs to
    #[inline]
    pub const fn slot(&self) -> u8 {
        self.slot
    }

    /// Current step of the body
    #[inline]
    pub const fn point(&self) -> u8 {
        self.point
    }

    /// Continue at `point` instead of the next step
    #[inline]
    pub fn goto(&mut self, point: u8) {
        self.point = point;
    }

    /// Move on to the next step, stopping at `CFG_CO_POINT_MAX`.
    ///
    /// No step may be numbered that high, so a frame parked there
    /// dispatches to `end`.
    #[inline]
    pub fn advance(&mut self) {
        if self.point < crate::config::CFG_CO_POINT_MAX {
            self.point += 1;
        }
    }
}

// ============ Resume ============

/// Value returned by a nested state machine on each invocation
pub trait Resume {
    /// What the call point produces once the callee has finished
    type Output;

    /// `Pending` while the callee needs another invocation
    fn resume(self) -> Poll<Self::Output>;
}

/// Protothreads report `true` while still running
impl Resume for bool {
    type Output = ();

    #[inline]
    fn resume(self) -> Poll<()> {
        if self {
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

/// Drive a state machine to completion by re-invoking it in a busy loop.
///
/// This monopolises the CPU until `f` finishes and starves every other
/// coroutine and protothread. Use it only outside the cooperative loop,
/// e.g. during start-up.
pub fn block_on<R, F>(mut f: F) -> R::Output
where
    R: Resume,
    F: FnMut() -> R,
{
    loop {
        if let Poll::Ready(output) = f().resume() {
            return output;
        }
        core::hint::spin_loop();
    }
}

// ============ Query and control surface ============

/// Start/stop/query operations shared by the coroutine engines.
///
/// Ids out of range are never running and cannot be stopped.
pub trait Coroutines {
    /// All state cells of the engine
    fn states(&self) -> &[CoState];

    /// Force every coroutine to stop
    fn stop_all(&mut self);

    /// Force coroutine `id` to stop, `false` if `id` is out of range
    fn stop(&mut self, id: u8) -> bool;

    /// `true` if coroutine `id` is running
    #[inline]
    fn is_running(&self, id: u8) -> bool {
        self.states()
            .get(id as usize)
            .is_some_and(|&state| state != CO_STOPPED)
    }

    /// `true` if any coroutine of the engine is running
    #[inline]
    fn any_running(&self) -> bool {
        self.states().iter().any(|&state| state != CO_STOPPED)
    }

    /// `true` if any of `ids` is running
    fn any_of_running(&self, ids: &[u8]) -> bool {
        ids.iter().any(|&id| self.is_running(id))
    }

    /// `true` if all of `ids` are running
    fn all_running(&self, ids: &[u8]) -> bool {
        ids.iter().all(|&id| self.is_running(id))
    }

    /// `true` if none of `ids` is running
    #[inline]
    fn join(&self, ids: &[u8]) -> bool {
        !self.any_of_running(ids)
    }
}

// ============ Body macros ============

/// Dispatch a body to the step its frame resumes at.
///
/// Steps are numbered from `0` and fall through to the next number when
/// their block completes. A block may `$frame.goto(n); continue;` to jump.
/// Leaving the last step, or resuming at an unknown point, evaluates the
/// `end` expression and returns it.
///
/// A resumed step runs again from the top of its block, so a wait or a
/// call belongs at the start of its step.
///
/// Step numbers must stay below `CFG_CO_POINT_MAX`; larger ones are
/// rejected at compile time.
#[macro_export]
macro_rules! steps {
    ($frame:ident { $($point:literal => $body:block)* } end => $end:expr) => {
        loop {
            $(
                const _: () = assert!(
                    ($point as u32) < $crate::config::CFG_CO_POINT_MAX as u32,
                    "step number out of range"
                );
            )*
            match $frame.point() {
                $( $point => $body )*
                _ => return $end,
            }
            #[allow(unreachable_code)]
            $frame.advance();
        }
    };
}

/// Suspend at this step until `$cond` holds; re-checked on every resume
#[macro_export]
macro_rules! wait_until {
    ($engine:expr, $frame:expr, $cond:expr) => {
        if !($cond) {
            return $engine.suspend(&$frame);
        }
    };
}

/// Suspend at this step while `$cond` holds
#[macro_export]
macro_rules! wait_while {
    ($engine:expr, $frame:expr, $cond:expr) => {
        if $cond {
            return $engine.suspend(&$frame);
        }
    };
}

/// Invoke a nested coroutine or protothread until it finishes.
///
/// Suspends at this step while the callee is running and re-invokes it on
/// every resume. Evaluates to the callee's `Resume::Output`.
#[macro_export]
macro_rules! call {
    ($engine:expr, $frame:expr, $call:expr) => {
        match $crate::co::Resume::resume($call) {
            ::core::task::Poll::Pending => return $engine.suspend(&$frame),
            ::core::task::Poll::Ready(output) => output,
        }
    };
}

/// Suspend once and continue with the next step on the following invocation
#[macro_export]
macro_rules! yield_once {
    ($engine:expr, $frame:ident) => {{
        $frame.advance();
        return $engine.suspend(&$frame);
    }};
}
