//! Nested coroutine engine
//!
//! All methods of the owning class share one chain of state cells, one per
//! nesting level. A body entered at depth `n` uses the cell of level `n`,
//! so a method that calls a sibling method hands it the next level, and
//! methods that never run at the same time reuse the same cells.
//!
//! Sharing makes the methods mutually exclusive. Every level remembers
//! which method, on behalf of which caller, currently occupies it. A
//! second caller reaching an occupied level is answered with `WrongState`
//! and the call in flight is left exactly as it was. This is a bookkeeping
//! check and not a lock: nothing ever waits on it.

use crate::co::{CoResult, Coroutines, Frame};
use crate::config::CFG_NESTING_LEVELS;
use crate::error::{CoError, State};
use crate::types::{CallerId, CoState, MethodId, CO_STOPPED};

/// Occupant of one nesting level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Owner {
    pub method: MethodId,
    pub caller: CallerId,
}

/// Coroutine engine for up to `LEVELS` nested, mutually exclusive methods
#[derive(Debug, Clone)]
pub struct NestedCoroutine<const LEVELS: usize = { CFG_NESTING_LEVELS }> {
    states: [CoState; LEVELS],
    owners: [Option<Owner>; LEVELS],
    /// Level the next `begin` enters
    level: u8,
}

impl<const LEVELS: usize> NestedCoroutine<LEVELS> {
    const NON_EMPTY: () = assert!(
        LEVELS > 0 && LEVELS <= u8::MAX as usize,
        "A NestedCoroutine needs between 1 and 255 levels"
    );

    /// Create an engine with every level stopped
    pub const fn new() -> Self {
        let () = Self::NON_EMPTY;
        NestedCoroutine {
            states: [CO_STOPPED; LEVELS],
            owners: [None; LEVELS],
            level: 0,
        }
    }

    /// Enter the body of `method` on behalf of `caller`.
    ///
    /// The body gets the next free level of the chain:
    /// - a stopped level is claimed and the body starts at step `0`
    /// - a level already owned by the same method and caller resumes
    /// - a level owned by anyone else yields `WrongState`
    /// - a chain already `LEVELS` deep yields `NestingError`
    ///
    /// On error no state cell is touched.
    pub fn begin(&mut self, method: MethodId, caller: CallerId) -> Result<Frame, CoError> {
        let level = self.level;
        let index = level as usize;

        if index >= LEVELS {
            crate::warn!("nesting overflow at level {=u8}", level);
            return Err(CoError::NestingError);
        }

        let owner = Owner { method, caller };
        if self.states[index] == CO_STOPPED {
            self.owners[index] = Some(owner);
        } else if self.owners[index] != Some(owner) {
            crate::warn!("level {=u8} occupied by another call", level);
            return Err(CoError::WrongState);
        }

        self.level = level + 1;
        Ok(Frame::resume(level, self.states[index]))
    }

    /// Record the frame's step, leave the level, and report `Running`
    #[inline]
    pub fn suspend<T>(&mut self, frame: &Frame) -> CoResult<T> {
        self.leave(frame, frame.cell());
        CoResult::Running
    }

    /// Record the frame's step and report a caller-defined waiting reason.
    ///
    /// `code` must not collide with another state, see `State::is_waiting_code`.
    #[inline]
    pub fn suspend_waiting<T>(&mut self, frame: &Frame, code: u8) -> CoResult<T> {
        debug_assert!(State::is_waiting_code(code), "reserved waiting code");
        self.leave(frame, frame.cell());
        CoResult::Waiting(code)
    }

    /// Release the level and report `Stop(value)`
    #[inline]
    pub fn finish<T>(&mut self, frame: &Frame, value: T) -> CoResult<T> {
        self.leave(frame, CO_STOPPED);
        CoResult::Stop(value)
    }

    /// Abandon the body: release the level and report `err`
    #[inline]
    pub fn fail<T>(&mut self, frame: &Frame, err: CoError) -> CoResult<T> {
        self.leave(frame, CO_STOPPED);
        err.into()
    }

    /// Number of consecutive running levels from the top of the chain
    pub fn depth(&self) -> u8 {
        self.states
            .iter()
            .take_while(|&&state| state != CO_STOPPED)
            .count() as u8
    }

    /// Level the next `begin` would enter.
    ///
    /// `0` whenever no body of this engine is executing.
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Occupant of a running level
    pub fn owner(&self, level: u8) -> Option<Owner> {
        let index = level as usize;
        match self.states.get(index) {
            Some(&state) if state != CO_STOPPED => self.owners[index],
            _ => None,
        }
    }

    /// Leave the frame's level, setting its cell to `cell`
    fn leave(&mut self, frame: &Frame, cell: CoState) {
        let index = frame.slot() as usize;
        if index < LEVELS {
            self.states[index] = cell;
            if cell == CO_STOPPED {
                self.owners[index] = None;
            }
        }
        self.level = frame.slot();
    }
}

impl<const LEVELS: usize> Default for NestedCoroutine<LEVELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEVELS: usize> Coroutines for NestedCoroutine<LEVELS> {
    #[inline]
    fn states(&self) -> &[CoState] {
        &self.states
    }

    fn stop_all(&mut self) {
        self.states = [CO_STOPPED; LEVELS];
        self.owners = [None; LEVELS];
        self.level = 0;
    }

    /// Stop level `id` together with every deeper level
    fn stop(&mut self, id: u8) -> bool {
        let first = id as usize;
        if first >= LEVELS {
            return false;
        }
        for index in first..LEVELS {
            self.states[index] = CO_STOPPED;
            self.owners[index] = None;
        }
        true
    }
}
