//! Coroutine engine with one state cell per method
//!
//! Each method of the owning class is assigned a fixed slot. Slots are
//! independent: any number of them may be running at the same time, and
//! the engine never checks who invokes a body. Use `NestedCoroutine` when
//! callers must be kept apart.

use crate::co::{CoResult, Coroutines, Frame};
use crate::config::CFG_METHODS_DEFAULT;
use crate::error::{CoError, State};
use crate::types::{CoState, CO_STOPPED};

/// Compile-time bounds checks for slot indices
struct SlotCheck<const SLOT: u8, const METHODS: usize>;

impl<const SLOT: u8, const METHODS: usize> SlotCheck<SLOT, METHODS> {
    const IN_RANGE: () = assert!(
        (SLOT as usize) < METHODS,
        "Slot out of bounds! Increase the `METHODS` parameter of the Coroutine."
    );
}

/// State cells for `METHODS` coroutine methods
#[derive(Debug, Clone)]
pub struct Coroutine<const METHODS: usize = { CFG_METHODS_DEFAULT }> {
    states: [CoState; METHODS],
}

impl<const METHODS: usize> Coroutine<METHODS> {
    const NON_EMPTY: () = assert!(METHODS > 0, "A Coroutine needs at least one method");

    /// Create an engine with every slot stopped
    pub const fn new() -> Self {
        let () = Self::NON_EMPTY;
        Coroutine {
            states: [CO_STOPPED; METHODS],
        }
    }

    /// Enter the body of the method in `SLOT`.
    ///
    /// A stopped slot starts at step `0`, a running one resumes where it
    /// last suspended.
    #[inline]
    pub fn begin<const SLOT: u8>(&mut self) -> Frame {
        let () = SlotCheck::<SLOT, METHODS>::IN_RANGE;
        Frame::resume(SLOT, self.states[SLOT as usize])
    }

    /// Record the frame's step and report `Running`
    #[inline]
    pub fn suspend<T>(&mut self, frame: &Frame) -> CoResult<T> {
        self.store(frame, frame.cell());
        CoResult::Running
    }

    /// Record the frame's step and report a caller-defined waiting reason.
    ///
    /// `code` must not collide with another state, see `State::is_waiting_code`.
    #[inline]
    pub fn suspend_waiting<T>(&mut self, frame: &Frame, code: u8) -> CoResult<T> {
        debug_assert!(State::is_waiting_code(code), "reserved waiting code");
        self.store(frame, frame.cell());
        CoResult::Waiting(code)
    }

    /// Stop the slot and report `Stop(value)`
    #[inline]
    pub fn finish<T>(&mut self, frame: &Frame, value: T) -> CoResult<T> {
        self.store(frame, CO_STOPPED);
        CoResult::Stop(value)
    }

    /// Abandon the body: stop the slot and report `err`
    #[inline]
    pub fn fail<T>(&mut self, frame: &Frame, err: CoError) -> CoResult<T> {
        self.store(frame, CO_STOPPED);
        err.into()
    }

    /// Raw state cell of `id`
    #[inline]
    pub fn state(&self, id: u8) -> Option<CoState> {
        self.states.get(id as usize).copied()
    }

    #[inline]
    fn store(&mut self, frame: &Frame, cell: CoState) {
        if let Some(state) = self.states.get_mut(frame.slot() as usize) {
            *state = cell;
        }
    }
}

impl<const METHODS: usize> Default for Coroutine<METHODS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const METHODS: usize> Coroutines for Coroutine<METHODS> {
    #[inline]
    fn states(&self) -> &[CoState] {
        &self.states
    }

    fn stop_all(&mut self) {
        for state in self.states.iter_mut() {
            *state = CO_STOPPED;
        }
    }

    fn stop(&mut self, id: u8) -> bool {
        match self.states.get_mut(id as usize) {
            Some(state) => {
                *state = CO_STOPPED;
                true
            }
            None => false,
        }
    }
}
