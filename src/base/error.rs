//! Error types
//!
//! Failures are ordinary return values. Nothing here panics or unwinds.

/// Reason a coroutine call could not make progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoError {
    /// A nested slot is occupied by a different method or caller.
    ///
    /// The in-flight call is left untouched. Whether to retry is up to the caller.
    WrongState,
    /// The call chain ran out of nesting levels
    NestingError,
}

/// Outcome of a call point whose callee has finished
pub type CallResult<T> = Result<T, CoError>;

/// Control tag of a coroutine result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Coroutine finished
    Stop,
    /// Nested coroutine ran out of nesting levels
    NestingError,
    /// A conflicting nested coroutine is already running
    WrongState,
    /// Suspended with a caller-defined reason
    Waiting(u8),
    /// Suspended, call again later
    Running,
}

impl State {
    /// Numeric code of the state.
    ///
    /// `Stop` and `NestingError` are at or below `1`, everything that keeps
    /// the caller waiting is above. A `Waiting` code must be one for which
    /// [`State::is_waiting_code`] holds, or it aliases another state.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            State::Stop => 0,
            State::NestingError => 1,
            State::WrongState => 100,
            State::Waiting(code) => code,
            State::Running => 255,
        }
    }

    /// `true` while the coroutine has not finished
    #[inline]
    pub const fn is_running(self) -> bool {
        matches!(self, State::Running | State::Waiting(_))
    }

    /// `true` for the codes free for `Waiting`: `2..=99` and `101..=254`
    #[inline]
    pub const fn is_waiting_code(code: u8) -> bool {
        !matches!(code, 0 | 1 | 100 | 255)
    }

    /// `true` for the error tags
    #[inline]
    pub const fn is_err(self) -> bool {
        matches!(self, State::WrongState | State::NestingError)
    }
}

impl From<CoError> for State {
    fn from(err: CoError) -> Self {
        match err {
            CoError::WrongState => State::WrongState,
            CoError::NestingError => State::NestingError,
        }
    }
}
