//! Coroutine result type

use core::task::Poll;

use crate::co::Resume;
use crate::error::{CallResult, CoError, State};

/// What a coroutine body returns on every invocation.
///
/// Only `Stop` carries the produced value. While the coroutine is
/// `Running` or `Waiting` there is nothing to consume. For `T = ()` the
/// payload takes no space.
#[must_use = "a coroutine that is still running must be invoked again"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoResult<T> {
    /// Suspended at a wait or call point
    Running,
    /// Suspended with a caller-defined reason code
    Waiting(u8),
    /// Finished, with the coroutine's value
    Stop(T),
    /// A nested slot was occupied by a different caller
    WrongState,
    /// The call chain ran out of nesting levels
    NestingError,
}

impl<T> CoResult<T> {
    /// Control tag without the payload
    pub const fn state(&self) -> State {
        match self {
            CoResult::Running => State::Running,
            CoResult::Waiting(code) => State::Waiting(*code),
            CoResult::Stop(_) => State::Stop,
            CoResult::WrongState => State::WrongState,
            CoResult::NestingError => State::NestingError,
        }
    }

    /// `true` if the coroutine must be invoked again
    #[inline]
    pub const fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// `true` if the coroutine stopped, normally or with an error
    #[inline]
    pub const fn is_finished(&self) -> bool {
        !self.is_running()
    }

    /// The produced value, if the coroutine stopped normally
    pub fn value(self) -> Option<T> {
        match self {
            CoResult::Stop(value) => Some(value),
            _ => None,
        }
    }

    /// Finished outcome as a `Result`, `None` while still running
    pub fn finished(self) -> Option<CallResult<T>> {
        match self {
            CoResult::Running | CoResult::Waiting(_) => None,
            CoResult::Stop(value) => Some(Ok(value)),
            CoResult::WrongState => Some(Err(CoError::WrongState)),
            CoResult::NestingError => Some(Err(CoError::NestingError)),
        }
    }

    /// Map the produced value, keeping every other tag
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CoResult<U> {
        match self {
            CoResult::Running => CoResult::Running,
            CoResult::Waiting(code) => CoResult::Waiting(code),
            CoResult::Stop(value) => CoResult::Stop(f(value)),
            CoResult::WrongState => CoResult::WrongState,
            CoResult::NestingError => CoResult::NestingError,
        }
    }
}

impl<T> From<CoError> for CoResult<T> {
    fn from(err: CoError) -> Self {
        match err {
            CoError::WrongState => CoResult::WrongState,
            CoError::NestingError => CoResult::NestingError,
        }
    }
}

impl<T> Resume for CoResult<T> {
    type Output = CallResult<T>;

    #[inline]
    fn resume(self) -> Poll<Self::Output> {
        match self.finished() {
            Some(outcome) => Poll::Ready(outcome),
            None => Poll::Pending,
        }
    }
}
