//! Base modules
//!
//! Configuration, error taxonomy, shared types, and the tick clock that
//! wait conditions poll.

pub mod config;
pub mod error;
pub mod types;
pub mod time;
