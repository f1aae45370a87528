//! Access tracking for decoded JSON values
//!
//! Wraps a `serde_json::Value` in an instrumented tree that counts every
//! keyed/indexed read and write, and can report a [`Stats`] tree mirroring the
//! value's shape. Callers traverse through the wrapper's accessor methods
//! (`get`, `get_index`, `set`, `set_index`) instead of raw field access; any
//! access that bypasses the wrapper is not counted.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod stats;
pub mod tracked;

pub use stats::{KeyStats, Stats};
pub use tracked::TrackedValue;
