//! NetLint runtime network diagnostics
//!
//! Watches a stream of outbound calls and their decoded responses and flags
//! three anti-patterns:
//!
//! - **Queries in a loop**: a burst of calls to the same endpoint differing
//!   only by one path parameter (`/todos/1`, `/todos/2`, ...), suggesting an
//!   N+1 fetch loop.
//! - **Duplicate responses**: two calls to the exact same endpoint returning
//!   structurally identical data, suggesting missing caching.
//! - **Over-fetching**: a response whose fields/elements are mostly never
//!   read by the caller.
//!
//! The crate is the detection core only. Intercepting outbound calls and
//! decoding response bodies belong to the host; it drives a [`NetLint`]
//! instance with [`NetLint::on_call`] / [`NetLint::on_response`] and delivers
//! the returned [`LintedResponse`] to the original caller.
//!
//! ```no_run
//! use netlint::{LintConfig, NetLint};
//! use serde_json::json;
//!
//! # async fn example() {
//! let lint = NetLint::new(LintConfig::all_on());
//!
//! lint.on_call("https://api.example.com/todos/1");
//! let response = lint.on_response(
//!     "https://api.example.com/todos/1",
//!     json!({"id": 1, "title": "delectus", "completed": false}),
//! );
//!
//! // Hand the (tracked) response to the caller; reads through the tracker
//! // are counted for over-fetch analysis.
//! if let Some(tracked) = response.tracked() {
//!     let _title = tracked.get("title");
//! }
//! # }
//! ```
//!
//! All detections are heuristics, not proofs. Rule callbacks default to
//! `tracing::warn!` advisories; see [`LintConfig`] for overrides.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod debounce;
pub mod engine;
pub mod equal;
pub mod error;
pub mod family;
pub mod rules;

pub use config::{
    DuplicateResponsesOverrides, LintConfig, OverFetchingOverrides,
    QueryInLoopOverrides, RuleConfig,
};
pub use engine::{LintStats, LintStatsSnapshot, LintedResponse, NetLint};
pub use error::{LintError, Result};

// Re-export the tracking types callers interact with through LintedResponse.
pub use netlint_stats::{KeyStats, Stats, TrackedValue};
