//! Detection rules
//!
//! One module per anti-pattern: queries issued in a loop, structurally
//! duplicated responses, and over-fetched (mostly unread) responses.

pub mod duplicate_responses;
pub mod over_fetching;
pub mod queries_in_loop;

pub use duplicate_responses::{DuplicateResponseDetector, ResponseSnapshot};
pub use over_fetching::{default_heuristic, OverfetchAnalyzer};
pub use queries_in_loop::LoopDetector;
