//! Detection counters
//!
//! Atomic counters tracking what the engine has seen and reported, with a
//! serializable snapshot for logging or export.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters for one detection engine instance.
#[derive(Debug, Default)]
pub struct LintStats {
    /// Outbound calls observed.
    pub calls: AtomicU64,
    /// Decoded responses observed.
    pub responses: AtomicU64,
    /// Responses that structurally repeated the previous one for their URL.
    pub duplicate_hits: AtomicU64,
    /// Loop bursts reported.
    pub loop_reports: AtomicU64,
    /// Responses flagged as underused.
    pub overfetch_flags: AtomicU64,
}

impl LintStats {
    pub(crate) fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_response(&self) {
        self.responses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicate_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_loop_report(&self) {
        self.loop_reports.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overfetch_flag(&self) {
        self.overfetch_flags.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a consistent-enough point-in-time snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LintStatsSnapshot {
        LintStatsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            duplicate_hits: self.duplicate_hits.load(Ordering::Relaxed),
            loop_reports: self.loop_reports.load(Ordering::Relaxed),
            overfetch_flags: self.overfetch_flags.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LintStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LintStatsSnapshot {
    pub calls: u64,
    pub responses: u64,
    pub duplicate_hits: u64,
    pub loop_reports: u64,
    pub overfetch_flags: u64,
}
