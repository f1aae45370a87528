//! Detection engine facade
//!
//! [`NetLint`] owns every shared store (observed URLs, family batches,
//! response snapshots, counters), so each instance is an independent
//! detection session and teardown is a plain drop. The external interceptor
//! drives it: [`NetLint::on_call`] before each outbound call,
//! [`NetLint::on_response`] after the response body is decoded.

pub mod stats;

use std::sync::Arc;

use netlint_stats::TrackedValue;
use serde_json::Value;

pub use stats::{LintStats, LintStatsSnapshot};

use crate::config::LintConfig;
use crate::rules::duplicate_responses::DuplicateResponseDetector;
use crate::rules::over_fetching::OverfetchAnalyzer;
use crate::rules::queries_in_loop::LoopDetector;

/// What the interceptor must deliver to the original caller in place of the
/// raw decoded value.
#[derive(Debug)]
pub enum LintedResponse {
    /// Over-fetch detection disabled; the value passes through untouched.
    Plain(Value),
    /// Hand this tracker to the caller so its reads are counted.
    Tracked(TrackedValue),
}

impl LintedResponse {
    /// The plain current value, tracked or not. Untracked read.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Tracked(tracked) => tracked.to_value(),
        }
    }

    /// The tracker, when over-fetch detection is enabled.
    #[must_use]
    pub fn tracked(&self) -> Option<&TrackedValue> {
        match self {
            Self::Plain(_) => None,
            Self::Tracked(tracked) => Some(tracked),
        }
    }
}

/// One detection session over a stream of calls and decoded responses.
///
/// Entry points must be called within a tokio runtime context (debounce
/// windows and evaluation delays are spawned timer tasks). The engine is
/// `Send + Sync`; share it behind an `Arc` across tasks.
pub struct NetLint {
    duplicate_responses: DuplicateResponseDetector,
    duplicate_cb: Option<crate::config::UrlCallback>,
    loop_detector: Option<LoopDetector>,
    over_fetching: Option<OverfetchAnalyzer>,
    stats: Arc<LintStats>,
}

impl NetLint {
    /// Resolve `config` and create an engine with empty stores.
    #[must_use]
    pub fn new(config: LintConfig) -> Self {
        let resolved = config.resolve();
        let stats = Arc::new(LintStats::default());

        let loop_detector = resolved.query_in_loop.map(|cfg| {
            let stats = Arc::clone(&stats);
            LoopDetector::new(cfg)
                .with_report_hook(Arc::new(move |_| stats.record_loop_report()))
        });
        let over_fetching = resolved.over_fetching.map(|cfg| {
            let stats = Arc::clone(&stats);
            OverfetchAnalyzer::new(cfg)
                .with_flag_hook(Arc::new(move || stats.record_overfetch_flag()))
        });

        Self {
            duplicate_responses: DuplicateResponseDetector::new(),
            duplicate_cb: resolved.duplicate_responses.map(|cfg| cfg.cb),
            loop_detector,
            over_fetching,
            stats,
        }
    }

    /// Feed one outbound call, before it is issued.
    ///
    /// Unparseable URLs are excluded from family matching only (logged at
    /// debug); they still participate in duplicate/overfetch detection via
    /// [`on_response`](Self::on_response).
    pub fn on_call(&self, url: &str) {
        self.stats.record_call();
        self.duplicate_responses.touch(url);
        if let Some(detector) = &self.loop_detector {
            if let Err(err) = detector.on_call(url) {
                tracing::debug!(url, %err, "call excluded from family matching");
            }
        }
    }

    /// Feed one decoded response.
    ///
    /// Runs duplicate detection and over-fetch tracking independently: a
    /// duplicate response is still wrapped and scheduled for usage analysis.
    /// The duplicate callback runs last, after the other rules have been set
    /// up, so a panic inside it cannot suppress them.
    pub fn on_response(&self, url: &str, value: Value) -> LintedResponse {
        self.stats.record_response();

        let is_duplicate = self
            .duplicate_cb
            .is_some()
            .then(|| self.duplicate_responses.on_response(url, &value))
            .unwrap_or(false);
        if is_duplicate {
            self.stats.record_duplicate();
        }

        let response = match &self.over_fetching {
            Some(analyzer) => LintedResponse::Tracked(analyzer.track(url, value)),
            None => LintedResponse::Plain(value),
        };

        if is_duplicate {
            if let Some(cb) = &self.duplicate_cb {
                cb(url);
            }
        }
        response
    }

    /// Counters for this session.
    #[must_use]
    pub fn stats(&self) -> LintStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of URLs currently held for loop detection, zero when the rule
    /// is off.
    #[must_use]
    pub fn observed_urls(&self) -> usize {
        self.loop_detector
            .as_ref()
            .map_or(0, LoopDetector::observed_len)
    }
}

impl Default for NetLint {
    /// An engine with every rule disabled; enable rules via
    /// [`NetLint::new`] with a [`LintConfig`].
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}
