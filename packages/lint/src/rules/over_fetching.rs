//! Over-fetching detection
//!
//! Wraps a decoded response in a [`TrackedValue`] and, after a fixed delay,
//! evaluates a heuristic over the original value and the tracker's counter
//! tree. The default heuristic is deliberately shallow: it inspects only the
//! top level and flags when more than half of the keys/elements were never
//! accessed.

use std::sync::Arc;

use netlint_stats::{Stats, TrackedValue};
use serde_json::Value;

use crate::config::OverFetchingConfig;

/// Schedules one-shot delayed underuse evaluation of tracked responses.
pub struct OverfetchAnalyzer {
    config: OverFetchingConfig,
    on_flag: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl OverfetchAnalyzer {
    #[must_use]
    pub fn new(config: OverFetchingConfig) -> Self {
        Self {
            config,
            on_flag: None,
        }
    }

    /// Internal hook run whenever a response is flagged as underused.
    pub(crate) fn with_flag_hook(
        mut self,
        hook: Arc<dyn Fn() + Send + Sync>,
    ) -> Self {
        self.on_flag = Some(hook);
        self
    }

    /// Wrap `value` for access tracking and schedule its evaluation; the
    /// returned tracker must be handed to the consuming code in place of the
    /// plain value so reads are counted.
    #[must_use]
    pub fn track(&self, url: &str, value: Value) -> TrackedValue {
        let tracked = TrackedValue::wrap(value.clone());
        self.evaluate(url.to_string(), value, tracked.clone());
        tracked
    }

    /// Schedule a one-time evaluation of `tracked`'s counter tree against
    /// `original`, `delay` from now. There is no re-evaluation and no
    /// cancellation once scheduled.
    pub fn evaluate(&self, url: String, original: Value, tracked: TrackedValue) {
        let delay = self.config.delay;
        let heuristic = Arc::clone(&self.config.heuristic);
        let cb = Arc::clone(&self.config.cb);
        let on_flag = self.on_flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let stats = tracked.stats();
            if heuristic(&original, &stats) {
                if let Some(hook) = &on_flag {
                    hook();
                }
                cb(&url);
            }
        });
    }
}

/// Default underuse heuristic: more than half of the top-level keys/elements
/// were never accessed.
///
/// Inspects only the top level of the value; nested objects and elements are
/// not recursed into. Scalars are never flagged.
#[must_use]
pub fn default_heuristic(original: &Value, stats: &Stats) -> bool {
    match original {
        Value::Array(items) => {
            let unused = (0..items.len())
                .filter(|i| stats.count(&i.to_string()) == 0)
                .count();
            unused * 2 > items.len()
        }
        Value::Object(map) => {
            let unused = map.keys().filter(|key| stats.count(key) == 0).count();
            unused * 2 > map.len()
        }
        _ => false,
    }
}
