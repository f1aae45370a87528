//! Rule configuration
//!
//! Each rule is configured through a [`RuleConfig`] tagged variant: `On` uses
//! the rule's defaults, `Off` (also the `Default` impl) disables it, and
//! `Custom` merges a partial override over the defaults. The engine resolves
//! the three variants once at construction into concrete per-rule records.

use std::sync::Arc;
use std::time::Duration;

use netlint_stats::Stats;
use serde_json::Value;

use crate::rules::over_fetching::default_heuristic;

/// Callback invoked with the offending URL.
pub type UrlCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Callback invoked with the list of URLs in a reported loop burst.
pub type UrlListCallback = Arc<dyn Fn(&[String]) + Send + Sync>;
/// Decides whether a response was underused, given the original value and its
/// counter tree.
pub type Heuristic = Arc<dyn Fn(&Value, &Stats) -> bool + Send + Sync>;

/// Number of similar URLs that must accumulate before a loop is reported.
pub const DEFAULT_LOOP_THRESHOLD: usize = 3;
/// Quiet period after which an accumulating loop batch is reported.
pub const DEFAULT_LOOP_DEBOUNCE: Duration = Duration::from_millis(500);
/// Delay before a tracked response's usage is evaluated.
pub const DEFAULT_OVERFETCH_DELAY: Duration = Duration::from_millis(1000);

/// How one rule should run: defaults, disabled, or defaults with overrides.
#[derive(Default)]
pub enum RuleConfig<T> {
    /// Run the rule with its default configuration.
    On,
    /// Do not run the rule.
    #[default]
    Off,
    /// Run the rule with the supplied fields replacing the defaults.
    Custom(T),
}

impl<T> RuleConfig<T> {
    pub(crate) fn resolve<R>(
        self,
        default: impl FnOnce() -> R,
        merge: impl FnOnce(T) -> R,
    ) -> Option<R> {
        match self {
            Self::On => Some(default()),
            Self::Off => None,
            Self::Custom(overrides) => Some(merge(overrides)),
        }
    }
}

/// Partial overrides for duplicate-response detection.
#[derive(Default)]
pub struct DuplicateResponsesOverrides {
    pub cb: Option<UrlCallback>,
}

/// Resolved duplicate-response configuration.
#[derive(Clone)]
pub struct DuplicateResponsesConfig {
    /// Invoked when a call returns the exact same response as the previous
    /// call to the same URL.
    pub cb: UrlCallback,
}

impl Default for DuplicateResponsesConfig {
    fn default() -> Self {
        Self {
            cb: Arc::new(|url| {
                tracing::warn!(
                    url,
                    "previous call to this url returned the exact same response; \
                     consider a (better) cache, or remove the duplicate call"
                );
            }),
        }
    }
}

/// Partial overrides for loop detection.
#[derive(Default)]
pub struct QueryInLoopOverrides {
    pub cb: Option<UrlListCallback>,
    pub threshold: Option<usize>,
    pub debounce: Option<Duration>,
}

/// Resolved loop-detection configuration.
#[derive(Clone)]
pub struct QueryInLoopConfig {
    /// Invoked with the burst's URLs when a likely loop is detected.
    pub cb: UrlListCallback,
    /// Minimum number of similar URLs before reporting. Default 3.
    pub threshold: usize,
    /// Quiet window measured from the burst's first URL. Default 500ms.
    pub debounce: Duration,
}

impl Default for QueryInLoopConfig {
    fn default() -> Self {
        Self {
            cb: Arc::new(|urls| {
                tracing::warn!(
                    urls = ?urls,
                    "the same url is being fetched with different ids many times \
                     in a row; this suggests fetching a resource in a loop \
                     (e.g. /todos/1, /todos/2, /todos/3)"
                );
            }),
            threshold: DEFAULT_LOOP_THRESHOLD,
            debounce: DEFAULT_LOOP_DEBOUNCE,
        }
    }
}

/// Partial overrides for over-fetching detection.
#[derive(Default)]
pub struct OverFetchingOverrides {
    pub cb: Option<UrlCallback>,
    pub heuristic: Option<Heuristic>,
    pub delay: Option<Duration>,
}

/// Resolved over-fetching configuration.
#[derive(Clone)]
pub struct OverFetchingConfig {
    /// Invoked when a response is judged underused.
    pub cb: UrlCallback,
    /// Underuse decision. The default inspects only the top level: flag when
    /// more than half the keys/elements were never accessed.
    pub heuristic: Heuristic,
    /// How long after the response to evaluate usage. Default 1000ms.
    pub delay: Duration,
}

impl Default for OverFetchingConfig {
    fn default() -> Self {
        Self {
            cb: Arc::new(|url| {
                tracing::warn!(
                    url,
                    "response was mostly unused; this might suggest the api is \
                     over-fetching"
                );
            }),
            heuristic: Arc::new(default_heuristic),
            delay: DEFAULT_OVERFETCH_DELAY,
        }
    }
}

/// Per-rule configuration for a detection engine instance.
///
/// All rules default to `Off`; enable each one with `On` or `Custom`.
#[derive(Default)]
pub struct LintConfig {
    pub duplicate_responses: RuleConfig<DuplicateResponsesOverrides>,
    pub query_in_loop: RuleConfig<QueryInLoopOverrides>,
    pub over_fetching: RuleConfig<OverFetchingOverrides>,
}

impl LintConfig {
    /// Every rule enabled with its defaults.
    #[must_use]
    pub fn all_on() -> Self {
        Self {
            duplicate_responses: RuleConfig::On,
            query_in_loop: RuleConfig::On,
            over_fetching: RuleConfig::On,
        }
    }

    pub(crate) fn resolve(self) -> ResolvedConfig {
        ResolvedConfig {
            duplicate_responses: self.duplicate_responses.resolve(
                DuplicateResponsesConfig::default,
                |ov| {
                    let base = DuplicateResponsesConfig::default();
                    DuplicateResponsesConfig {
                        cb: ov.cb.unwrap_or(base.cb),
                    }
                },
            ),
            query_in_loop: self.query_in_loop.resolve(
                QueryInLoopConfig::default,
                |ov| {
                    let base = QueryInLoopConfig::default();
                    QueryInLoopConfig {
                        cb: ov.cb.unwrap_or(base.cb),
                        threshold: ov.threshold.unwrap_or(base.threshold),
                        debounce: ov.debounce.unwrap_or(base.debounce),
                    }
                },
            ),
            over_fetching: self.over_fetching.resolve(
                OverFetchingConfig::default,
                |ov| {
                    let base = OverFetchingConfig::default();
                    OverFetchingConfig {
                        cb: ov.cb.unwrap_or(base.cb),
                        heuristic: ov.heuristic.unwrap_or(base.heuristic),
                        delay: ov.delay.unwrap_or(base.delay),
                    }
                },
            ),
        }
    }
}

pub(crate) struct ResolvedConfig {
    pub duplicate_responses: Option<DuplicateResponsesConfig>,
    pub query_in_loop: Option<QueryInLoopConfig>,
    pub over_fetching: Option<OverFetchingConfig>,
}
