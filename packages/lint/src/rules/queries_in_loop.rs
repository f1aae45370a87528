//! Loop (N+1) detection
//!
//! Groups observed URLs into families via [`UrlFamilyMatcher`] and batches
//! each family through a [`DebouncedBatcher`]; when a batch fires with at
//! least `threshold` URLs, the burst is reported and its URLs are pruned from
//! the observed set so the same burst cannot re-trigger.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::config::QueryInLoopConfig;
use crate::debounce::DebouncedBatcher;
use crate::error::{LintError, Result};
use crate::family::UrlFamilyMatcher;

struct FamilyBatch {
    batcher: DebouncedBatcher<String>,
    // One URL joins a family batch at most once, however many peers report it.
    members: Mutex<HashSet<String>>,
}

/// Watches the call stream for bursts of same-family URLs.
pub struct LoopDetector {
    config: QueryInLoopConfig,
    matcher: Arc<UrlFamilyMatcher>,
    batches: Arc<DashMap<String, Arc<FamilyBatch>>>,
    on_report: Option<Arc<dyn Fn(usize) + Send + Sync>>,
}

impl LoopDetector {
    #[must_use]
    pub fn new(config: QueryInLoopConfig) -> Self {
        Self {
            config,
            matcher: Arc::new(UrlFamilyMatcher::new()),
            batches: Arc::new(DashMap::new()),
            on_report: None,
        }
    }

    /// Internal hook run after each reported burst with the burst size.
    pub(crate) fn with_report_hook(
        mut self,
        hook: Arc<dyn Fn(usize) + Send + Sync>,
    ) -> Self {
        self.on_report = Some(hook);
        self
    }

    /// Feed one outbound call.
    ///
    /// # Errors
    ///
    /// [`LintError::UrlParse`] when the URL cannot be parsed; such calls are
    /// excluded from family matching only and the detector state is unchanged.
    pub fn on_call(&self, url: &str) -> Result<()> {
        let families = self.matcher.detect_families(url)?;
        for family in families {
            let batch = self
                .batches
                .entry(family.id.clone())
                .or_insert_with(|| self.open_batch(&family.id))
                .clone();
            for member in family.members {
                let newly_seen = {
                    let mut members =
                        batch.members.lock().unwrap_or_else(PoisonError::into_inner);
                    members.insert(member.clone())
                };
                if !newly_seen {
                    continue;
                }
                // A concurrent fire may have closed the batch between the map
                // lookup and this add; that burst is already adjudicated, and
                // the firing task removes the family entry so the next call
                // opens a fresh batch.
                if let Err(LintError::BatchClosed) = batch.batcher.add(member) {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Number of URLs currently held for pairwise comparison.
    #[must_use]
    pub fn observed_len(&self) -> usize {
        self.matcher.observed_len()
    }

    fn open_batch(&self, family_id: &str) -> Arc<FamilyBatch> {
        let family_id = family_id.to_string();
        let matcher = Arc::clone(&self.matcher);
        let batches = Arc::clone(&self.batches);
        let cb = Arc::clone(&self.config.cb);
        let threshold = self.config.threshold;
        let on_report = self.on_report.clone();
        let on_fire = Arc::new(move |urls: Vec<String>| {
            // Fired batches never reopen; dropping the entry means the next
            // burst of this family starts fresh.
            batches.remove(&family_id);
            if urls.len() < threshold {
                tracing::debug!(
                    family = %family_id,
                    size = urls.len(),
                    "batch below threshold, discarded"
                );
                return;
            }
            matcher.forget(&urls);
            if let Some(hook) = &on_report {
                hook(urls.len());
            }
            cb(&urls);
        });
        Arc::new(FamilyBatch {
            batcher: DebouncedBatcher::new(self.config.debounce, on_fire),
            members: Mutex::new(HashSet::new()),
        })
    }
}
