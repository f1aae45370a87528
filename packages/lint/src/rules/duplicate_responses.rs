//! Duplicate-response detection
//!
//! Keeps the last decoded response per exact URL string and reports when a
//! later call to the same URL decodes to a structurally identical value.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;

use crate::equal::structural_eq;

/// Per-URL record of the most recent call and its decoded response.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    /// Wall-clock time of the most recent call to this URL.
    pub last_called_at: DateTime<Utc>,
    /// Most recent non-duplicate decoded response, once one has been seen.
    pub last_response: Option<Value>,
}

/// Detects exact structural repeats of a URL's previous response.
#[derive(Debug, Default)]
pub struct DuplicateResponseDetector {
    store: DashMap<String, ResponseSnapshot>,
}

impl DuplicateResponseDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `url`; returns whether it structurally repeats the
    /// previously stored response.
    ///
    /// The check and the store update happen in one entry critical section so
    /// two concurrent calls to the same URL cannot both look first.
    pub fn on_response(&self, url: &str, value: &Value) -> bool {
        let mut snapshot = self
            .store
            .entry(url.to_string())
            .or_insert_with(|| ResponseSnapshot {
                last_called_at: Utc::now(),
                last_response: None,
            });
        let is_duplicate = snapshot
            .last_response
            .as_ref()
            .is_some_and(|prev| structural_eq(prev, value));
        snapshot.last_called_at = Utc::now();
        if !is_duplicate {
            snapshot.last_response = Some(value.clone());
        }
        is_duplicate
    }

    /// Update `url`'s call timestamp without touching the stored response.
    /// First sighting creates the snapshot with no response yet.
    pub fn touch(&self, url: &str) {
        self.store
            .entry(url.to_string())
            .or_insert_with(|| ResponseSnapshot {
                last_called_at: Utc::now(),
                last_response: None,
            })
            .last_called_at = Utc::now();
    }

    /// Snapshot for `url`, if any call has been seen.
    #[must_use]
    pub fn snapshot(&self, url: &str) -> Option<ResponseSnapshot> {
        self.store.get(url).map(|entry| entry.clone())
    }
}
