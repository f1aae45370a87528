//! Counter tree reported by a tracked value
//!
//! A [`Stats`] tree mirrors the shape of the value it was queried from: one
//! [`KeyStats`] per key/index, with a nested tree for composite children.

use std::collections::BTreeMap;

use serde::Serialize;

/// Access record for a single key or index at one level of a tracked value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    /// Combined read + write count for this key at this level.
    pub count: u64,
    /// Counter tree of the child value, when the child is an object or array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner: Option<Stats>,
}

impl KeyStats {
    pub(crate) fn leaf(count: u64) -> Self {
        Self { count, inner: None }
    }
}

/// Counter tree for one level of a tracked value.
///
/// Contains an entry for every key ever read or written at that level
/// (including keys absent from the underlying value) and for every child key
/// of the underlying value (with `count == 0` when never accessed). Ordered by
/// key, so two trees built from the same accesses compare and serialize
/// identically regardless of traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stats(pub BTreeMap<String, KeyStats>);

impl Stats {
    /// Record for `key`, if any access or child exists under it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KeyStats> {
        self.0.get(key)
    }

    /// Access count for `key`; absent keys count as zero.
    #[must_use]
    pub fn count(&self, key: &str) -> u64 {
        self.0.get(key).map_or(0, |s| s.count)
    }

    /// Nested counter tree under `key`, when the child is composite.
    #[must_use]
    pub fn inner(&self, key: &str) -> Option<&Stats> {
        self.0.get(key).and_then(|s| s.inner.as_ref())
    }

    /// Number of entries at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyStats)> {
        self.0.iter()
    }
}
