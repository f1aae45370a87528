//! Instrumented wrapper over a decoded JSON value
//!
//! [`TrackedValue::wrap`] converts a `serde_json::Value` bottom-up into a tree
//! of independently instrumented nodes. Every keyed or indexed access through
//! the wrapper bumps that key's counter at that level; [`TrackedValue::stats`]
//! reads the counters back out without bumping anything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde_json::Value;

use crate::stats::{KeyStats, Stats};

/// A decoded value whose per-key/per-index accesses are counted.
///
/// Cloning is cheap and shares the underlying node, so a clone handed to the
/// consuming code and a clone retained for later [`stats`](Self::stats)
/// queries observe the same counters.
#[derive(Clone)]
pub struct TrackedValue {
    node: Arc<Node>,
}

struct Node {
    children: RwLock<Children>,
    counters: Mutex<HashMap<String, u64>>,
}

enum Children {
    Object(HashMap<String, TrackedValue>),
    Array(Vec<TrackedValue>),
    Leaf(Value),
}

impl TrackedValue {
    /// Wrap `value` recursively; every nested object/array level is
    /// instrumented on its own.
    #[must_use]
    pub fn wrap(value: Value) -> Self {
        let children = match value {
            Value::Object(map) => Children::Object(
                map.into_iter().map(|(k, v)| (k, Self::wrap(v))).collect(),
            ),
            Value::Array(items) => {
                Children::Array(items.into_iter().map(Self::wrap).collect())
            }
            leaf => Children::Leaf(leaf),
        };
        Self {
            node: Arc::new(Node {
                children: RwLock::new(children),
                counters: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Read the child under `key`, counting the access.
    ///
    /// Accessing a missing key still creates and bumps its counter; on arrays,
    /// a decimal `key` addresses the corresponding index. Reads and writes
    /// share one counter per key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<TrackedValue> {
        self.bump(key);
        match &*self.read_children() {
            Children::Object(map) => map.get(key).cloned(),
            Children::Array(items) => {
                key.parse::<usize>().ok().and_then(|i| items.get(i)).cloned()
            }
            Children::Leaf(_) => None,
        }
    }

    /// Read the element at `index`, counting the access.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<TrackedValue> {
        self.get(&index.to_string())
    }

    /// Replace (or, for objects, insert) the child under `key`, counting the
    /// access against the same counter as reads.
    ///
    /// Out-of-range array writes and writes on leaves are counted but leave
    /// the structure unchanged.
    pub fn set(&self, key: &str, value: Value) {
        self.bump(key);
        match &mut *self.write_children() {
            Children::Object(map) => {
                map.insert(key.to_string(), Self::wrap(value));
            }
            Children::Array(items) => {
                if let Some(slot) =
                    key.parse::<usize>().ok().and_then(|i| items.get_mut(i))
                {
                    *slot = Self::wrap(value);
                }
            }
            Children::Leaf(_) => {}
        }
    }

    /// Replace the element at `index`, counting the access.
    pub fn set_index(&self, index: usize, value: Value) {
        self.set(&index.to_string(), value);
    }

    /// Counter tree for this level and, recursively, its composite children.
    ///
    /// A side channel: querying never bumps any counter. The result holds one
    /// entry per key ever accessed here plus one per child key of the
    /// underlying value, zero-counted when never touched.
    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut out: std::collections::BTreeMap<String, KeyStats> = self
            .lock_counters()
            .iter()
            .map(|(k, c)| (k.clone(), KeyStats::leaf(*c)))
            .collect();
        match &*self.read_children() {
            Children::Object(map) => {
                for (key, child) in map {
                    let entry =
                        out.entry(key.clone()).or_insert_with(|| KeyStats::leaf(0));
                    entry.inner = child.composite_stats();
                }
            }
            Children::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    let entry = out
                        .entry(i.to_string())
                        .or_insert_with(|| KeyStats::leaf(0));
                    entry.inner = child.composite_stats();
                }
            }
            Children::Leaf(_) => {}
        }
        Stats(out)
    }

    /// Rebuild the current plain value. Untracked.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match &*self.read_children() {
            Children::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_value())).collect(),
            ),
            Children::Array(items) => {
                Value::Array(items.iter().map(TrackedValue::to_value).collect())
            }
            Children::Leaf(leaf) => leaf.clone(),
        }
    }

    /// The scalar at this node, when it is a leaf. Untracked.
    #[must_use]
    pub fn as_value(&self) -> Option<Value> {
        match &*self.read_children() {
            Children::Leaf(leaf) => Some(leaf.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(&*self.read_children(), Children::Object(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(&*self.read_children(), Children::Array(_))
    }

    /// Number of children at this level; zero for leaves. Untracked.
    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.read_children() {
            Children::Object(map) => map.len(),
            Children::Array(items) => items.len(),
            Children::Leaf(_) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys present at this level, for objects. Untracked.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match &*self.read_children() {
            Children::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn composite_stats(&self) -> Option<Stats> {
        // Drop the read guard before recursing; stats() takes it again.
        let is_leaf = matches!(&*self.read_children(), Children::Leaf(_));
        if is_leaf {
            None
        } else {
            Some(self.stats())
        }
    }

    fn bump(&self, key: &str) {
        *self.lock_counters().entry(key.to_string()).or_insert(0) += 1;
    }

    fn lock_counters(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.node
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_children(&self) -> std::sync::RwLockReadGuard<'_, Children> {
        self.node
            .children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_children(&self) -> std::sync::RwLockWriteGuard<'_, Children> {
        self.node
            .children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TrackedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedValue")
            .field("value", &self.to_value())
            .finish_non_exhaustive()
    }
}
