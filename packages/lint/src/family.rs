//! URL family matching
//!
//! Two URLs belong to the same family when they share origin and path shape
//! and differ at exactly one segment where both sides contain a digit, e.g.
//! `/todos/1` and `/todos/2` form the family `/todos/{PARAM}`. Non-digit
//! differences at other segments are ignored, not disqualifying.

use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::error::Result;

/// Placeholder substituted for the parameterized segment in a family id.
pub const PARAM_PLACEHOLDER: &str = "{PARAM}";

/// A family shared between the newest URL and previously observed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMatch {
    /// Origin plus path with the parameterized segment replaced by
    /// [`PARAM_PLACEHOLDER`], anchored to the newest URL's path.
    pub id: String,
    /// The URLs that produced this family, in arrival order; the newest URL
    /// is always last.
    pub members: Vec<String>,
}

/// Matches each incoming URL against every URL observed so far.
///
/// Pairwise O(n) per call; the loop detector prunes reported URLs out of the
/// set after each fired batch, which keeps n bounded to the active window.
#[derive(Debug, Default)]
pub struct UrlFamilyMatcher {
    // Insertion-ordered so family members report in arrival order.
    observed: Mutex<Vec<Url>>,
}

impl UrlFamilyMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `raw` as observed and return the deduplicated families it forms
    /// with previously observed URLs.
    ///
    /// A parse failure leaves the observed set untouched; the caller excludes
    /// that call from family matching only.
    pub fn detect_families(&self, raw: &str) -> Result<Vec<FamilyMatch>> {
        let url = Url::parse(raw)?;
        let mut families: Vec<FamilyMatch> = Vec::new();
        let mut observed = self.lock_observed();
        for other in observed.iter() {
            let Some(id) = family_of(&url, other) else {
                continue;
            };
            match families.iter().position(|f| f.id == id) {
                Some(i) => families[i].members.push(other.to_string()),
                None => families.push(FamilyMatch {
                    id,
                    members: vec![other.to_string()],
                }),
            }
        }
        let url_string = url.to_string();
        if !observed.contains(&url) {
            observed.push(url);
        }
        for family in &mut families {
            family.members.push(url_string.clone());
        }
        Ok(families)
    }

    /// Drop the given URLs from the observed set after a reported batch, so
    /// the same burst cannot re-trigger. Unparseable entries are skipped.
    pub fn forget(&self, urls: &[String]) {
        let mut observed = self.lock_observed();
        for raw in urls {
            if let Ok(url) = Url::parse(raw) {
                observed.retain(|seen| seen != &url);
            }
        }
    }

    /// Number of URLs currently observed.
    #[must_use]
    pub fn observed_len(&self) -> usize {
        self.lock_observed().len()
    }

    fn lock_observed(&self) -> MutexGuard<'_, Vec<Url>> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Family id for a pair of URLs, anchored to `url`'s own path, or `None` when
/// the pair does not form one.
fn family_of(url: &Url, other: &Url) -> Option<String> {
    if url == other || url.origin() != other.origin() {
        return None;
    }
    let segments: Vec<&str> = url.path().split('/').collect();
    let other_segments: Vec<&str> = other.path().split('/').collect();
    if segments.len() != other_segments.len() {
        return None;
    }

    let mut differences = Vec::new();
    for (i, (seg, other_seg)) in segments.iter().zip(&other_segments).enumerate() {
        if seg == other_seg {
            continue;
        }
        if contains_digit(seg) && contains_digit(other_seg) {
            differences.push(i);
        }
    }
    let &[difference_at] = differences.as_slice() else {
        return None;
    };

    let path = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| if i == difference_at { PARAM_PLACEHOLDER } else { *seg })
        .collect::<Vec<_>>()
        .join("/");
    Some(format!("{}{path}", url.origin().ascii_serialization()))
}

fn contains_digit(segment: &str) -> bool {
    segment.chars().any(|c| c.is_ascii_digit())
}
