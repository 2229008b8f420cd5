//! Memoization of quality estimates.
//!
//! The estimator only sees the tiptilt stars, so every asterism built on the
//! same unordered tiptilt selection of the same group shares one estimate,
//! whatever the position angle, flexure star or probe assignment. Failures are
//! cached as well.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::core::asterism::Quality;
use crate::core::sky_object::{SkyObject, StarIdentity};
use crate::error::EstimatorError;

/// Canonical cache key: the tiptilt group plus the sorted star identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    group: String,
    stars: Vec<StarIdentity>,
}

impl MemoKey {
    pub fn new<'a>(group: &str, stars: impl IntoIterator<Item = &'a SkyObject>) -> Self {
        let mut stars: Vec<StarIdentity> = stars.into_iter().map(SkyObject::identity).collect();
        stars.sort();
        Self {
            group: group.to_string(),
            stars,
        }
    }
}

type Slot = Arc<OnceCell<Result<Quality, EstimatorError>>>;

/// Thread-safe insert-once cache.
///
/// Concurrent misses on the same key block on a shared cell, so the estimator
/// runs exactly once per key.
#[derive(Default)]
pub struct QualityCache {
    entries: Mutex<HashMap<MemoKey, Slot>>,
    estimator_calls: AtomicUsize,
    failures: AtomicUsize,
}

impl QualityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached result for `key`, running `estimate` on a miss.
    pub fn get_or_estimate<F>(&self, key: MemoKey, estimate: F) -> Result<Quality, EstimatorError>
    where
        F: FnOnce() -> Result<Quality, EstimatorError>,
    {
        let slot = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(key).or_default())
        };
        slot.get_or_init(|| {
            self.estimator_calls.fetch_add(1, Ordering::Relaxed);
            let result = estimate();
            if result.is_err() {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            result
        })
        .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of times the estimator actually ran.
    pub fn estimator_calls(&self) -> usize {
        self.estimator_calls.load(Ordering::Relaxed)
    }

    /// Number of estimator runs that failed.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}
