//! Memoized valuations keyed by pool-index set.
//!
//! Shapley and equilibrium searches evaluate the same coalitions over and
//! over. Since a [`Valuation`](crate::engine::Valuation) is pure, its result
//! for a set of pool indices can be stored once and shared between threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Largest pool whose subsets fit in a `u64` bitmask key.
pub const MAX_CACHED_POOL: usize = u64::BITS as usize;

/// Thread-safe storage for computed set values.
///
/// Uses an `RwLock` so that concurrent lookups do not block each other.
/// Two threads may compute the same missing entry at once; both write the
/// same value, so the race only costs duplicate work.
#[derive(Debug, Default)]
pub struct ValueCache {
    /// Set value by bitmask of pool indices.
    values: RwLock<FxHashMap<u64, f64>>,

    hits: AtomicU64,
    misses: AtomicU64,
}

/// Hit/miss counters for a [`ValueCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to evaluate the valuation.
    pub misses: u64,
    /// Distinct sets stored.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl ValueCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `mask`, computing and storing it with `compute` on a miss.
    pub fn get_or_insert_with<F>(&self, mask: u64, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        if let Some(&value) = self.read().get(&mask) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();
        self.write().insert(mask, value);
        value
    }

    /// Number of stored sets.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&self) {
        self.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    // A poisoned lock only means another thread panicked mid-insert; the map
    // itself is always in a consistent state, so keep using it.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, FxHashMap<u64, f64>> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FxHashMap<u64, f64>> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clone for ValueCache {
    fn clone(&self) -> Self {
        Self {
            values: RwLock::new(self.read().clone()),
            hits: AtomicU64::new(self.hits.load(Ordering::Relaxed)),
            misses: AtomicU64::new(self.misses.load(Ordering::Relaxed)),
        }
    }
}
