//! In-memory cache store for upstream record sets
//!
//! Provides a `MemoryCache` that maps a request's filter triple to the last
//! record set fetched for it, stamped with the time it was captured.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::data::RecordSet;

/// Identifies one cache partition
///
/// Built from `(region, period, limit)` only; sorting and every other request
/// field are deliberately not part of it. An empty period is its own
/// partition ("all periods").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    region: String,
    period: String,
    limit: u32,
}

impl CacheKey {
    pub(crate) fn new(region: &str, period: &str, limit: u32) -> Self {
        Self {
            region: region.to_string(),
            period: period.to_string(),
            limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}__{}", self.region, self.period, self.limit)
    }
}

/// A snapshot of what upstream returned for one key
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// When the fetch that produced `payload` completed
    captured_at: DateTime<Utc>,
    /// The records exactly as upstream returned them
    payload: RecordSet,
}

impl CacheEntry {
    pub fn new(payload: RecordSet, captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            payload,
        }
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn payload(&self) -> &RecordSet {
        &self.payload
    }
}

/// Returns true while `entry` is younger than `ttl` at `now`
pub fn is_fresh(entry: &CacheEntry, ttl: Duration, now: DateTime<Utc>) -> bool {
    now - entry.captured_at < ttl
}

/// Storage capability used by the retrieval path
///
/// `get` returns whatever is stored regardless of age; `put` replaces the
/// entry for a key wholesale. Both must be safe to call from concurrent
/// requests.
pub trait CacheStore: Send + Sync {
    /// Returns the current entry for `key`, fresh or not
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>>;

    /// Replaces any existing entry for `key`
    fn put(&self, key: CacheKey, entry: CacheEntry);
}

/// Unbounded process-lifetime cache backed by a `HashMap`
///
/// Entries are shared as `Arc`s, so a `put` swaps in a complete entry and a
/// concurrent reader sees either the old entry or the new one.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Arc<CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: CacheKey, entry: CacheEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(entry));
    }
}
