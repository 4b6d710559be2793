//! Cache module for holding upstream record sets in memory
//!
//! This module provides a process-wide cache store keyed by the request's
//! filter triple. Entries carry the time they were captured, and freshness is
//! judged against a TTL at read time. Expired entries are never removed, so
//! they remain available as a fallback when the upstream API is unavailable.

mod clock;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{is_fresh, CacheEntry, CacheKey, CacheStore, MemoryCache};
