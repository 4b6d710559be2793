//! Read-through retrieval with stale fallback
//!
//! A `Retriever` answers one request at a time against a shared cache:
//! serve a fresh entry if there is one, otherwise refresh from upstream and
//! store the result, and if the refresh fails serve whatever entry is left,
//! however old. Sorting is applied to a copy on the way out.

use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::cache::{is_fresh, CacheEntry, CacheKey, CacheStore, Clock, SystemClock};
use crate::data::{sort_records, RecordSet, SortSpec, Upstream, UpstreamError, UpstreamQuery};

/// Record limit used when the caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 1000;

/// Default freshness window for cache entries
pub const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Errors returned to the caller of `Retriever::retrieve`
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The request itself was malformed
    #[error("{0}")]
    Validation(String),

    /// Upstream answered but the body had no usable records; the cache is not consulted
    #[error("Invalid API response format")]
    MalformedUpstreamPayload(#[source] UpstreamError),

    /// Upstream failed and there was nothing cached to fall back on
    #[error("Failed to fetch data")]
    NoCacheAvailable(#[source] UpstreamError),
}

/// Where the returned records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Cache,
    Api,
    CacheStale,
}

/// A successful response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieved {
    pub source: Source,
    pub records: RecordSet,
}

/// One inbound request for records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Required, non-empty
    pub region: String,
    /// Empty means all periods
    pub period: String,
    pub limit: u32,
    pub sort: SortSpec,
}

impl RecordRequest {
    pub fn new(region: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            period: period.into(),
            limit: DEFAULT_LIMIT,
            sort: SortSpec::default(),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    fn validate(&self) -> Result<(), RetrievalError> {
        if self.region.is_empty() {
            return Err(RetrievalError::Validation(
                "state_name is required".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(RetrievalError::Validation(
                "limit must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cache-and-fallback retrieval policy
#[derive(Clone)]
pub struct Retriever {
    cache: Arc<dyn CacheStore>,
    upstream: Arc<dyn Upstream>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Retriever {
    /// Creates a retriever using wall-clock time
    pub fn new(cache: Arc<dyn CacheStore>, upstream: Arc<dyn Upstream>, ttl: Duration) -> Self {
        Self {
            cache,
            upstream,
            clock: Arc::new(SystemClock),
            ttl,
        }
    }

    /// Replaces the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Answers `request` from cache, upstream, or stale cache, in that order
    pub async fn retrieve(&self, request: &RecordRequest) -> Result<Retrieved, RetrievalError> {
        request.validate()?;

        let key = CacheKey::new(&request.region, &request.period, request.limit);

        if let Some(entry) = self.cache.get(&key) {
            if is_fresh(&entry, self.ttl, self.clock.now()) {
                tracing::info!(%key, captured_at = %entry.captured_at(), "Served from cache");
                return Ok(respond(Source::Cache, entry.payload(), &request.sort));
            }
        }

        tracing::info!(
            region = %request.region,
            period = %request.period,
            limit = request.limit,
            "Fetching fresh data"
        );

        let query = UpstreamQuery {
            region: request.region.clone(),
            period: request.period.clone(),
            limit: request.limit,
        };

        match self.upstream.fetch(&query).await {
            Ok(payload) => {
                let response = respond(Source::Api, &payload, &request.sort);
                self.cache
                    .put(key, CacheEntry::new(payload, self.clock.now()));
                Ok(response)
            }
            Err(error) if error.is_malformed() => {
                tracing::error!(%key, %error, "Invalid data format received from upstream");
                Err(RetrievalError::MalformedUpstreamPayload(error))
            }
            Err(error) => {
                tracing::error!(%key, %error, "Error fetching data");
                match self.cache.get(&key) {
                    Some(entry) => {
                        tracing::warn!(
                            %key,
                            captured_at = %entry.captured_at(),
                            "Using stale cached data"
                        );
                        Ok(respond(Source::CacheStale, entry.payload(), &request.sort))
                    }
                    None => Err(RetrievalError::NoCacheAvailable(error)),
                }
            }
        }
    }
}

fn respond(source: Source, payload: &RecordSet, sort: &SortSpec) -> Retrieved {
    Retrieved {
        source,
        records: sort_records(payload, sort),
    }
}
