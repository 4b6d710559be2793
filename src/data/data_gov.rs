//! data.gov.in API client for MGNREGA district statistics
//!
//! Issues filtered queries against the Open Government Data platform and
//! normalizes the response into a `RecordSet`. The client performs no retries
//! and keeps no state between calls; caching is the retrieval layer's job.

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::RecordSet;

/// MGNREGA district-wise performance resource
pub const DATA_GOV_API_URL: &str =
    "https://api.data.gov.in/resource/ee03643a-ee4c-48c2-ac30-9f2ff26ab722";

/// Errors that can occur when fetching records from upstream
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No API key was configured, so no request was sent
    #[error("Missing API key")]
    MissingCredential,

    /// HTTP request failed; the URL is stripped since it carries the API key
    #[error("HTTP request failed: {0}")]
    HttpError(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned status {0}")]
    Status(StatusCode),

    /// Upstream answered, but without a usable records collection
    #[error("Invalid API response format: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::HttpError(err.without_url())
    }
}

impl UpstreamError {
    /// True when the call itself succeeded but the body was unusable
    pub fn is_malformed(&self) -> bool {
        matches!(self, UpstreamError::MalformedPayload(_))
    }
}

/// Filters for one upstream query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub region: String,
    pub period: String,
    pub limit: u32,
}

impl UpstreamQuery {
    /// Query parameters for this request
    ///
    /// Empty filters are left out entirely rather than sent blank.
    fn params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api-key", api_key.to_string()),
            ("format", "json".to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.region.is_empty() {
            params.push(("filters[state_name]", self.region.clone()));
        }
        if !self.period.is_empty() {
            params.push(("filters[fin_year]", self.period.clone()));
        }
        params
    }
}

/// Source of record sets for the retrieval path
pub trait Upstream: Send + Sync {
    /// Fetches the records matching `query`
    fn fetch<'a>(&'a self, query: &'a UpstreamQuery) -> BoxFuture<'a, Result<RecordSet, UpstreamError>>;
}

/// Response envelope from data.gov.in
#[derive(Debug, Deserialize)]
struct ApiResponse {
    records: RecordSet,
}

/// Client for fetching MGNREGA records from data.gov.in
#[derive(Debug, Clone)]
pub struct DataGovClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Provider credential; `None` makes every fetch fail fast
    api_key: Option<String>,
    /// Resource URL (overridable for testing and mirrors)
    base_url: String,
}

impl DataGovClient {
    /// Creates a client for the public data.gov.in resource
    ///
    /// An empty key is treated the same as no key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: DATA_GOV_API_URL.to_string(),
        }
    }

    /// Points the client at a different resource URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bounds each request to `timeout`; a hung call then surfaces as `HttpError`
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, UpstreamError> {
        self.http_client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches records directly from the API
    pub async fn fetch_records(&self, query: &UpstreamQuery) -> Result<RecordSet, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::MissingCredential)?;

        tracing::debug!(
            region = %query.region,
            period = %query.period,
            limit = query.limit,
            base_url = %self.base_url,
            "Requesting data.gov.in"
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&query.params(api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = response.text().await?;
        parse_records(&body)
    }
}

impl Upstream for DataGovClient {
    fn fetch<'a>(&'a self, query: &'a UpstreamQuery) -> BoxFuture<'a, Result<RecordSet, UpstreamError>> {
        self.fetch_records(query).boxed()
    }
}

/// Extracts the records collection from a response body
///
/// The body must be a JSON object whose `records` field is an array of
/// objects (possibly empty). Anything else is `MalformedPayload`.
fn parse_records(body: &str) -> Result<RecordSet, UpstreamError> {
    serde_json::from_str::<ApiResponse>(body)
        .map(|response| response.records)
        .map_err(|e| UpstreamError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(region: &str, period: &str) -> UpstreamQuery {
        UpstreamQuery {
            region: region.to_string(),
            period: period.to_string(),
            limit: 1000,
        }
    }

    #[test]
    fn test_params_include_both_filters() {
        let params = query("BIHAR", "2021-2022").params("secret");

        assert_eq!(
            params,
            vec![
                ("api-key", "secret".to_string()),
                ("format", "json".to_string()),
                ("limit", "1000".to_string()),
                ("filters[state_name]", "BIHAR".to_string()),
                ("filters[fin_year]", "2021-2022".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_omit_empty_period() {
        let params = query("ASSAM", "").params("secret");

        assert!(params.iter().all(|(name, _)| *name != "filters[fin_year]"));
        assert!(params.contains(&("filters[state_name]", "ASSAM".to_string())));
    }

    #[test]
    fn test_parse_records_accepts_records_array() {
        let body = r#"{"title":"MGNREGA","total":2,"records":[{"district_name":"PATNA"},{"district_name":"GAYA","households":"12"}]}"#;

        let records = parse_records(body).expect("Should parse records");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["district_name"], "PATNA");
        assert_eq!(records[1]["households"], "12");
    }

    #[test]
    fn test_parse_records_accepts_empty_array() {
        let records = parse_records(r#"{"records":[]}"#).expect("Empty is still valid");
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_records_rejects_missing_records() {
        let err = parse_records(r#"{"message":"Invalid key"}"#).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("Invalid API response format"));
    }

    #[test]
    fn test_parse_records_rejects_null_and_non_array() {
        assert!(parse_records(r#"{"records":null}"#).unwrap_err().is_malformed());
        assert!(parse_records(r#"{"records":{"a":1}}"#).unwrap_err().is_malformed());
        assert!(parse_records(r#"{"records":[1,2]}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn test_parse_records_rejects_non_json() {
        let err = parse_records("<html>Service Unavailable</html>").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        assert!(!DataGovClient::new(Some(String::new())).has_credential());
        assert!(!DataGovClient::new(None).has_credential());
        assert!(DataGovClient::new(Some("k".to_string())).has_credential());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        // Port 9 (discard) is never contacted because the key check comes first
        let client = DataGovClient::new(None).with_base_url("http://127.0.0.1:9/resource");

        let err = client.fetch(&query("BIHAR", "2021-2022")).await.unwrap_err();

        assert!(matches!(err, UpstreamError::MissingCredential));
        assert!(!err.is_malformed());
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        // Bind then drop to get a port nothing is listening on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = DataGovClient::new(Some("SUPERSECRETKEY".to_string()))
            .with_base_url(format!("http://127.0.0.1:{}/resource", port));

        let err = client.fetch(&query("BIHAR", "2021-2022")).await.unwrap_err();

        assert!(matches!(err, UpstreamError::HttpError(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"), "{:?}", err);
    }

    #[test]
    fn test_builder_error_is_converted_without_url() {
        let reqwest_err = Client::new()
            .get("http://[::1/resource?api-key=SUPERSECRETKEY")
            .build()
            .unwrap_err();

        let err = UpstreamError::from(reqwest_err);

        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_default_base_url() {
        let client = DataGovClient::new(None);
        assert_eq!(client.base_url(), DATA_GOV_API_URL);
    }
}
