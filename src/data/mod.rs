//! Core data models for the MGNREGA cache
//!
//! This module contains the record types passed between the upstream client,
//! the cache, and the retrieval path, along with the sort applied to records
//! at response time.

pub mod catalog;
pub mod data_gov;
pub mod sort;

pub use catalog::{all_financial_years, all_states, is_known_state};
pub use data_gov::{DataGovClient, Upstream, UpstreamError, UpstreamQuery, DATA_GOV_API_URL};
pub use sort::sort_records;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row from the provider, as a field name to value mapping
///
/// The shape is provider-defined; no individual field is validated.
pub type Record = Map<String, Value>;

/// The records returned for one query, in whatever order upstream chose
pub type RecordSet = Vec<Record>;

/// Field records are sorted by when the caller names none
pub const DEFAULT_SORT_FIELD: &str = "district_name";

/// Direction of the response-time sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Reads a direction from a query parameter
    ///
    /// Accepts `asc`, `ascending`, `desc` and `descending` in any case.
    /// Anything unrecognised sorts ascending.
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

/// Which field to sort by and in which direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(DEFAULT_SORT_FIELD, SortDirection::Ascending)
    }
}
