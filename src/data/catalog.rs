//! Static catalog of regions and reporting periods
//!
//! The data.gov.in MGNREGA resource is partitioned by state and financial
//! year. These lists are what clients offer as filter choices; the cache
//! itself accepts any region string.

/// States and union territories as spelled by the provider's `state_name` field
pub static STATES: [&str; 34] = [
    "ANDAMAN AND NICOBAR",
    "ANDHRA PRADESH",
    "ARUNACHAL PRADESH",
    "ASSAM",
    "BIHAR",
    "CHHATTISGARH",
    "DN HAVELI AND DD",
    "GOA",
    "GUJARAT",
    "HARYANA",
    "HIMACHAL PRADESH",
    "JAMMU AND KASHMIR",
    "JHARKHAND",
    "KARNATAKA",
    "KERALA",
    "LADAKH",
    "LAKSHADWEEP",
    "MADHYA PRADESH",
    "MAHARASHTRA",
    "MANIPUR",
    "MEGHALAYA",
    "MIZORAM",
    "NAGALAND",
    "ODISHA",
    "PUDUCHERRY",
    "PUNJAB",
    "RAJASTHAN",
    "SIKKIM",
    "TAMIL NADU",
    "TELANGANA",
    "TRIPURA",
    "UTTAR PRADESH",
    "UTTARAKHAND",
    "WEST BENGAL",
];

/// Financial years in the provider's `fin_year` format
pub static FINANCIAL_YEARS: [&str; 8] = [
    "2018-2019",
    "2019-2020",
    "2020-2021",
    "2021-2022",
    "2022-2023",
    "2023-2024",
    "2024-2025",
    "2025-2026",
];

/// Get all known states
///
/// # Example
///
/// ```
/// use mgnrega_cache::data::catalog::all_states;
///
/// assert!(all_states().contains(&"BIHAR"));
/// ```
pub fn all_states() -> &'static [&'static str] {
    &STATES
}

/// Get all known financial years, oldest first
pub fn all_financial_years() -> &'static [&'static str] {
    &FINANCIAL_YEARS
}

/// Whether `name` matches a known state, ignoring case
pub fn is_known_state(name: &str) -> bool {
    STATES.iter().any(|state| state.eq_ignore_ascii_case(name.trim()))
}
