//! Command-line and environment configuration
//!
//! Every flag can also come from the environment (or a `.env` file loaded at
//! startup), which is how the service is normally deployed.

use chrono::Duration;
use clap::Parser;
use reqwest::Url;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

use crate::data::DATA_GOV_API_URL;
use crate::retrieval::DEFAULT_TTL_SECONDS;

/// Error types for configuration
#[derive(Debug, Error)]
pub enum CliError {
    /// The upstream URL could not be parsed
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The TTL does not fit in a duration
    #[error("Invalid cache TTL: {0} seconds is out of range")]
    InvalidTtl(u64),

    /// A zero timeout would fail every upstream call
    #[error("Invalid upstream timeout: must be at least 1 second")]
    InvalidTimeout,
}

/// Loads `.env` from the working directory into the environment
///
/// A missing file is fine; a file that exists but cannot be read or parsed
/// is returned so the caller can report it.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv())
}

fn ignore_missing<T>(result: Result<T, dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

/// MGNREGA cache - read-through cache in front of the data.gov.in MGNREGA API
#[derive(Parser, Debug)]
#[command(name = "mgnrega-cache")]
#[command(about = "Read-through cache with stale fallback for data.gov.in MGNREGA statistics")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "BIND_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// How long a cached record set counts as fresh
    #[arg(long, env = "CACHE_TTL_SECONDS", default_value_t = DEFAULT_TTL_SECONDS as u64)]
    pub cache_ttl_seconds: u64,

    /// data.gov.in API key
    #[arg(long, env = "DATA_GOV_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Upstream resource URL
    #[arg(long, env = "DATA_GOV_API_URL", default_value = DATA_GOV_API_URL)]
    pub base_url: String,

    /// Per-request upstream timeout; unset means wait indefinitely
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECONDS")]
    pub upstream_timeout_seconds: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub ttl: Duration,
    pub api_key: Option<String>,
    pub base_url: Url,
    pub upstream_timeout: Option<std::time::Duration>,
    pub log_json: bool,
}

impl ServerConfig {
    /// Validates parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` ready for startup
    /// * `Err(CliError)` if a value is unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = Url::parse(&cli.base_url).map_err(|e| CliError::InvalidBaseUrl {
            url: cli.base_url.clone(),
            reason: e.to_string(),
        })?;

        let ttl = i64::try_from(cli.cache_ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(CliError::InvalidTtl(cli.cache_ttl_seconds))?;

        let upstream_timeout = match cli.upstream_timeout_seconds {
            Some(0) => return Err(CliError::InvalidTimeout),
            Some(secs) => Some(std::time::Duration::from_secs(secs)),
            None => None,
        };

        Ok(ServerConfig {
            addr: SocketAddr::new(cli.host, cli.port),
            ttl,
            api_key: cli.api_key.clone().filter(|key| !key.is_empty()),
            base_url,
            upstream_timeout,
            log_json: cli.log_json,
        })
    }
}
