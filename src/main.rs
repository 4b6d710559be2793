//! MGNREGA cache - read-through cache for data.gov.in MGNREGA statistics
//!
//! Serves district records filtered by state and financial year, refreshing
//! from data.gov.in once a day and falling back to the last good copy when
//! the provider is unavailable.

use std::sync::Arc;

use clap::Parser;

use mgnrega_cache::cache::MemoryCache;
use mgnrega_cache::cli::{load_dotenv, Cli, ServerConfig};
use mgnrega_cache::data::DataGovClient;
use mgnrega_cache::logging::init_tracing;
use mgnrega_cache::retrieval::Retriever;
use mgnrega_cache::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before clap reads the environment
    let dotenv = load_dotenv();

    let cli = Cli::parse();
    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    init_tracing(config.log_json)?;
    if let Err(e) = dotenv {
        tracing::warn!(error = %e, "Failed to load .env; continuing with the process environment");
    }

    let mut client = DataGovClient::new(config.api_key.clone()).with_base_url(config.base_url.as_str());
    if let Some(timeout) = config.upstream_timeout {
        client = client.with_timeout(timeout)?;
    }
    if !client.has_credential() {
        tracing::warn!("DATA_GOV_API_KEY missing; upstream fetches will fail until it is set");
    }

    let retriever = Retriever::new(Arc::new(MemoryCache::new()), Arc::new(client), config.ttl);
    let app = router(AppState {
        retriever: Arc::new(retriever),
    });

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %config.addr,
        ttl_seconds = config.ttl.num_seconds(),
        upstream = %config.base_url,
        "Backend listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
