//! Application entry point for the hygrolog readings service.
//!
//! Startup sequence: initialize structured logging, load configuration
//! from the environment (honoring a local `.env`), build the query engine
//! over the configured shard directory and serve the API.
//!
//! # Environment Variables
//! - `HYGROLOG_DATA_DIR` (optional) - shard directory (default: `data`)
//! - `HYGROLOG_LISTEN_ADDR` (optional) - bind address (default: `0.0.0.0:5000`)
//! - `HYGROLOG_DEFAULT_RANGE` (optional) - window preset (default: `24h`)
//! - `HYGROLOG_CYCLE_HOURS` (optional) - collection cycle length (default: `24`)
//! - `RUST_LOG` (optional) - log filter (default: `info`)

use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use hygrolog::{Config, QueryEngine, ShardCatalog};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenv().ok();

    let config = Config::from_env()?;
    config.log_config();

    let engine = Arc::new(QueryEngine::new(ShardCatalog::new(&config.data_dir)));

    let listen_addr = config.listen_addr;
    let app = hygrolog::routes::router(engine, config);

    tracing::info!("Listening on {}", listen_addr);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize the global tracing subscriber for structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .compact()
        .init();
}
