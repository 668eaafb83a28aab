//! keystash server - filesystem-backed key-value store over HTTP
//!
//! Stores uploaded files and JSON strings under client-chosen keys and
//! serves them back, with a TTL cache in front of string reads.

use keystash_cache::TtlCache;
use keystash_server::{
    start_server, KeystashError, Result, ServerConfig, ServerState, SharedState, Storage,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("keystash_server=info".parse()?);

    // Use JSON format for cloud logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting keystash...");

    let config = ServerConfig::from_env();
    info!("Port: {}", config.port);
    info!("Storage dir: {:?}", config.storage_dir);
    info!("Max upload size: {} MB", config.max_upload_bytes / (1024 * 1024));

    // Storage directories must exist before serving anything
    let storage = Storage::new(&config.storage_dir);
    storage.ensure_directories().await?;

    let cache = TtlCache::new(config.cache_ttl, config.cache_max_entries);
    info!(
        "Cache TTL: {} seconds, max {} entries",
        cache.ttl().as_secs(),
        config.cache_max_entries
    );

    let state: SharedState = Arc::new(
        ServerState::new(storage, cache).with_max_upload_bytes(config.max_upload_bytes),
    );

    start_server(state, config.port)
        .await
        .map_err(|e| KeystashError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
