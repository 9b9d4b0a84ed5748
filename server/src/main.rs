//! SafeTrace vault server
//!
//! Serves the vault HTTP API over a single DuckDB document store.
//!
//! Usage:
//!   safetrace-server --port 8080 --store-url safetrace-vault.duckdb
//!
//! Every flag also reads from the environment (`PORT`, `ENCRYPTION_KEY`,
//! `VAULT_STORE_URL`, ...).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use safetrace_server::{ServerConfig, VaultService, build_router};
use safetrace_vault::{DuckDbDocumentStore, VaultStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("SafeTrace vault starting...");
    let keys = config.key_provider().context("failed to set up encryption key")?;
    info!(source = ?keys.source(), policy = ?keys.policy(), "encryption key loaded");
    for finding in config
        .check_readiness(&keys)
        .context("production readiness check failed")?
    {
        warn!("readiness: {}", finding);
    }

    let documents = DuckDbDocumentStore::open_url(&config.store_url)
        .with_context(|| format!("failed to open vault store at {}", config.store_url))?;
    info!(store = %config.store_url, "vault store opened");

    let store = VaultStore::new(Arc::new(documents), Arc::new(keys))
        .with_deadline(config.store_deadline());
    let app = build_router(VaultService::new(store));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Vault API listening on {}", addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
