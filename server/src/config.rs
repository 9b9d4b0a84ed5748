//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use safetrace_crypto::{CryptoError, KeyPolicy, KeyProvider, ReadinessFinding};
use safetrace_vault::DEFAULT_STORE_PATH;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid encryption key: {0}")]
    InvalidKey(#[from] CryptoError),

    #[error("not production ready: {}", list(.0))]
    NotProductionReady(Vec<ReadinessFinding>),
}

fn list(findings: &[ReadinessFinding]) -> String {
    findings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Parser, Debug, Clone)]
#[command(name = "safetrace-server")]
#[command(about = "SafeTrace personal-data vault service")]
pub struct ServerConfig {
    /// HTTP port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Address to bind the HTTP listener to
    #[arg(long, env = "BIND_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Document store location: a file path, duckdb://<path> or :memory:
    #[arg(long, env = "VAULT_STORE_URL", default_value = DEFAULT_STORE_PATH)]
    pub store_url: String,

    /// Process-wide field encryption key. Falls back to an insecure built-in
    /// key when unset.
    #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: Option<String>,

    /// Deadline for each store operation, in seconds
    #[arg(long, env = "VAULT_STORE_TIMEOUT_SECS", default_value = "10")]
    pub store_timeout_secs: u64,

    /// Reject keys that are not exactly 32 bytes instead of reshaping them
    #[arg(long, env = "VAULT_STRICT_KEYS")]
    pub strict_keys: bool,

    /// Refuse to start while any readiness finding is open
    #[arg(long, env = "VAULT_PRODUCTION")]
    pub production: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn store_deadline(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn key_policy(&self) -> KeyPolicy {
        if self.strict_keys {
            KeyPolicy::Strict
        } else {
            KeyPolicy::Normalize
        }
    }

    /// Builds the process-wide key provider from the configured key.
    pub fn key_provider(&self) -> Result<KeyProvider, ConfigError> {
        let configured = self.encryption_key.as_deref().map(str::as_bytes);
        Ok(KeyProvider::new(configured, self.key_policy())?)
    }

    /// Returns the open readiness findings, or an error when running in
    /// production mode with any of them open.
    pub fn check_readiness(
        &self,
        keys: &KeyProvider,
    ) -> Result<Vec<ReadinessFinding>, ConfigError> {
        let findings = keys.readiness();
        if self.production && !findings.is_empty() {
            return Err(ConfigError::NotProductionReady(findings));
        }
        Ok(findings)
    }
}
