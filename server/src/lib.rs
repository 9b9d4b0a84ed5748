//! HTTP service for the SafeTrace vault.
//!
//! - [`config`]: the clap-derived [`ServerConfig`]
//! - [`service`]: [`VaultService`], the validating front of the vault store
//! - [`api`]: the axum router and error-to-status mapping

pub mod api;
pub mod config;
pub mod service;

pub use api::{ApiError, ENCRYPTION_KEY_HEADER, ErrorBody, HealthResponse, build_router};
pub use config::{ConfigError, ServerConfig};
pub use service::{Confirmation, CreatedItem, DELETED_MESSAGE, UPDATED_MESSAGE, VaultService};
