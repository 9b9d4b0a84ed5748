//! Core type definitions for the SafeTrace vault.
//!
//! This crate defines the small set of domain-agnostic types shared by the
//! crypto, storage and service layers:
//! - Vault item identifiers (UUID v7)
//! - Monotonic wall-clock timestamps for item lifecycles

mod ids;
mod timestamp;

pub use ids::ItemId;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, TypesError>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    #[error("invalid item id: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
