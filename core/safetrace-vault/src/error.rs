//! Error types for the vault layer.

use std::fmt;
use std::time::Duration;

use safetrace_crypto::CryptoError;
use safetrace_types::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors that can occur in vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The request is incomplete or malformed.
    #[error("validation failed: {0}")]
    Validation(ValidationIssues),

    /// No item with this id exists.
    #[error("vault item not found: {0}")]
    NotFound(ItemId),

    /// Sealing or opening a field failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The store did not answer within the deadline.
    #[error("{operation} exceeded the {deadline:?} deadline")]
    Timeout {
        operation: &'static str,
        deadline: Duration,
    },

    /// Database error from DuckDB.
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),

    /// A stored document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other persistence failure.
    #[error("store error: {0}")]
    Store(String),
}

impl VaultError {
    /// Shorthand for a single-field validation error.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        VaultError::Validation(ValidationIssues::single(field, message))
    }

    /// True for failures of the underlying persistence layer.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            VaultError::Database(_) | VaultError::Serialization(_) | VaultError::Store(_)
        )
    }
}

impl From<validator::ValidationErrors> for VaultError {
    fn from(errors: validator::ValidationErrors) -> Self {
        VaultError::Validation(errors.into())
    }
}

/// One problem with one input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Field-level validation detail, sorted by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationIssues(Vec<FieldIssue>);

impl ValidationIssues {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldIssue {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for ValidationIssues {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues: Vec<FieldIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(&field);
                errs.iter().map(move |e| FieldIssue {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Self(issues)
    }
}

/// Maps a Rust field name to its wire name (`owner_id` -> `ownerId`).
fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
