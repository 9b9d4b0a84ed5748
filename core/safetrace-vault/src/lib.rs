//! Encrypted vault item storage for SafeTrace.
//!
//! # Architecture
//!
//! - [`model`]: the [`VaultItem`] entity, create/patch requests and typed
//!   payloads for the well-known kinds
//! - [`document`]: the blocking [`DocumentStore`] seam and its DuckDB
//!   implementation, one JSON document per item
//! - [`store`]: [`VaultStore`], which seals fields on write and bounds every
//!   store call by a deadline
//!
//! Reads never decrypt. An item with `encrypted: true` is returned with
//! cipher tokens in `fields`; [`VaultItem::decrypt_fields`] opens it for a
//! caller that holds the key.

pub mod document;
mod error;
pub mod model;
pub mod store;

pub use document::{DEFAULT_STORE_PATH, DocumentStore, DuckDbDocumentStore, ItemUpdate};
pub use error::{FieldIssue, ValidationIssues, VaultError, VaultResult};
pub use model::{
    CardFields, CredentialFields, FieldMap, ItemKind, ItemPayload, NewVaultItem, NoteFields,
    VaultItem, VaultItemPatch,
};
pub use store::{DEFAULT_DEADLINE, VaultStore};
