//! Deadline-bounded vault item CRUD.
//!
//! [`VaultStore`] seals protected fields through the injected
//! [`KeyProvider`] before anything is written, and returns stored items
//! as-is on read: fields of an encrypted item come back as tokens and the
//! caller decides whether to open them.

use std::sync::Arc;
use std::time::Duration;

use safetrace_crypto::KeyProvider;
use safetrace_types::ItemId;
use tracing::{debug, info, warn};

use crate::document::DocumentStore;
use crate::error::{VaultError, VaultResult};
use crate::model::{NewVaultItem, VaultItem, VaultItemPatch};

/// Default per-operation deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// CRUD over vault items with field encryption applied on write.
///
/// Cheap to clone; clones share the document store and key provider.
#[derive(Clone)]
pub struct VaultStore {
    documents: Arc<dyn DocumentStore>,
    keys: Arc<KeyProvider>,
    deadline: Duration,
}

impl VaultStore {
    pub fn new(documents: Arc<dyn DocumentStore>, keys: Arc<KeyProvider>) -> Self {
        Self {
            documents,
            keys,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Sets the deadline each operation must finish within.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn keys(&self) -> &KeyProvider {
        &self.keys
    }

    /// All items of `owner_id`; empty when the owner has none.
    pub async fn list(&self, owner_id: &str) -> VaultResult<Vec<VaultItem>> {
        let owner = owner_id.to_string();
        self.run("list", move |docs| docs.find_by_owner(&owner)).await
    }

    /// The stored item, fields as persisted.
    pub async fn get(&self, id: ItemId) -> VaultResult<VaultItem> {
        self.run("get", move |docs| {
            docs.get(&id)?.ok_or(VaultError::NotFound(id))
        })
        .await
    }

    /// Validates, assigns id and timestamps, seals fields if requested and
    /// persists the item.
    pub async fn create(
        &self,
        new: NewVaultItem,
        key_override: Option<&[u8]>,
    ) -> VaultResult<VaultItem> {
        let key = self.keys.resolve(key_override)?;
        let item = new.into_item(&key)?;

        let created = self
            .run("create", move |docs| {
                docs.insert(&item)?;
                Ok(item)
            })
            .await?;
        info!(
            item_id = %created.id,
            owner_id = %created.owner_id,
            encrypted = created.encrypted,
            "vault item created"
        );
        Ok(created)
    }

    /// Applies `patch` to the stored item. Only the mutable members change.
    /// Concurrent updates to one item are last-writer-wins, and each one
    /// reads the state the previous one wrote, so `updatedAt` never goes
    /// backwards.
    pub async fn update(
        &self,
        id: ItemId,
        patch: VaultItemPatch,
        key_override: Option<&[u8]>,
    ) -> VaultResult<VaultItem> {
        let key = self.keys.resolve(key_override)?;

        let updated = self
            .run("update", move |docs| {
                docs.update_with(
                    &id,
                    Box::new(move |current: &VaultItem| current.apply_patch(patch, &key)),
                )
            })
            .await?;
        info!(item_id = %id, encrypted = updated.encrypted, "vault item updated");
        Ok(updated)
    }

    /// Removes the item for good.
    pub async fn delete(&self, id: ItemId) -> VaultResult<()> {
        self.run("delete", move |docs| {
            if docs.delete(&id)? {
                Ok(())
            } else {
                Err(VaultError::NotFound(id))
            }
        })
        .await?;
        info!(item_id = %id, "vault item deleted");
        Ok(())
    }

    /// Runs a blocking store call on the blocking pool, bounded by the
    /// deadline.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> VaultResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DocumentStore) -> VaultResult<T> + Send + 'static,
    {
        let documents = Arc::clone(&self.documents);
        let task = tokio::task::spawn_blocking(move || f(documents.as_ref()));

        match tokio::time::timeout(self.deadline, task).await {
            Ok(Ok(result)) => {
                if let Err(e) = &result {
                    debug!(operation, error = %e, "vault store operation failed");
                }
                result
            }
            Ok(Err(join_err)) => Err(VaultError::Store(format!(
                "{operation} task failed: {join_err}"
            ))),
            Err(_) => {
                warn!(operation, deadline = ?self.deadline, "vault store operation timed out");
                Err(VaultError::Timeout {
                    operation,
                    deadline: self.deadline,
                })
            }
        }
    }
}
