//! Request handling between the HTTP boundary and the vault store.
//!
//! [`VaultService`] validates everything it receives before the store or
//! cipher is touched, then shapes the store's results into response bodies.

use safetrace_crypto::check_password;
use safetrace_types::ItemId;
use safetrace_vault::{
    CredentialFields, ItemKind, ItemPayload, NewVaultItem, VaultError, VaultItem, VaultItemPatch,
    VaultResult, VaultStore,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

pub const UPDATED_MESSAGE: &str = "Vault item updated successfully";
pub const DELETED_MESSAGE: &str = "Vault item deleted successfully";

/// Body of a successful create: the stored item plus advisory warnings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatedItem {
    #[serde(flatten)]
    pub item: VaultItem,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Body of a successful update or delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
    pub id: ItemId,
}

impl Confirmation {
    fn new(message: &str, id: ItemId) -> Self {
        Self {
            message: message.to_string(),
            id,
        }
    }
}

#[derive(Clone)]
pub struct VaultService {
    store: VaultStore,
}

impl VaultService {
    pub fn new(store: VaultStore) -> Self {
        Self { store }
    }

    pub async fn list(&self, owner_id: Option<&str>) -> VaultResult<Vec<VaultItem>> {
        let owner_id = owner_id
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .ok_or_else(|| VaultError::invalid("ownerId", "ownerId is required"))?;
        self.store.list(owner_id).await
    }

    pub async fn get(&self, id: &str) -> VaultResult<VaultItem> {
        self.store.get(parse_id(id)?).await
    }

    /// Creates an item. Weak passwords on credential items are reported in
    /// `warnings` and never block the create.
    pub async fn create(
        &self,
        new: NewVaultItem,
        key_override: Option<&[u8]>,
    ) -> VaultResult<CreatedItem> {
        new.validate()?;
        let warnings = password_warnings(&new);
        if !warnings.is_empty() {
            debug!(owner_id = %new.owner_id, count = warnings.len(), "weak password on create");
        }
        let item = self.store.create(new, key_override).await?;
        Ok(CreatedItem { item, warnings })
    }

    pub async fn update(
        &self,
        id: &str,
        patch: VaultItemPatch,
        key_override: Option<&[u8]>,
    ) -> VaultResult<Confirmation> {
        let id = parse_id(id)?;
        patch.validate()?;
        self.store.update(id, patch, key_override).await?;
        Ok(Confirmation::new(UPDATED_MESSAGE, id))
    }

    pub async fn delete(&self, id: &str) -> VaultResult<Confirmation> {
        let id = parse_id(id)?;
        self.store.delete(id).await?;
        Ok(Confirmation::new(DELETED_MESSAGE, id))
    }
}

fn parse_id(raw: &str) -> VaultResult<ItemId> {
    ItemId::parse(raw).map_err(|_| VaultError::invalid("id", "invalid id format"))
}

fn password_warnings(new: &NewVaultItem) -> Vec<String> {
    if ItemKind::from(new.kind.clone()) != ItemKind::Password {
        return Vec::new();
    }
    let Ok(credential) = CredentialFields::from_fields(&new.fields) else {
        return Vec::new();
    };
    if credential.password.is_empty() {
        return Vec::new();
    }
    let report = check_password(&credential.password);
    if report.is_strong {
        return Vec::new();
    }
    report.reasons.into_iter().map(String::from).collect()
}
