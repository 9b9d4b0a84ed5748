//! The vault item entity and its lifecycle rules.
//!
//! A [`VaultItem`] is created from a validated [`NewVaultItem`] and only
//! ever changed through [`VaultItem::apply_patch`]. Both paths keep the
//! `encrypted` flag in step with the actual state of `fields`: when it is
//! set, every value is a cipher token.

use std::collections::BTreeMap;
use std::fmt;

use safetrace_crypto::{FieldKey, decrypt_fields, encrypt_fields};
use safetrace_types::{ItemId, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{VaultError, VaultResult};

/// Field name -> value. Iteration order carries no meaning.
pub type FieldMap = BTreeMap<String, String>;

/// Tag selecting the shape of an item's fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    /// Login credential (`username`, `password`, `url`, `notes`).
    Password,
    /// Payment card.
    Card,
    /// Free-text secure note.
    Note,
    /// Any other non-empty tag, kept exactly as sent.
    Other(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::Password => "password",
            ItemKind::Card => "card",
            ItemKind::Note => "note",
            ItemKind::Other(s) => s,
        }
    }

    /// Field names the well-known kinds carry.
    pub fn expected_fields(&self) -> &'static [&'static str] {
        match self {
            ItemKind::Password => &["username", "password", "url", "notes"],
            ItemKind::Card => &[
                "cardholderName",
                "cardNumber",
                "expiryMonth",
                "expiryYear",
                "cvv",
                "notes",
            ],
            ItemKind::Note => &["content"],
            ItemKind::Other(_) => &[],
        }
    }
}

impl From<String> for ItemKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "password" => ItemKind::Password,
            "card" => ItemKind::Card,
            "note" => ItemKind::Note,
            _ => ItemKind::Other(s),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted vault item.
///
/// This is also the stored document layout: one JSON document per item,
/// keyed by `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: ItemId,
    pub owner_id: String,
    pub kind: ItemKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub encrypted: bool,
    #[serde(default)]
    pub fields: FieldMap,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request to create an item. `id` and timestamps are assigned by the store.
///
/// Accepts the legacy names `userId`, `type` and `data`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVaultItem {
    #[serde(default, alias = "userId")]
    #[validate(length(min = 1, message = "ownerId is required"))]
    pub owner_id: String,
    #[serde(default, alias = "type")]
    #[validate(length(min = 1, message = "kind is required"))]
    pub kind: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default, alias = "data")]
    pub fields: FieldMap,
}

impl NewVaultItem {
    pub fn new(owner_id: impl Into<String>, kind: ItemKind, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind: kind.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builds a request whose kind and fields come from a typed payload.
    pub fn from_payload<P: ItemPayload>(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        payload: &P,
    ) -> VaultResult<Self> {
        Ok(Self {
            fields: payload.to_fields()?,
            ..Self::new(owner_id, P::kind(), title)
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    /// Turns the request into a persisted-shape item.
    ///
    /// Validates first; when encryption is requested every field value is
    /// sealed under `key` before the item exists.
    pub fn into_item(self, key: &FieldKey) -> VaultResult<VaultItem> {
        self.validate()?;
        let fields = if self.encrypted {
            encrypt_fields(key.as_bytes(), &self.fields)?
        } else {
            self.fields
        };
        let now = Timestamp::now();
        Ok(VaultItem {
            id: ItemId::new(),
            owner_id: self.owner_id,
            kind: self.kind.into(),
            title: self.title,
            description: self.description,
            encrypted: self.encrypted,
            fields,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update of an item's mutable fields.
///
/// Absent members keep their stored value. Immutable members (`id`,
/// `ownerId`, `kind`, `createdAt`) are not part of the patch and are
/// ignored if a client sends them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VaultItemPatch {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub encrypted: Option<bool>,
    #[serde(alias = "data")]
    pub fields: Option<FieldMap>,
}

impl VaultItem {
    /// Returns the item with the patch applied and `updatedAt` advanced.
    ///
    /// New field values are sealed when the resulting item is encrypted.
    /// Toggling `encrypted` without supplying replacement fields is
    /// rejected, since stored values cannot be reshaped in place.
    pub fn apply_patch(&self, patch: VaultItemPatch, key: &FieldKey) -> VaultResult<VaultItem> {
        patch.validate()?;
        let encrypted = patch.encrypted.unwrap_or(self.encrypted);
        let fields = match patch.fields {
            Some(fields) if encrypted => encrypt_fields(key.as_bytes(), &fields)?,
            Some(fields) => fields,
            None if encrypted == self.encrypted => self.fields.clone(),
            None => {
                return Err(VaultError::invalid(
                    "fields",
                    "changing encrypted requires supplying fields",
                ));
            }
        };

        Ok(VaultItem {
            id: self.id,
            owner_id: self.owner_id.clone(),
            kind: self.kind.clone(),
            title: patch.title.unwrap_or_else(|| self.title.clone()),
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            encrypted,
            fields,
            created_at: self.created_at,
            updated_at: Timestamp::advance_from(&self.updated_at),
        })
    }

    /// Returns a plaintext copy of this item.
    ///
    /// Stored items are never decrypted on read; callers that hold the key
    /// use this. Fails as a whole if any field does not open.
    pub fn decrypt_fields(&self, key: &FieldKey) -> VaultResult<VaultItem> {
        if !self.encrypted {
            return Ok(self.clone());
        }
        Ok(VaultItem {
            encrypted: false,
            fields: decrypt_fields(key.as_bytes(), &self.fields)?,
            ..self.clone()
        })
    }

    /// Reads the fields into a typed payload. The item must be plaintext.
    pub fn payload<P: ItemPayload>(&self) -> VaultResult<P> {
        if self.encrypted {
            return Err(VaultError::invalid(
                "encrypted",
                "decrypt the item before reading its payload",
            ));
        }
        P::from_fields(&self.fields)
    }
}

/// Typed view over the fields of a well-known kind.
pub trait ItemPayload: Serialize + DeserializeOwned {
    fn kind() -> ItemKind;

    fn to_fields(&self) -> VaultResult<FieldMap> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }

    fn from_fields(fields: &FieldMap) -> VaultResult<Self> {
        Ok(serde_json::from_value(serde_json::to_value(fields)?)?)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialFields {
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

impl ItemPayload for CredentialFields {
    fn kind() -> ItemKind {
        ItemKind::Password
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardFields {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub notes: String,
}

impl ItemPayload for CardFields {
    fn kind() -> ItemKind {
        ItemKind::Card
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteFields {
    pub content: String,
}

impl ItemPayload for NoteFields {
    fn kind() -> ItemKind {
        ItemKind::Note
    }
}
