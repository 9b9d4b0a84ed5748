use std::sync::Arc;

use pretty_assertions::assert_eq;
use safetrace_crypto::{KeyPolicy, KeyProvider};
use safetrace_server::{DELETED_MESSAGE, UPDATED_MESSAGE, VaultService};
use safetrace_vault::{
    CredentialFields, DuckDbDocumentStore, ItemKind, NewVaultItem, NoteFields, VaultError,
    VaultItemPatch, VaultStore,
};

fn service() -> VaultService {
    let docs = DuckDbDocumentStore::open_in_memory().unwrap();
    let keys = KeyProvider::insecure_default(KeyPolicy::Normalize);
    VaultService::new(VaultStore::new(Arc::new(docs), Arc::new(keys)))
}

fn credential(password: &str) -> NewVaultItem {
    let creds = CredentialFields {
        username: "alice".into(),
        password: password.into(),
        ..Default::default()
    };
    NewVaultItem::from_payload("u1", "Bank", &creds).unwrap()
}

// ── Validation at the boundary ───────────────────────────────────

#[tokio::test]
async fn list_without_owner_is_rejected() {
    let svc = service();
    for owner in [None, Some(""), Some("   ")] {
        let err = svc.list(owner).await.unwrap_err();
        assert!(matches!(err, VaultError::Validation(ref i) if i.mentions("ownerId")));
    }
}

#[tokio::test]
async fn malformed_ids_are_validation_errors() {
    let svc = service();
    assert!(matches!(
        svc.get("12345").await,
        Err(VaultError::Validation(ref i)) if i.mentions("id")
    ));
    assert!(matches!(
        svc.update("nope", VaultItemPatch::default(), None).await,
        Err(VaultError::Validation(_))
    ));
    assert!(matches!(
        svc.delete("").await,
        Err(VaultError::Validation(_))
    ));
}

#[tokio::test]
async fn invalid_create_never_reaches_store() {
    let svc = service();
    let err = svc
        .create(NewVaultItem::new("u1", ItemKind::Note, ""), None)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Validation(_)));
    assert!(svc.list(Some("u1")).await.unwrap().is_empty());
}

// ── Password warnings ────────────────────────────────────────────

#[tokio::test]
async fn strong_password_has_no_warnings() {
    let created = service()
        .create(credential("C0rrect-Horse!"), None)
        .await
        .unwrap();
    assert!(created.warnings.is_empty());
}

#[tokio::test]
async fn weak_password_warns_in_rule_order() {
    let created = service().create(credential("abc"), None).await.unwrap();
    assert_eq!(
        created.warnings,
        vec![
            "Password should be at least 8 characters long",
            "Password should contain at least one uppercase letter",
            "Password should contain at least one number",
            "Password should contain at least one special character",
        ]
    );
}

#[tokio::test]
async fn warnings_are_checked_before_sealing() {
    let created = service()
        .create(credential("qwerty").encrypted(true), None)
        .await
        .unwrap();
    assert!(created.item.encrypted);
    assert!(created.warnings.iter().any(|w| w.contains("common patterns")));
}

#[tokio::test]
async fn non_credential_items_are_not_scored() {
    let note = NewVaultItem::from_payload(
        "u1",
        "Wifi",
        &NoteFields {
            content: "password".into(),
        },
    )
    .unwrap();
    let created = service().create(note, None).await.unwrap();
    assert!(created.warnings.is_empty());
}

// ── Confirmations ────────────────────────────────────────────────

#[tokio::test]
async fn update_and_delete_confirm_with_id() {
    let svc = service();
    let created = svc.create(credential("C0rrect-Horse!"), None).await.unwrap();
    let id = created.item.id.to_string();

    let patch = VaultItemPatch {
        description: Some("joint account".into()),
        ..Default::default()
    };
    let updated = svc.update(&id, patch, None).await.unwrap();
    assert_eq!(updated.message, UPDATED_MESSAGE);
    assert_eq!(updated.id, created.item.id);
    assert_eq!(svc.get(&id).await.unwrap().description, "joint account");

    let deleted = svc.delete(&id).await.unwrap();
    assert_eq!(deleted.message, DELETED_MESSAGE);
    assert!(matches!(svc.get(&id).await, Err(VaultError::NotFound(_))));
}
