//! HTTP API for the vault.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use safetrace_crypto::CryptoError;
use safetrace_vault::{NewVaultItem, ValidationIssues, VaultError, VaultItem, VaultItemPatch};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::service::{Confirmation, CreatedItem, VaultService};

/// Optional request header carrying a per-caller encryption key.
pub const ENCRYPTION_KEY_HEADER: &str = "x-encryption-key";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationIssues>,
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    #[serde(rename = "ownerId", alias = "userId")]
    owner_id: Option<String>,
}

/// Error returned by handlers; renders as a status plus [`ErrorBody`].
#[derive(Debug)]
pub enum ApiError {
    Vault(VaultError),
    BadBody(String),
}

impl From<VaultError> for ApiError {
    fn from(e: VaultError) -> Self {
        ApiError::Vault(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadBody(reason) => (StatusCode::BAD_REQUEST, reason, None),
            ApiError::Vault(VaultError::Validation(issues)) => (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                Some(issues),
            ),
            ApiError::Vault(VaultError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                "vault item not found".to_string(),
                None,
            ),
            ApiError::Vault(VaultError::Crypto(e)) => {
                warn!(error = %e, "field cipher failure");
                crypto_response(&e)
            }
            ApiError::Vault(VaultError::Timeout { operation, deadline }) => {
                warn!(operation, ?deadline, "request deadline exceeded");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "request timed out".to_string(),
                    None,
                )
            }
            ApiError::Vault(e) => {
                error!(error = %e, "vault store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                    None,
                )
            }
        };
        (status, Json(ErrorBody { error, details })).into_response()
    }
}

/// Crypto failures never carry detail past this point.
fn crypto_response(e: &CryptoError) -> (StatusCode, String, Option<ValidationIssues>) {
    if e.is_decryption_failure() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "decryption failed".to_string(),
            None,
        );
    }
    // Under the strict policy a wrong-length caller key is a client error.
    let status = match e.root() {
        CryptoError::CipherConfig { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, "encryption failed".to_string(), None)
}

fn key_override(headers: &HeaderMap) -> Option<&[u8]> {
    headers.get(ENCRYPTION_KEY_HEADER).map(|v| v.as_bytes())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn list_items(
    State(service): State<VaultService>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<VaultItem>>, ApiError> {
    Ok(Json(service.list(query.owner_id.as_deref()).await?))
}

async fn get_item(
    State(service): State<VaultService>,
    Path(id): Path<String>,
) -> Result<Json<VaultItem>, ApiError> {
    Ok(Json(service.get(&id).await?))
}

async fn create_item(
    State(service): State<VaultService>,
    headers: HeaderMap,
    body: Result<Json<NewVaultItem>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedItem>), ApiError> {
    let Json(new) = body?;
    let created = service.create(new, key_override(&headers)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_item(
    State(service): State<VaultService>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<VaultItemPatch>, JsonRejection>,
) -> Result<Json<Confirmation>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(
        service.update(&id, patch, key_override(&headers)).await?,
    ))
}

async fn delete_item(
    State(service): State<VaultService>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    Ok(Json(service.delete(&id).await?))
}

/// Build the HTTP API router over the given service.
pub fn build_router(service: VaultService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/vault", get(list_items).post(create_item))
        .route(
            "/vault/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(service)
}
