//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// The `Display` output never contains plaintext or key material.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key cannot build a cipher instance.
    #[error("cipher configuration error: key must be {expected} bytes, got {actual}")]
    CipherConfig { expected: usize, actual: usize },

    /// The token is not valid base64, is too short, or does not decode to
    /// UTF-8 text.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Tag verification failed (tampered data or wrong key).
    #[error("decryption failed (wrong key or tampered data)")]
    AuthenticationFailed,

    /// The AEAD refused to seal the plaintext.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// A field failed during a whole-map operation.
    #[error("field {field:?}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<CryptoError>,
    },
}

impl CryptoError {
    /// Returns the innermost error, unwrapping field context.
    pub fn root(&self) -> &CryptoError {
        match self {
            CryptoError::Field { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the failure happened while opening a token.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self.root(),
            CryptoError::MalformedToken(_) | CryptoError::AuthenticationFailed
        )
    }
}
