//! Field-level encryption for SafeTrace vault items.
//!
//! - [`cipher`]: ChaCha20-Poly1305 sealing of individual string values into
//!   base64 tokens, with whole-map helpers that never leave a map half
//!   encrypted.
//! - [`key`]: the [`KeyProvider`] that resolves which 32-byte key a call
//!   uses and reports whether the key setup is fit for production.
//! - [`strength`]: advisory password scoring for credential items.

pub mod cipher;
mod error;
pub mod key;
pub mod strength;

pub use cipher::{
    EncryptedToken, NONCE_SIZE, TAG_SIZE, decrypt, decrypt_field, decrypt_fields, encrypt,
    encrypt_field, encrypt_fields,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    FieldKey, INSECURE_DEFAULT_KEY, KEY_SIZE, KeyPolicy, KeyProvider, KeySource,
    ReadinessFinding, generate_random_key, normalize_key,
};
pub use strength::{StrengthReport, check_password};
