//! Field encryption using ChaCha20-Poly1305.
//!
//! Every value is sealed independently under a fresh random nonce and
//! rendered as a self-contained base64 token: `nonce || ciphertext || tag`.

use std::collections::BTreeMap;

use crate::error::{CryptoError, CryptoResult};
use crate::key::KEY_SIZE;
use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;

/// Nonce length; the first bytes of every decoded token.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag length, appended to the ciphertext.
pub const TAG_SIZE: usize = 16;

/// Decoded form of a field token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedToken {
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext followed by the tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedToken {
    /// Decoded length in bytes.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// The wire form stored in `fields`.
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }

    /// Parses the wire form. Only the nonce length is checked here; a body
    /// too short to hold a tag is left for the AEAD to reject.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::MalformedToken(format!("invalid base64: {e}")))?;

        if bytes.len() < NONCE_SIZE {
            return Err(CryptoError::MalformedToken(format!(
                "token is {} bytes, shorter than the {NONCE_SIZE}-byte nonce",
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }
}

fn build_cipher(key: &[u8]) -> CryptoResult<ChaCha20Poly1305> {
    ChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::CipherConfig {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

/// Encrypts raw bytes under `key`, which must be exactly [`KEY_SIZE`] bytes.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> CryptoResult<EncryptedToken> {
    let cipher = build_cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedToken {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts a decoded token under `key`.
pub fn decrypt(key: &[u8], token: &EncryptedToken) -> CryptoResult<Vec<u8>> {
    let cipher = build_cipher(key)?;
    let nonce = Nonce::from_slice(&token.nonce);

    cipher
        .decrypt(nonce, token.ciphertext.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Encrypts a single string value and returns its base64 token.
pub fn encrypt_field(key: &[u8], plaintext: &str) -> CryptoResult<String> {
    let token = encrypt(key, plaintext.as_bytes())?;
    Ok(token.to_base64())
}

/// Decrypts a base64 token produced by [`encrypt_field`].
pub fn decrypt_field(key: &[u8], token: &str) -> CryptoResult<String> {
    let token = EncryptedToken::from_base64(token)?;
    let plaintext = decrypt(key, &token)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::MalformedToken("plaintext is not valid UTF-8".to_string()))
}

/// Encrypts every value of a field map.
///
/// Either all values are sealed or an error is returned; a partially
/// encrypted map is never produced.
pub fn encrypt_fields(
    key: &[u8],
    fields: &BTreeMap<String, String>,
) -> CryptoResult<BTreeMap<String, String>> {
    check_key_len(key)?;
    fields
        .iter()
        .map(|(name, value)| {
            encrypt_field(key, value)
                .map(|token| (name.clone(), token))
                .map_err(|e| with_field(name, e))
        })
        .collect()
}

/// Decrypts every value of a field map, all or nothing.
pub fn decrypt_fields(
    key: &[u8],
    fields: &BTreeMap<String, String>,
) -> CryptoResult<BTreeMap<String, String>> {
    check_key_len(key)?;
    fields
        .iter()
        .map(|(name, token)| {
            decrypt_field(key, token)
                .map(|plain| (name.clone(), plain))
                .map_err(|e| with_field(name, e))
        })
        .collect()
}

fn check_key_len(key: &[u8]) -> CryptoResult<()> {
    if key.len() == KEY_SIZE {
        Ok(())
    } else {
        Err(CryptoError::CipherConfig {
            expected: KEY_SIZE,
            actual: key.len(),
        })
    }
}

fn with_field(name: &str, err: CryptoError) -> CryptoError {
    CryptoError::Field {
        field: name.to_string(),
        source: Box::new(err),
    }
}
