//! Key resolution and normalization.
//!
//! A [`KeyProvider`] is built once at startup from the configured
//! process-wide key and injected wherever fields are sealed. Each call
//! resolves the byte key to use: the caller's override if one was supplied,
//! otherwise the process key, otherwise a fixed insecure default.

use std::fmt;

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// Fallback key used when no key is configured. Not suitable for
/// production; its use is reported by [`KeyProvider::readiness`].
pub const INSECURE_DEFAULT_KEY: &[u8] = b"defaultsecretkey12345678901234567890";

/// A 32-byte field key with automatic zeroization on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct FieldKey {
    bytes: [u8; KEY_SIZE],
}

impl FieldKey {
    /// Creates a key from exactly [`KEY_SIZE`] raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a key from a slice, failing unless it is exactly
    /// [`KEY_SIZE`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let array: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CryptoError::CipherConfig {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(array))
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generates a random field key.
pub fn generate_random_key() -> FieldKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    FieldKey::from_bytes(bytes)
}

/// Reshapes arbitrary key material to [`KEY_SIZE`] bytes.
///
/// Shorter input is zero-padded on the right, longer input is truncated.
pub fn normalize_key(material: &[u8]) -> FieldKey {
    let mut bytes = [0u8; KEY_SIZE];
    let len = material.len().min(KEY_SIZE);
    bytes[..len].copy_from_slice(&material[..len]);
    FieldKey::from_bytes(bytes)
}

/// How key material of the wrong length is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Zero-pad or truncate to [`KEY_SIZE`].
    #[default]
    Normalize,
    /// Reject anything that is not exactly [`KEY_SIZE`] bytes.
    Strict,
}

impl KeyPolicy {
    /// Applies the policy to raw key material.
    pub fn apply(self, material: &[u8]) -> CryptoResult<FieldKey> {
        match self {
            KeyPolicy::Normalize => Ok(normalize_key(material)),
            KeyPolicy::Strict => FieldKey::from_slice(material),
        }
    }
}

/// Where the process-wide key came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// Supplied through configuration.
    Configured,
    /// The built-in [`INSECURE_DEFAULT_KEY`].
    InsecureDefault,
}

/// A problem that makes the key setup unsuitable for production.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadinessFinding {
    /// No process key was configured; the built-in default is in use.
    InsecureDefaultKey,
    /// The configured key was padded or truncated to fit the cipher.
    KeyReshaped { actual: usize },
}

impl fmt::Display for ReadinessFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessFinding::InsecureDefaultKey => {
                write!(f, "no encryption key configured, using the insecure built-in default")
            }
            ReadinessFinding::KeyReshaped { actual } => write!(
                f,
                "configured encryption key is {actual} bytes and was reshaped to {KEY_SIZE}"
            ),
        }
    }
}

/// Resolves the key used to seal or open vault fields.
///
/// Immutable after construction and safe to share across threads.
#[derive(Clone, Debug)]
pub struct KeyProvider {
    process_key: FieldKey,
    source: KeySource,
    policy: KeyPolicy,
    configured_len: Option<usize>,
}

impl KeyProvider {
    /// Builds a provider from the configured process key.
    ///
    /// An absent or empty key selects the insecure default. Under
    /// [`KeyPolicy::Strict`] a configured key of the wrong length is an
    /// error.
    pub fn new(configured: Option<&[u8]>, policy: KeyPolicy) -> CryptoResult<Self> {
        match configured.filter(|k| !k.is_empty()) {
            Some(material) => Ok(Self {
                process_key: policy.apply(material)?,
                source: KeySource::Configured,
                policy,
                configured_len: Some(material.len()),
            }),
            None => Ok(Self::insecure_default(policy)),
        }
    }

    /// A provider backed only by [`INSECURE_DEFAULT_KEY`].
    pub fn insecure_default(policy: KeyPolicy) -> Self {
        Self {
            process_key: normalize_key(INSECURE_DEFAULT_KEY),
            source: KeySource::InsecureDefault,
            policy,
            configured_len: None,
        }
    }

    /// Resolves the key for one call.
    ///
    /// A non-empty `override_key` wins and is shaped by the provider's
    /// policy; otherwise the process key is returned.
    pub fn resolve(&self, override_key: Option<&[u8]>) -> CryptoResult<FieldKey> {
        match override_key.filter(|k| !k.is_empty()) {
            Some(material) => {
                if material.len() != KEY_SIZE {
                    debug!(len = material.len(), policy = ?self.policy, "caller key has unexpected length");
                }
                self.policy.apply(material)
            }
            None => Ok(self.process_key.clone()),
        }
    }

    /// Where the process key came from.
    pub fn source(&self) -> KeySource {
        self.source
    }

    /// The active length policy.
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Production-readiness check of the key setup. Empty means ready.
    pub fn readiness(&self) -> Vec<ReadinessFinding> {
        let mut findings = Vec::new();
        if self.source == KeySource::InsecureDefault {
            findings.push(ReadinessFinding::InsecureDefaultKey);
        }
        if let Some(actual) = self.configured_len.filter(|len| *len != KEY_SIZE) {
            findings.push(ReadinessFinding::KeyReshaped { actual });
        }
        findings
    }
}
