use safetrace_crypto::{
    CryptoError, FieldKey, INSECURE_DEFAULT_KEY, KEY_SIZE, KeyPolicy, KeyProvider, KeySource,
    ReadinessFinding, decrypt_field, encrypt_field, generate_random_key, normalize_key,
};

// ── FieldKey ─────────────────────────────────────────────────────

#[test]
fn from_slice_accepts_exact_length() {
    let key = FieldKey::from_slice(&[9u8; KEY_SIZE]).unwrap();
    assert_eq!(key.as_bytes(), &[9u8; KEY_SIZE]);
}

#[test]
fn from_slice_rejects_other_lengths() {
    for len in [0, 1, 16, 31, 33, 64] {
        let err = FieldKey::from_slice(&vec![0u8; len]).unwrap_err();
        assert!(matches!(err, CryptoError::CipherConfig { actual, .. } if actual == len));
    }
}

#[test]
fn debug_redacts_key_bytes() {
    let key = FieldKey::from_bytes([0xAB; KEY_SIZE]);
    let debug = format!("{key:?}");
    assert!(debug.contains("REDACTED"));
    assert!(!debug.contains("171"));
}

#[test]
fn random_keys_differ() {
    assert_ne!(generate_random_key(), generate_random_key());
}

// ── Normalization ────────────────────────────────────────────────

#[test]
fn short_key_is_zero_padded() {
    let key = normalize_key(b"0123456789");
    let mut expected = [0u8; KEY_SIZE];
    expected[..10].copy_from_slice(b"0123456789");
    assert_eq!(key.as_bytes(), &expected);
}

#[test]
fn long_key_is_truncated() {
    let material: Vec<u8> = (0u8..40).collect();
    let key = normalize_key(&material);
    assert_eq!(&key.as_bytes()[..], &material[..KEY_SIZE]);
}

#[test]
fn exact_key_is_unchanged() {
    let key = normalize_key(&[5u8; KEY_SIZE]);
    assert_eq!(key.as_bytes(), &[5u8; KEY_SIZE]);
}

#[test]
fn ten_byte_key_interchangeable_with_padded_form() {
    let short = normalize_key(b"tenbytekey");
    let mut padded = [0u8; KEY_SIZE];
    padded[..10].copy_from_slice(b"tenbytekey");

    let token = encrypt_field(short.as_bytes(), "hello").unwrap();
    assert_eq!(decrypt_field(&padded, &token).unwrap(), "hello");

    let token = encrypt_field(&padded, "world").unwrap();
    assert_eq!(decrypt_field(short.as_bytes(), &token).unwrap(), "world");
}

#[test]
fn forty_byte_key_truncates_identically() {
    let material = [b'k'; 40];
    let provider = KeyProvider::new(Some(material.as_slice()), KeyPolicy::Normalize).unwrap();
    let enc_key = provider.resolve(None).unwrap();
    let dec_key = provider.resolve(None).unwrap();

    let token = encrypt_field(enc_key.as_bytes(), "payload").unwrap();
    assert_eq!(decrypt_field(dec_key.as_bytes(), &token).unwrap(), "payload");
    assert_eq!(decrypt_field(&[b'k'; KEY_SIZE], &token).unwrap(), "payload");
}

// ── KeyProvider resolution ───────────────────────────────────────

#[test]
fn absent_key_falls_back_to_default() {
    let provider = KeyProvider::new(None, KeyPolicy::Normalize).unwrap();
    assert_eq!(provider.source(), KeySource::InsecureDefault);
    assert_eq!(
        provider.resolve(None).unwrap(),
        normalize_key(INSECURE_DEFAULT_KEY)
    );
}

#[test]
fn empty_key_is_treated_as_absent() {
    let provider = KeyProvider::new(Some(b"".as_slice()), KeyPolicy::Strict).unwrap();
    assert_eq!(provider.source(), KeySource::InsecureDefault);
}

#[test]
fn configured_key_is_used() {
    let material = [3u8; KEY_SIZE];
    let provider = KeyProvider::new(Some(material.as_slice()), KeyPolicy::Normalize).unwrap();
    assert_eq!(provider.source(), KeySource::Configured);
    assert_eq!(provider.resolve(None).unwrap().as_bytes(), &material);
}

#[test]
fn override_wins_over_process_key() {
    let provider = KeyProvider::new(Some([3u8; KEY_SIZE].as_slice()), KeyPolicy::Normalize).unwrap();
    let key = provider.resolve(Some([4u8; KEY_SIZE].as_slice())).unwrap();
    assert_eq!(key.as_bytes(), &[4u8; KEY_SIZE]);
}

#[test]
fn empty_override_uses_process_key() {
    let provider = KeyProvider::new(Some([3u8; KEY_SIZE].as_slice()), KeyPolicy::Normalize).unwrap();
    assert_eq!(provider.resolve(Some(b"".as_slice())).unwrap().as_bytes(), &[3u8; KEY_SIZE]);
}

#[test]
fn override_is_normalized() {
    let provider = KeyProvider::insecure_default(KeyPolicy::Normalize);
    assert_eq!(
        provider.resolve(Some(b"short".as_slice())).unwrap(),
        normalize_key(b"short")
    );
}

// ── Strict policy ────────────────────────────────────────────────

#[test]
fn strict_rejects_wrong_length_configured_key() {
    let err = KeyProvider::new(Some(b"tooshort".as_slice()), KeyPolicy::Strict).unwrap_err();
    assert!(matches!(err, CryptoError::CipherConfig { actual: 8, .. }));
}

#[test]
fn strict_rejects_wrong_length_override() {
    let provider = KeyProvider::new(Some([1u8; KEY_SIZE].as_slice()), KeyPolicy::Strict).unwrap();
    assert!(provider.resolve(Some([1u8; 40].as_slice())).is_err());
    assert!(provider.resolve(Some([1u8; KEY_SIZE].as_slice())).is_ok());
    assert_eq!(provider.policy(), KeyPolicy::Strict);
}

// ── Readiness ────────────────────────────────────────────────────

#[test]
fn default_key_is_flagged() {
    let provider = KeyProvider::new(None, KeyPolicy::Normalize).unwrap();
    assert_eq!(provider.readiness(), vec![ReadinessFinding::InsecureDefaultKey]);
}

#[test]
fn reshaped_key_is_flagged() {
    let provider = KeyProvider::new(Some(b"0123456789".as_slice()), KeyPolicy::Normalize).unwrap();
    assert_eq!(
        provider.readiness(),
        vec![ReadinessFinding::KeyReshaped { actual: 10 }]
    );
}

#[test]
fn exact_configured_key_is_ready() {
    let provider = KeyProvider::new(Some([8u8; KEY_SIZE].as_slice()), KeyPolicy::Normalize).unwrap();
    assert!(provider.readiness().is_empty());
}

#[test]
fn readiness_finding_display() {
    let msg = ReadinessFinding::InsecureDefaultKey.to_string();
    assert!(msg.contains("insecure"));
    let msg = ReadinessFinding::KeyReshaped { actual: 40 }.to_string();
    assert!(msg.contains("40"));
    assert!(msg.contains("32"));
}
