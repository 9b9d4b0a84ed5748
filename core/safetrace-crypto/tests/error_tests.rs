use safetrace_crypto::CryptoError;

#[test]
fn error_display_cipher_config() {
    let err = CryptoError::CipherConfig {
        expected: 32,
        actual: 16,
    };
    let msg = format!("{err}");
    assert!(msg.contains("32"));
    assert!(msg.contains("16"));
}

#[test]
fn error_display_malformed() {
    let err = CryptoError::MalformedToken("too short".into());
    assert!(format!("{err}").contains("malformed token"));
}

#[test]
fn error_display_authentication() {
    let err = CryptoError::AuthenticationFailed;
    assert!(format!("{err}").contains("decryption failed"));
}

#[test]
fn field_error_names_field_and_cause() {
    let err = CryptoError::Field {
        field: "cvv".into(),
        source: Box::new(CryptoError::AuthenticationFailed),
    };
    let msg = format!("{err}");
    assert!(msg.contains("cvv"));
    assert!(msg.contains("decryption failed"));
    assert!(matches!(err.root(), CryptoError::AuthenticationFailed));
}

#[test]
fn decryption_failure_classification() {
    assert!(CryptoError::AuthenticationFailed.is_decryption_failure());
    assert!(CryptoError::MalformedToken("x".into()).is_decryption_failure());
    assert!(
        !CryptoError::CipherConfig {
            expected: 32,
            actual: 1
        }
        .is_decryption_failure()
    );
    assert!(!CryptoError::Encryption("x".into()).is_decryption_failure());
}
