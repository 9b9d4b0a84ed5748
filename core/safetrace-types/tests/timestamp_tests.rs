use proptest::prelude::*;
use safetrace_types::Timestamp;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn now_is_after_epoch() {
    assert!(Timestamp::now().millis() > 0);
}

#[test]
fn from_millis_roundtrip() {
    let ts = Timestamp::from_millis(1_700_000_000_123).unwrap();
    assert_eq!(ts.millis(), 1_700_000_000_123);
}

#[test]
fn from_millis_out_of_range_fails() {
    assert!(Timestamp::from_millis(i64::MAX).is_err());
}

// ── Monotonicity ─────────────────────────────────────────────────

#[test]
fn advance_from_past_uses_now() {
    let old = Timestamp::from_millis(1_000).unwrap();
    let next = Timestamp::advance_from(&old);
    assert!(next.millis() > 1_000_000);
}

#[test]
fn advance_from_future_is_strictly_greater() {
    let future = Timestamp::from_millis(Timestamp::now().millis() + 60_000).unwrap();
    let next = Timestamp::advance_from(&future);
    assert!(future.is_before(&next));
}

#[test]
fn repeated_advances_strictly_increase() {
    let mut ts = Timestamp::now();
    for _ in 0..100 {
        let next = Timestamp::advance_from(&ts);
        assert!(ts < next);
        ts = next;
    }
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_as_rfc3339() {
    let ts = Timestamp::from_millis(0).unwrap();
    let json = serde_json::to_string(&ts).unwrap();
    assert!(json.starts_with("\"1970-01-01T00:00:00"));
}

#[test]
fn serde_roundtrip_preserves_precision() {
    let ts = Timestamp::now();
    let json = serde_json::to_string(&ts).unwrap();
    let back: Timestamp = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ts);
}

proptest! {
    #[test]
    fn advance_never_goes_backwards(millis in 0i64..4_000_000_000_000) {
        let ts = Timestamp::from_millis(millis).unwrap();
        prop_assert!(ts < Timestamp::advance_from(&ts));
    }
}
