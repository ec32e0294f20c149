use hb_kernel::security::{PayloadGuard, excerpt};
use proptest::prelude::*;

proptest! {
    #[test]
    fn excerpt_is_a_bounded_prefix(raw in ".{0,300}", max in 0usize..64) {
        let shown = excerpt(&raw, max);
        let body = shown.strip_suffix("...").unwrap_or(&shown);
        prop_assert!(raw.starts_with(body));
        prop_assert!(body.chars().count() <= max);
    }

    #[test]
    fn plain_words_never_trip_the_scanner(words in proptest::collection::vec("[A-Za-z0-9 ]{0,24}", 0..8)) {
        let guard = PayloadGuard::new(1 << 20, 128).unwrap();
        let payload = serde_json::json!({ "items": words });
        prop_assert!(guard.scan(&payload).is_ok());
    }
}

#[test]
fn limit_is_inclusive() {
    let guard = PayloadGuard::new(8, 128).unwrap();
    assert!(guard.check_size("12345678").is_ok());
    assert!(guard.check_size("123456789").is_err());
}
