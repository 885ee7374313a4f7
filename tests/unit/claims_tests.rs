use std::time::Duration;

use bearer_session::token::claims::{decode, is_fresh_enough};
use jiff::Timestamp;

use crate::common::{IDENTITY, mint};

fn at(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap()
}

#[test]
fn claims_expose_identity_and_expiry() {
    let claims = decode(&mint(IDENTITY, 1_000)).expect("decodes");
    assert_eq!(claims.identity_id().as_deref(), Some(IDENTITY));
    assert_eq!(claims.email(), Some("scout@example.com"));
    assert_eq!(claims.role(), Some("member"));
    assert_eq!(claims.issued_at(), Some(at(100)));
    assert_eq!(claims.expires_at_secs(), 1_000);
    assert_eq!(claims.remaining(at(900)), Some(Duration::from_secs(100)));
}

#[test]
fn scenario_a_twenty_five_seconds_left_is_stale() {
    assert!(!is_fresh_enough(&mint(IDENTITY, 1_000), Duration::from_secs(30), at(975)));
}

#[test]
fn scenario_b_hundred_seconds_left_is_fresh() {
    assert!(is_fresh_enough(&mint(IDENTITY, 1_000), Duration::from_secs(30), at(900)));
}

#[test]
fn tampered_signature_still_decodes() {
    let token = mint(IDENTITY, 1_000);
    let (head, _sig) = token.rsplit_once('.').unwrap();
    let forged = format!("{head}.AAAA");
    assert_eq!(decode(&forged).unwrap().expires_at_secs(), 1_000);
}

#[test]
fn truncated_credential_is_stale_not_fatal() {
    let token = mint(IDENTITY, 10_000);
    let truncated = &token[..token.len() / 2];
    assert!(decode(truncated).is_err());
    assert!(!is_fresh_enough(truncated, Duration::from_secs(30), at(0)));
}
