//! Validity window, claim validation and malformed input

mod common;

use chrono::{DateTime, Duration, Utc};
use common::{KEYS, now, sample_claims};
use proptest::prelude::*;
use sealjwt::codec::{self, JwsHeader, base64_url_encode};
use sealjwt::{
    ClaimSet, ErrorKind, Issuer, JwtError, KeyMaterial, TokenConfig, Verifier, issue, verify,
};
use serde_json::json;

fn issue_at(claims: &ClaimSet, now: DateTime<Utc>) -> String {
    issue(&KEYS.signing, &KEYS.encryption, claims, now)
        .expect("issue")
        .into_string()
}

fn verify_at(token: &str, now: DateTime<Utc>) -> Result<ClaimSet, JwtError> {
    verify(&KEYS.decryption, &KEYS.verification, token, now)
}

#[test]
fn expiration_is_inclusive() {
    let now = now();
    let claims = ClaimSet::new()
        .with_subject("john.doe@acme.com")
        .with_expiration(now);
    // Already at its expiry when issued; issuing still succeeds with a warning
    let token = issue_at(&claims, now);

    verify_at(&token, now).expect("exp == now is valid");
    assert_eq!(
        verify_at(&token, now + Duration::seconds(1)),
        Err(JwtError::TokenExpired)
    );
}

#[test]
fn token_one_second_past_expiry_is_rejected() {
    let now = now();
    let claims = ClaimSet::new()
        .with_subject("john.doe@acme.com")
        .with_expiration(now - Duration::seconds(1));
    let token = issue_at(&claims, now);

    let err = verify_at(&token, now).expect_err("expired");
    assert_eq!(err.kind(), ErrorKind::TokenExpired);
}

#[test]
fn not_before_is_inclusive() {
    let now = now();
    let claims = ClaimSet::new()
        .with_subject("john.doe@acme.com")
        .with_not_before(now + Duration::seconds(1))
        .with_expiration(now + Duration::seconds(60));
    let token = issue_at(&claims, now);

    assert_eq!(verify_at(&token, now), Err(JwtError::TokenNotYetValid));
    verify_at(&token, now + Duration::seconds(1)).expect("nbf == now is valid");
}

#[test]
fn sample_token_valid_across_its_window() {
    let now = now();
    let token = issue_at(&sample_claims(now), now);

    verify_at(&token, now - Duration::seconds(60)).expect("at nbf");
    verify_at(&token, now).expect("at issue");
    verify_at(&token, now + Duration::seconds(60)).expect("at exp");
    assert_eq!(
        verify_at(&token, now - Duration::seconds(61)).map(|_| ()),
        Err(JwtError::TokenNotYetValid)
    );
    assert_eq!(
        verify_at(&token, now + Duration::seconds(61)).map(|_| ()),
        Err(JwtError::TokenExpired)
    );
}

#[test]
fn leeway_widens_both_bounds() {
    let now = now();
    let token = issue_at(&sample_claims(now), now);
    let verifier = Verifier::new(TokenConfig {
        leeway_seconds: 30,
        ..TokenConfig::default()
    });
    let check = |at| verifier.verify(&KEYS.decryption, &KEYS.verification, &token, at);

    check(now + Duration::seconds(90)).expect("within leeway after exp");
    check(now - Duration::seconds(90)).expect("within leeway before nbf");
    assert_eq!(check(now + Duration::seconds(91)), Err(JwtError::TokenExpired));
    assert_eq!(check(now - Duration::seconds(91)), Err(JwtError::TokenNotYetValid));
}

#[test]
fn claims_without_time_bounds_never_expire() {
    let claims = ClaimSet::new().with_issuer("MyApp").with_audience("rev");
    let now = now();
    let token = issue_at(&claims, now);
    verify_at(&token, now + Duration::days(3650)).expect("no exp");
}

#[test]
fn invalid_claims_are_refused_before_any_crypto() {
    let now = now();
    let cases = [
        ("exp equal to nbf", sample_claims(now).with_not_before(now + Duration::seconds(60))),
        ("exp before nbf", sample_claims(now).with_not_before(now + Duration::seconds(120))),
        ("empty issuer", sample_claims(now).with_issuer("")),
        ("numeric subject", sample_claims(now).with_claim("sub", 7)),
        ("empty audience list", sample_claims(now).with_claim("aud", json!([]))),
        ("audience with empty entry", sample_claims(now).with_claim("aud", json!(["rev", ""]))),
        ("fractional exp", sample_claims(now).with_claim("exp", 1.5)),
        ("string nbf", sample_claims(now).with_claim("nbf", "yesterday")),
        ("empty jti", sample_claims(now).with_claim("jti", "")),
    ];

    for (label, claims) in cases {
        let err = issue(&KEYS.signing, &KEYS.encryption, &claims, now).expect_err(label);
        assert_eq!(err.kind(), ErrorKind::InvalidClaims, "{label}");
    }
}

#[test]
fn lifetime_warnings_do_not_block_issuing() {
    let now = now();
    let issuer = Issuer::new(TokenConfig {
        drift_window_seconds: 600,
        ..TokenConfig::default()
    });
    let claims = sample_claims(now);
    assert!(!claims.lifetime_advisories(now.timestamp(), 600).is_empty());
    issuer
        .issue(&KEYS.signing, &KEYS.encryption, &claims, now)
        .expect("advisories are warnings only");
}

#[test]
fn wrong_segment_counts_are_malformed() {
    let now = now();
    let token = issue_at(&sample_claims(now), now);
    let segments: Vec<&str> = token.split('.').collect();

    for count in [1, 2, 3, 4, 6] {
        let candidate = (0..count)
            .map(|i| segments[i % segments.len()])
            .collect::<Vec<_>>()
            .join(".");
        let err = verify_at(&candidate, now).expect_err("segment count");
        assert_eq!(err.kind(), ErrorKind::MalformedToken, "{count} segments");
    }
    assert_eq!(verify_at("", now).map(|_| ()).map_err(|e| e.kind()), Err(ErrorKind::MalformedToken));
}

#[test]
fn bad_base64_and_json_are_malformed() {
    let now = now();
    let token = issue_at(&sample_claims(now), now);
    let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();

    let mut bad_base64 = segments.clone();
    bad_base64[2] = "!!not-base64!!".into();
    let err = verify_at(&bad_base64.join("."), now).expect_err("base64");
    assert_eq!(err.kind(), ErrorKind::MalformedToken);

    segments[0] = base64_url_encode(b"[\"RSA-OAEP-256\"]");
    let err = verify_at(&segments.join("."), now).expect_err("array header");
    assert_eq!(err.kind(), ErrorKind::MalformedToken);

    segments[0] = base64_url_encode(br#"{"alg":"RSA1_5","enc":"A256GCM"}"#);
    let err = verify_at(&segments.join("."), now).expect_err("unsupported alg");
    assert_eq!(err.kind(), ErrorKind::MalformedToken);
}

#[test]
fn inner_payload_must_be_a_signed_token() {
    let now = now();
    let issuer = Issuer::default();
    let not_a_jws = issuer.encrypt(&KEYS.encryption, "just some text").expect("encrypt");
    let err = verify_at(not_a_jws.as_str(), now).expect_err("plain payload");
    assert_eq!(err.kind(), ErrorKind::MalformedToken);
}

/// Sign without claim validation, as a foreign issuer might.
fn sign_unchecked(claims: &ClaimSet) -> String {
    let header = JwsHeader::new(KEYS.signing.signing_algorithm())
        .with_key_id(KEYS.signing.key_id().map(str::to_string));
    let input = codec::signing_input(&header, claims).expect("signing input");
    let signature = KEYS.signing.sign(input.as_bytes()).expect("sign");
    codec::encode_signed(&header, claims, &signature).expect("encode")
}

#[test]
fn non_integer_time_bounds_are_rejected() {
    let now = now();
    let long_expired = ClaimSet::new()
        .with_subject("john.doe@acme.com")
        .with_claim("exp", 1000.5);
    let future_nbf = ClaimSet::new()
        .with_subject("john.doe@acme.com")
        .with_claim("nbf", json!("1900000000"));

    for claims in [long_expired, future_nbf] {
        let envelope = Issuer::default()
            .encrypt(&KEYS.encryption, &sign_unchecked(&claims))
            .expect("encrypt");
        let err = verify_at(envelope.as_str(), now).expect_err("non-integer bound");
        assert_eq!(err.kind(), ErrorKind::InvalidClaims);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn arbitrary_input_never_panics(input in ".{0,512}") {
        let result = verify_at(&input, now());
        prop_assert!(result.is_err());
    }

    #[test]
    fn arbitrary_segment_counts_are_malformed(
        segments in prop::collection::vec("[A-Za-z0-9_-]{0,24}", 0..12)
            .prop_filter("five segments", |s| s.len() != 5)
    ) {
        let input = segments.join(".");
        // Joining zero segments yields one empty segment
        let err = verify_at(&input, now()).expect_err("malformed");
        prop_assert_eq!(err.kind(), ErrorKind::MalformedToken);
    }

    #[test]
    fn five_random_segments_never_verify(
        segments in prop::collection::vec("[A-Za-z0-9_-]{0,48}", 5)
    ) {
        let result = verify_at(&segments.join("."), now());
        prop_assert!(result.is_err());
    }
}
