//! Shared key fixtures for integration tests
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use rsa::RsaPrivateKey;
use sealjwt::{ClaimSet, JwtError, KeyError, KeyManagementAlgorithm, KeyMaterial, RsaKey, SigningAlgorithm};

/// Sender's signing key and the receiver's encryption key, with public halves
pub struct Keys {
    pub signing: RsaKey,
    pub verification: RsaKey,
    pub decryption: RsaKey,
    pub encryption: RsaKey,
}

fn generate() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::rng(), 2048).expect("RSA key generation")
}

pub static KEYS: Lazy<Keys> = Lazy::new(|| {
    let signing = RsaKey::from_private(generate()).with_key_id("app-signing-1");
    let decryption = RsaKey::from_private(generate()).with_key_id("rev-encryption-1");
    Keys {
        verification: signing.to_public(),
        encryption: decryption.to_public(),
        signing,
        decryption,
    }
});

/// A second, unrelated private key
pub static OTHER: Lazy<RsaKey> =
    Lazy::new(|| RsaKey::from_private(generate()).with_key_id("app-signing-1"));

pub fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// The claims of the original sample program
pub fn sample_claims(now: DateTime<Utc>) -> ClaimSet {
    ClaimSet::new()
        .with_issuer("MyApp")
        .with_audience("rev")
        .with_subject("john.doe@acme.com")
        .with_expiration(now + Duration::seconds(60))
        .with_not_before(now - Duration::seconds(60))
}

/// Key whose every capability fails
pub struct BrokenKey;

impl KeyMaterial for BrokenKey {
    fn key_id(&self) -> Option<&str> {
        None
    }

    fn signing_algorithm(&self) -> SigningAlgorithm {
        SigningAlgorithm::Rs256
    }

    fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, KeyError> {
        Err(KeyError::Crypto("revoked".into()))
    }

    fn verify(&self, _message: &[u8], _signature: &[u8]) -> Result<bool, KeyError> {
        Err(KeyError::Crypto("revoked".into()))
    }

    fn encrypt(&self, _alg: KeyManagementAlgorithm, _plaintext: &[u8]) -> Result<Vec<u8>, KeyError> {
        Err(KeyError::Crypto("revoked".into()))
    }

    fn decrypt(&self, _alg: KeyManagementAlgorithm, _ciphertext: &[u8]) -> Result<Vec<u8>, KeyError> {
        Err(KeyError::Crypto("revoked".into()))
    }
}

/// Error messages must not echo claim values.
pub fn assert_no_claim_leak(err: &JwtError, claims: &ClaimSet) {
    let message = err.to_string();
    for (_, value) in claims.iter() {
        if let Some(text) = value.as_str() {
            assert!(!message.contains(text), "error `{message}` leaks `{text}`");
        }
    }
}
