//! Key material capabilities
//!
//! The issuer and verifier never look inside a key. They only call the four
//! capability operations below, so any backend (in-memory RSA, HSM, remote
//! KMS) can stand in for [`RsaKey`].

mod loader;
mod rsa_key;

pub use self::loader::{MIN_RSA_BITS, load_key, load_key_async};
pub use self::rsa_key::RsaKey;

use crate::algorithms::{KeyManagementAlgorithm, SigningAlgorithm};
use crate::error::KeyError;
use std::sync::Arc;

/// Asymmetric key usable for signing and key wrapping.
///
/// Implementations must be thread-safe; one key may serve concurrent
/// issue/verify calls. A capability the key lacks (signing with a public
/// key, for instance) returns [`KeyError::Unsupported`].
pub trait KeyMaterial: Send + Sync {
    /// Key identifier placed in the `kid` header, if any
    fn key_id(&self) -> Option<&str>;

    /// Algorithm this key signs with
    fn signing_algorithm(&self) -> SigningAlgorithm;

    /// Sign `message` with [`signing_algorithm`](Self::signing_algorithm).
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError>;

    /// Check `signature` over `message`. A well-formed but wrong signature is `Ok(false)`.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError>;

    /// Wrap a content encryption key.
    fn encrypt(&self, alg: KeyManagementAlgorithm, plaintext: &[u8]) -> Result<Vec<u8>, KeyError>;

    /// Unwrap a content encryption key.
    fn decrypt(&self, alg: KeyManagementAlgorithm, ciphertext: &[u8]) -> Result<Vec<u8>, KeyError>;
}

impl<T: KeyMaterial + ?Sized> KeyMaterial for Arc<T> {
    fn key_id(&self) -> Option<&str> {
        (**self).key_id()
    }

    fn signing_algorithm(&self) -> SigningAlgorithm {
        (**self).signing_algorithm()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        (**self).sign(message)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        (**self).verify(message, signature)
    }

    fn encrypt(&self, alg: KeyManagementAlgorithm, plaintext: &[u8]) -> Result<Vec<u8>, KeyError> {
        (**self).encrypt(alg, plaintext)
    }

    fn decrypt(&self, alg: KeyManagementAlgorithm, ciphertext: &[u8]) -> Result<Vec<u8>, KeyError> {
        (**self).decrypt(alg, ciphertext)
    }
}
