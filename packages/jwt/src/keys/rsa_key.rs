//! RSA key material
//!
//! RSASSA-PKCS1-v1_5 signatures (RS256/RS384/RS512) and RSAES-OAEP key
//! wrapping over the `rsa` crate.

use super::KeyMaterial;
use crate::algorithms::{KeyManagementAlgorithm, SigningAlgorithm};
use crate::error::KeyError;
use rsa::oaep::{DecryptingKey, EncryptingKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::{Decryptor, PublicKeyParts, RandomizedEncryptor};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;

enum Inner {
    Private(RsaPrivateKey),
    Public(RsaPublicKey),
}

/// An RSA private or public key.
///
/// A private key has every capability. A public key can only verify and wrap.
pub struct RsaKey {
    inner: Inner,
    kid: Option<String>,
    alg: SigningAlgorithm,
}

macro_rules! pkcs1v15_sign {
    ($digest:ty, $key:expr, $message:expr) => {
        SigningKey::<$digest>::new($key.clone())
            .try_sign($message)
            .map(|signature| signature.to_bytes().as_ref().to_vec())
            .map_err(|e| KeyError::Crypto(format!("RSA signing failed: {e}")))
    };
}

macro_rules! pkcs1v15_verify {
    ($digest:ty, $key:expr, $message:expr, $signature:expr) => {
        VerifyingKey::<$digest>::new($key)
            .verify($message, $signature)
            .is_ok()
    };
}

impl RsaKey {
    /// Wrap a private key. Signs with RS256 until told otherwise.
    #[must_use]
    pub fn from_private(key: RsaPrivateKey) -> Self {
        Self {
            inner: Inner::Private(key),
            kid: None,
            alg: SigningAlgorithm::default(),
        }
    }

    /// Wrap a public key. Verifies RS256 until told otherwise.
    #[must_use]
    pub fn from_public(key: RsaPublicKey) -> Self {
        Self {
            inner: Inner::Public(key),
            kid: None,
            alg: SigningAlgorithm::default(),
        }
    }

    /// Set the key identifier
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Set the signing algorithm
    #[must_use]
    pub fn with_signing_algorithm(mut self, alg: SigningAlgorithm) -> Self {
        self.alg = alg;
        self
    }

    /// Whether this key holds the private half
    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(self.inner, Inner::Private(_))
    }

    /// Modulus size in bits, exact rather than rounded up to whole bytes
    #[must_use]
    pub fn bits(&self) -> usize {
        let bits = match &self.inner {
            Inner::Private(key) => key.n().bits(),
            Inner::Public(key) => key.n().bits(),
        };
        bits as usize
    }

    /// The public half of this key
    #[must_use]
    pub fn public_key(&self) -> RsaPublicKey {
        match &self.inner {
            Inner::Private(key) => RsaPublicKey::from(key),
            Inner::Public(key) => key.clone(),
        }
    }

    /// Public-only copy keeping the key id and algorithm
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            inner: Inner::Public(self.public_key()),
            kid: self.kid.clone(),
            alg: self.alg,
        }
    }

    fn private_key(&self, operation: &'static str) -> Result<&RsaPrivateKey, KeyError> {
        match &self.inner {
            Inner::Private(key) => Ok(key),
            Inner::Public(_) => Err(KeyError::Unsupported(operation)),
        }
    }
}

impl KeyMaterial for RsaKey {
    fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    fn signing_algorithm(&self) -> SigningAlgorithm {
        self.alg
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let key = self.private_key("sign")?;
        match self.alg {
            SigningAlgorithm::Rs256 => pkcs1v15_sign!(Sha256, key, message),
            SigningAlgorithm::Rs384 => pkcs1v15_sign!(Sha384, key, message),
            SigningAlgorithm::Rs512 => pkcs1v15_sign!(Sha512, key, message),
        }
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        // A signature of the wrong length cannot be valid for this key.
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        let key = self.public_key();
        Ok(match self.alg {
            SigningAlgorithm::Rs256 => pkcs1v15_verify!(Sha256, key, message, &signature),
            SigningAlgorithm::Rs384 => pkcs1v15_verify!(Sha384, key, message, &signature),
            SigningAlgorithm::Rs512 => pkcs1v15_verify!(Sha512, key, message, &signature),
        })
    }

    fn encrypt(&self, alg: KeyManagementAlgorithm, plaintext: &[u8]) -> Result<Vec<u8>, KeyError> {
        match alg {
            KeyManagementAlgorithm::RsaOaep256 => EncryptingKey::<Sha256>::new(self.public_key())
                .encrypt_with_rng(&mut rand::rng(), plaintext)
                .map_err(|e| KeyError::Crypto(format!("RSA-OAEP encryption failed: {e}"))),
        }
    }

    fn decrypt(&self, alg: KeyManagementAlgorithm, ciphertext: &[u8]) -> Result<Vec<u8>, KeyError> {
        let key = self.private_key("decrypt")?;
        match alg {
            KeyManagementAlgorithm::RsaOaep256 => DecryptingKey::<Sha256>::new(key.clone())
                .decrypt(ciphertext)
                .map_err(|_| KeyError::Crypto("RSA-OAEP decryption failed".to_string())),
        }
    }
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("kind", &if self.is_private() { "private" } else { "public" })
            .field("bits", &self.bits())
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .finish_non_exhaustive()
    }
}
