//! Token issuance: sign the claims, then encrypt the signed token.
//!
//! The signature covers the unencrypted canonical claims, so a verifier can
//! check integrity right after decryption.

use crate::claims::ClaimSet;
use crate::codec::{self, JweHeader, JwsHeader};
use crate::config::TokenConfig;
use crate::content;
use crate::error::{JwtError, JwtResult};
use crate::keys::KeyMaterial;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, warn};

/// Compact JWE string handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedToken(String);

impl EncryptedToken {
    /// The compact serialization
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the compact serialization
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EncryptedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncryptedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EncryptedToken> for String {
    fn from(token: EncryptedToken) -> Self {
        token.0
    }
}

/// Produces signed-then-encrypted tokens.
///
/// Holds only configuration; keys are borrowed per call, so one issuer can
/// be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Issuer {
    config: TokenConfig,
}

impl Issuer {
    /// Issuer producing tokens with the algorithms in `config`
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Validate `claims` and produce a compact signed JWT.
    ///
    /// # Errors
    /// - [`JwtError::InvalidClaims`] if the claims break an invariant
    /// - [`JwtError::SigningError`] if the key signs with a different algorithm
    ///   than configured or cannot sign
    pub fn sign(
        &self,
        signing_key: &dyn KeyMaterial,
        claims: &ClaimSet,
        now: DateTime<Utc>,
    ) -> JwtResult<String> {
        claims.validate()?;

        let drift = i64::from(self.config.drift_window_seconds);
        for advisory in claims.lifetime_advisories(now.timestamp(), drift) {
            warn!(advisory = advisory.label(), "Token lifetime advisory");
        }

        let alg = signing_key.signing_algorithm();
        if alg != self.config.signing_algorithm {
            return Err(JwtError::SigningError(format!(
                "key signs with {alg}, expected {}",
                self.config.signing_algorithm
            )));
        }

        let header = JwsHeader::new(alg).with_key_id(signing_key.key_id().map(str::to_string));
        let input = codec::signing_input(&header, claims)?;
        let signature = signing_key
            .sign(input.as_bytes())
            .map_err(|e| JwtError::SigningError(format!("sign claims: {e}")))?;

        debug!(alg = %alg, kid = ?header.kid, "Signed claims");
        codec::encode_signed(&header, claims, &signature)
    }

    /// Wrap a signed token in a JWE under `encryption_key`.
    ///
    /// A fresh content key and IV are drawn for every call.
    ///
    /// # Errors
    /// [`JwtError::EncryptionError`] if the content cannot be encrypted or the
    /// key cannot wrap the content key.
    pub fn encrypt(
        &self,
        encryption_key: &dyn KeyMaterial,
        signed_token: &str,
    ) -> JwtResult<EncryptedToken> {
        let header = JweHeader {
            alg: self.config.key_management,
            enc: self.config.content_encryption,
            cty: self.config.content_type.clone(),
            kid: encryption_key.key_id().map(str::to_string),
        };
        let protected = header.encode()?;

        let cek = content::generate_cek(header.enc);
        let sealed = content::seal(header.enc, &cek, protected.as_bytes(), signed_token.as_bytes())?;
        let encrypted_key = encryption_key
            .encrypt(header.alg, &cek)
            .map_err(|e| JwtError::EncryptionError(format!("wrap content key: {e}")))?;

        debug!(alg = %header.alg, enc = %header.enc, kid = ?header.kid, "Encrypted token");
        codec::encode_encrypted(
            &header,
            &encrypted_key,
            &sealed.iv,
            &sealed.ciphertext,
            &sealed.tag,
        )
        .map(EncryptedToken)
    }

    /// Sign `claims` with `signing_key`, then encrypt for `encryption_key`.
    ///
    /// # Errors
    /// Any error of [`sign`](Self::sign) or [`encrypt`](Self::encrypt); nothing
    /// is returned on failure.
    pub fn issue(
        &self,
        signing_key: &dyn KeyMaterial,
        encryption_key: &dyn KeyMaterial,
        claims: &ClaimSet,
        now: DateTime<Utc>,
    ) -> JwtResult<EncryptedToken> {
        let signed = self.sign(signing_key, claims, now)?;
        self.encrypt(encryption_key, &signed)
    }
}

/// [`Issuer::issue`] with the default configuration
/// (RS256 inside RSA-OAEP-256 / A256GCM).
///
/// # Errors
/// See [`Issuer::issue`].
pub fn issue(
    signing_key: &dyn KeyMaterial,
    encryption_key: &dyn KeyMaterial,
    claims: &ClaimSet,
    now: DateTime<Utc>,
) -> JwtResult<EncryptedToken> {
    Issuer::default().issue(signing_key, encryption_key, claims, now)
}
