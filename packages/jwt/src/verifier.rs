//! Token verification: decrypt, authenticate, then check the signature and
//! the validity window.

use crate::claims::ClaimSet;
use crate::codec;
use crate::config::TokenConfig;
use crate::content;
use crate::error::{JwtError, JwtResult};
use crate::keys::KeyMaterial;
use chrono::{DateTime, Utc};
use tracing::debug;
use zeroize::Zeroizing;

/// Recovers claims from tokens produced by [`Issuer`](crate::Issuer).
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: TokenConfig,
}

impl Verifier {
    /// Verifier accepting only the algorithms in `config`
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Decrypt `envelope` with `decryption_key`, verify the inner signature
    /// with `verification_key`, and check `now` against `nbf`/`exp`.
    ///
    /// # Errors
    /// - [`JwtError::MalformedToken`] for structural problems in either layer
    /// - [`JwtError::DecryptionError`] if the header names other algorithms than
    ///   configured or the content key cannot be unwrapped
    /// - [`JwtError::IntegrityError`] if the authentication tag does not match
    /// - [`JwtError::SignatureInvalid`] on algorithm, key id or signature mismatch
    /// - [`JwtError::InvalidClaims`] if `exp` or `nbf` is not an integer
    /// - [`JwtError::TokenExpired`] / [`JwtError::TokenNotYetValid`]
    pub fn verify(
        &self,
        decryption_key: &dyn KeyMaterial,
        verification_key: &dyn KeyMaterial,
        envelope: &str,
        now: DateTime<Utc>,
    ) -> JwtResult<ClaimSet> {
        let parts = codec::decode_encrypted(envelope)?;
        let header = &parts.header;
        if header.alg != self.config.key_management || header.enc != self.config.content_encryption {
            return Err(JwtError::DecryptionError(format!(
                "unexpected algorithms {}/{}",
                header.alg, header.enc
            )));
        }

        let cek = decryption_key
            .decrypt(header.alg, &parts.encrypted_key)
            .map(Zeroizing::new)
            .map_err(|e| JwtError::DecryptionError(format!("unwrap content key: {e}")))?;

        // Nothing below may run on unauthenticated bytes.
        let plaintext = Zeroizing::new(content::open(
            header.enc,
            &cek,
            &parts.iv,
            parts.encoded_header.as_bytes(),
            &parts.ciphertext,
            &parts.tag,
        )?);
        debug!(alg = %header.alg, enc = %header.enc, "Decrypted token");

        let signed = std::str::from_utf8(&plaintext)
            .map_err(|_| JwtError::malformed("decrypted payload is not UTF-8"))?;
        let signed = codec::decode_signed(signed)?;

        let alg = verification_key.signing_algorithm();
        if signed.header.alg != alg || alg != self.config.signing_algorithm {
            return Err(JwtError::SignatureInvalid(format!(
                "token signed with {}, key verifies {alg}",
                signed.header.alg
            )));
        }
        if let (Some(token_kid), Some(key_kid)) = (signed.header.kid.as_deref(), verification_key.key_id())
            && token_kid != key_kid
        {
            return Err(JwtError::signature_invalid("key id mismatch"));
        }

        let input = codec::signing_input_with_header(&signed.encoded_header, &signed.claims)?;
        let valid = verification_key
            .verify(input.as_bytes(), &signed.signature)
            .map_err(|e| JwtError::SignatureInvalid(format!("verify signature: {e}")))?;
        if !valid {
            return Err(JwtError::signature_invalid("signature does not match claims"));
        }

        signed
            .claims
            .check_time(now.timestamp(), i64::from(self.config.leeway_seconds))?;

        debug!(alg = %alg, kid = ?signed.header.kid, "Verified token");
        Ok(signed.claims)
    }
}

/// [`Verifier::verify`] with the default configuration.
///
/// # Errors
/// See [`Verifier::verify`].
pub fn verify(
    decryption_key: &dyn KeyMaterial,
    verification_key: &dyn KeyMaterial,
    envelope: &str,
    now: DateTime<Utc>,
) -> JwtResult<ClaimSet> {
    Verifier::default().verify(decryption_key, verification_key, envelope, now)
}
