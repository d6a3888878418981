//! Issuance and verification settings

use crate::algorithms::{ContentEncryptionAlgorithm, KeyManagementAlgorithm, SigningAlgorithm};
use crate::error::{JwtError, JwtResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Algorithms and time policy shared by [`Issuer`](crate::Issuer) and
/// [`Verifier`](crate::Verifier).
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Expected JWS algorithm; keys that sign with something else are refused
    pub signing_algorithm: SigningAlgorithm,
    /// JWE `alg`
    pub key_management: KeyManagementAlgorithm,
    /// JWE `enc`
    pub content_encryption: ContentEncryptionAlgorithm,
    /// JWE `cty`; `None` omits the header
    pub content_type: Option<String>,
    /// Seconds of clock skew tolerated on `exp`/`nbf` when verifying
    pub leeway_seconds: u32,
    /// Window in which `exp`/`nbf` trigger clock drift warnings when issuing
    pub drift_window_seconds: u32,
    /// Lifetime applied by callers that do not set `exp` themselves
    pub default_lifetime_minutes: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_algorithm: SigningAlgorithm::Rs256,
            key_management: KeyManagementAlgorithm::RsaOaep256,
            content_encryption: ContentEncryptionAlgorithm::A256Gcm,
            content_type: Some("JWT".to_string()),
            leeway_seconds: 0,
            drift_window_seconds: 300,
            default_lifetime_minutes: 60,
        }
    }
}

impl TokenConfig {
    /// Load from a JSON file and validate.
    ///
    /// # Errors
    /// [`JwtError::Config`] if the file cannot be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> JwtResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| JwtError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| JwtError::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// [`JwtError::Config`] if the default lifetime is zero.
    pub fn validate(&self) -> JwtResult<()> {
        if self.default_lifetime_minutes == 0 {
            return Err(JwtError::config("default_lifetime_minutes must be positive"));
        }
        Ok(())
    }
}
