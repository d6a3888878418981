//! Error types for token issuance and verification
//!
//! Every variant carries the step that failed and nothing else. Key bytes,
//! content keys, plaintext and claim values never end up in an error.

use thiserror::Error;

/// Result type for token operations
pub type JwtResult<T> = Result<T, JwtError>;

/// Errors produced while issuing or verifying a token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Claim set violates a structural invariant
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    /// The signing key could not produce a signature
    #[error("Signing error: {0}")]
    SigningError(String),

    /// The content could not be encrypted or the content key wrapped
    #[error("Encryption error: {0}")]
    EncryptionError(String),

    /// Input is not a well-formed compact token
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The content key could not be recovered
    #[error("Decryption error: {0}")]
    DecryptionError(String),

    /// Authentication tag did not match the ciphertext
    #[error("Integrity check failed: {0}")]
    IntegrityError(String),

    /// Signature did not verify against the recovered claims
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// Token expiration is before the evaluation time
    #[error("Token has expired")]
    TokenExpired,

    /// Token not-before is after the evaluation time
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// Key material could not be loaded or parsed
    #[error("Key load error: {0}")]
    KeyLoad(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Fieldless discriminant of [`JwtError`], for callers that only surface the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`JwtError::InvalidClaims`]
    InvalidClaims,
    /// See [`JwtError::SigningError`]
    SigningError,
    /// See [`JwtError::EncryptionError`]
    EncryptionError,
    /// See [`JwtError::MalformedToken`]
    MalformedToken,
    /// See [`JwtError::DecryptionError`]
    DecryptionError,
    /// See [`JwtError::IntegrityError`]
    IntegrityError,
    /// See [`JwtError::SignatureInvalid`]
    SignatureInvalid,
    /// See [`JwtError::TokenExpired`]
    TokenExpired,
    /// See [`JwtError::TokenNotYetValid`]
    TokenNotYetValid,
    /// See [`JwtError::KeyLoad`]
    KeyLoad,
    /// See [`JwtError::Config`]
    Config,
    /// See [`JwtError::Internal`]
    Internal,
}

impl JwtError {
    /// Kind of this error without its context
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            JwtError::InvalidClaims(_) => ErrorKind::InvalidClaims,
            JwtError::SigningError(_) => ErrorKind::SigningError,
            JwtError::EncryptionError(_) => ErrorKind::EncryptionError,
            JwtError::MalformedToken(_) => ErrorKind::MalformedToken,
            JwtError::DecryptionError(_) => ErrorKind::DecryptionError,
            JwtError::IntegrityError(_) => ErrorKind::IntegrityError,
            JwtError::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            JwtError::TokenExpired => ErrorKind::TokenExpired,
            JwtError::TokenNotYetValid => ErrorKind::TokenNotYetValid,
            JwtError::KeyLoad(_) => ErrorKind::KeyLoad,
            JwtError::Config(_) => ErrorKind::Config,
            JwtError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Create an invalid claims error
    #[inline]
    #[must_use]
    pub fn invalid_claims(msg: &str) -> Self {
        JwtError::InvalidClaims(msg.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: &str) -> Self {
        JwtError::SigningError(msg.to_string())
    }

    /// Create an encryption error
    #[inline]
    #[must_use]
    pub fn encryption(msg: &str) -> Self {
        JwtError::EncryptionError(msg.to_string())
    }

    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: &str) -> Self {
        JwtError::MalformedToken(msg.to_string())
    }

    /// Create a decryption error
    #[inline]
    #[must_use]
    pub fn decryption(msg: &str) -> Self {
        JwtError::DecryptionError(msg.to_string())
    }

    /// Create an integrity error
    #[inline]
    #[must_use]
    pub fn integrity(msg: &str) -> Self {
        JwtError::IntegrityError(msg.to_string())
    }

    /// Create a signature mismatch error
    #[inline]
    #[must_use]
    pub fn signature_invalid(msg: &str) -> Self {
        JwtError::SignatureInvalid(msg.to_string())
    }

    /// Create a key loading error
    #[inline]
    #[must_use]
    pub fn key_load(msg: &str) -> Self {
        JwtError::KeyLoad(msg.to_string())
    }

    /// Create a configuration error
    #[inline]
    #[must_use]
    pub fn config(msg: &str) -> Self {
        JwtError::Config(msg.to_string())
    }
}

/// Errors raised by a [`KeyMaterial`](crate::keys::KeyMaterial) capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key does not have the requested capability (e.g. signing with a public key)
    #[error("key cannot {0}")]
    Unsupported(&'static str),

    /// The underlying primitive rejected the operation
    #[error("{0}")]
    Crypto(String),
}
