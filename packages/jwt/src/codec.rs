//! Compact serialization of signed (JWS) and encrypted (JWE) tokens
//!
//! Signed:    `b64(header) . b64(claims) . b64(signature)`
//! Encrypted: `b64(header) . b64(encrypted key) . b64(iv) . b64(ciphertext) . b64(tag)`
//!
//! All segments are base64url without padding (RFC 7515 §2). Pure transforms,
//! no key material involved.

use crate::algorithms::{ContentEncryptionAlgorithm, KeyManagementAlgorithm, SigningAlgorithm};
use crate::claims::ClaimSet;
use crate::error::{JwtError, JwtResult};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base64 URL-safe encoding without padding
#[inline]
#[must_use]
pub fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding
///
/// # Errors
/// [`JwtError::MalformedToken`] naming `segment` if the input is not unpadded base64url.
#[inline]
pub fn base64_url_decode(input: &str, segment: &str) -> JwtResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| JwtError::MalformedToken(format!("invalid {segment} encoding")))
}

/// JWS protected header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signing algorithm
    pub alg: SigningAlgorithm,
    /// Token type, `JWT` for tokens this crate issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Signing key identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwsHeader {
    /// Header for a JWT signed with `alg`
    #[must_use]
    pub fn new(alg: SigningAlgorithm) -> Self {
        Self {
            alg,
            typ: Some("JWT".to_string()),
            kid: None,
        }
    }

    /// Attach a key identifier
    #[must_use]
    pub fn with_key_id(mut self, kid: Option<String>) -> Self {
        self.kid = kid;
        self
    }
}

/// JWE protected header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JweHeader {
    /// Algorithm that wraps the content encryption key
    pub alg: KeyManagementAlgorithm,
    /// Authenticated encryption algorithm for the payload
    pub enc: ContentEncryptionAlgorithm,
    /// Content type of the plaintext, `JWT` for a nested signed token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// Key encryption key identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JweHeader {
    /// Base64url of the serialized header. This exact string is the
    /// additional authenticated data of the content encryption.
    ///
    /// # Errors
    /// [`JwtError::EncryptionError`] if the header cannot be serialized.
    pub fn encode(&self) -> JwtResult<String> {
        let json = serde_json::to_vec(self)
            .map_err(|_| JwtError::encryption("serialize protected header"))?;
        Ok(base64_url_encode(&json))
    }
}

/// Decoded three-segment token
#[derive(Debug, Clone, PartialEq)]
pub struct SignedParts {
    /// Protected header
    pub header: JwsHeader,
    /// The header segment exactly as received
    pub encoded_header: String,
    /// Payload claims
    pub claims: ClaimSet,
    /// Raw signature bytes
    pub signature: Vec<u8>,
}

/// Decoded five-segment token
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptedParts {
    /// Protected header
    pub header: JweHeader,
    /// The header segment exactly as received (the AAD)
    pub encoded_header: String,
    /// Wrapped content encryption key
    pub encrypted_key: Vec<u8>,
    /// Initialization vector
    pub iv: Vec<u8>,
    /// Ciphertext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: Vec<u8>,
}

/// `b64(header) . b64(canonical claims)`, the bytes a JWS signature covers.
///
/// # Errors
/// [`JwtError::SigningError`] if the header cannot be serialized, or
/// [`JwtError::InvalidClaims`] if the claims cannot.
pub fn signing_input(header: &JwsHeader, claims: &ClaimSet) -> JwtResult<String> {
    let header_json =
        serde_json::to_vec(header).map_err(|_| JwtError::signing("serialize header"))?;
    signing_input_with_header(&base64_url_encode(&header_json), claims)
}

/// Signing input over an already encoded header segment
pub(crate) fn signing_input_with_header(encoded_header: &str, claims: &ClaimSet) -> JwtResult<String> {
    let payload = claims.canonical_bytes()?;
    Ok(format!("{encoded_header}.{}", base64_url_encode(&payload)))
}

/// Serialize a signed token in compact form.
///
/// # Errors
/// As [`signing_input`].
pub fn encode_signed(header: &JwsHeader, claims: &ClaimSet, signature: &[u8]) -> JwtResult<String> {
    let input = signing_input(header, claims)?;
    Ok(format!("{input}.{}", base64_url_encode(signature)))
}

/// Parse a compact signed token.
///
/// # Errors
/// [`JwtError::MalformedToken`] if the input does not have exactly three
/// segments, a segment is not base64url, or the header or claims are not
/// JSON objects of the expected shape.
pub fn decode_signed(token: &str) -> JwtResult<SignedParts> {
    let [header_b64, claims_b64, signature_b64] = split_segments::<3>(token)?;

    let header: JwsHeader = decode_object(header_b64, "header")?;
    let claims: ClaimSet = decode_object(claims_b64, "payload")?;
    let signature = base64_url_decode(signature_b64, "signature")?;

    Ok(SignedParts {
        header,
        encoded_header: header_b64.to_string(),
        claims,
        signature,
    })
}

/// Serialize an encrypted token in compact form.
///
/// # Errors
/// [`JwtError::EncryptionError`] if the header cannot be serialized.
pub fn encode_encrypted(
    header: &JweHeader,
    encrypted_key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> JwtResult<String> {
    Ok(format!(
        "{}.{}.{}.{}.{}",
        header.encode()?,
        base64_url_encode(encrypted_key),
        base64_url_encode(iv),
        base64_url_encode(ciphertext),
        base64_url_encode(tag),
    ))
}

/// Parse a compact encrypted token.
///
/// # Errors
/// [`JwtError::MalformedToken`] if the input does not have exactly five
/// segments, a segment is not base64url, or the header is not a JSON object
/// naming supported algorithms.
pub fn decode_encrypted(token: &str) -> JwtResult<EncryptedParts> {
    let [header_b64, key_b64, iv_b64, ciphertext_b64, tag_b64] = split_segments::<5>(token)?;

    Ok(EncryptedParts {
        header: decode_object(header_b64, "protected header")?,
        encoded_header: header_b64.to_string(),
        encrypted_key: base64_url_decode(key_b64, "encrypted key")?,
        iv: base64_url_decode(iv_b64, "initialization vector")?,
        ciphertext: base64_url_decode(ciphertext_b64, "ciphertext")?,
        tag: base64_url_decode(tag_b64, "authentication tag")?,
    })
}

fn split_segments<const N: usize>(token: &str) -> JwtResult<[&str; N]> {
    let parts: Vec<&str> = token.split('.').collect();
    <[&str; N]>::try_from(parts).map_err(|parts| {
        JwtError::MalformedToken(format!("expected {N} segments, found {}", parts.len()))
    })
}

fn decode_object<T: DeserializeOwned>(segment: &str, name: &str) -> JwtResult<T> {
    let bytes = base64_url_decode(segment, name)?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|_| JwtError::MalformedToken(format!("{name} is not valid JSON")))?;
    if !value.is_object() {
        return Err(JwtError::MalformedToken(format!("{name} is not a JSON object")));
    }
    serde_json::from_value(value)
        .map_err(|_| JwtError::MalformedToken(format!("{name} has an unexpected shape")))
}
