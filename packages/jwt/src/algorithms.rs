//! JOSE algorithm identifiers
//!
//! Typed names for the `alg` and `enc` header values this crate produces and
//! accepts. Anything else fails to parse, which is how headers naming an
//! unknown algorithm get rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// JWS signing algorithm (RSASSA-PKCS1-v1_5)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    #[default]
    #[serde(rename = "RS256")]
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    #[serde(rename = "RS384")]
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    #[serde(rename = "RS512")]
    Rs512,
}

impl SigningAlgorithm {
    /// JOSE name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SigningAlgorithm::Rs256 => "RS256",
            SigningAlgorithm::Rs384 => "RS384",
            SigningAlgorithm::Rs512 => "RS512",
        }
    }
}

/// JWE key management algorithm used to wrap the content key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyManagementAlgorithm {
    /// RSAES-OAEP using SHA-256 and MGF1 with SHA-256
    #[default]
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaep256,
}

impl KeyManagementAlgorithm {
    /// JOSE name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyManagementAlgorithm::RsaOaep256 => "RSA-OAEP-256",
        }
    }
}

/// JWE content encryption algorithm. Always an AEAD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncryptionAlgorithm {
    /// AES-GCM using a 256-bit key
    #[default]
    #[serde(rename = "A256GCM")]
    A256Gcm,
    /// AES-GCM using a 128-bit key
    #[serde(rename = "A128GCM")]
    A128Gcm,
}

impl ContentEncryptionAlgorithm {
    /// AES-GCM initialization vector length in bytes
    pub const IV_LEN: usize = 12;
    /// AES-GCM authentication tag length in bytes
    pub const TAG_LEN: usize = 16;

    /// JOSE name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentEncryptionAlgorithm::A256Gcm => "A256GCM",
            ContentEncryptionAlgorithm::A128Gcm => "A128GCM",
        }
    }

    /// Content encryption key length in bytes
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            ContentEncryptionAlgorithm::A256Gcm => 32,
            ContentEncryptionAlgorithm::A128Gcm => 16,
        }
    }
}

/// Error returned when parsing an algorithm name that is not supported
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

macro_rules! jose_name {
    ($ty:ty { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnsupportedAlgorithm;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($variant),)+
                    other => Err(UnsupportedAlgorithm(other.to_string())),
                }
            }
        }
    };
}

jose_name!(SigningAlgorithm {
    "RS256" => SigningAlgorithm::Rs256,
    "RS384" => SigningAlgorithm::Rs384,
    "RS512" => SigningAlgorithm::Rs512,
});

jose_name!(KeyManagementAlgorithm {
    "RSA-OAEP-256" => KeyManagementAlgorithm::RsaOaep256,
});

jose_name!(ContentEncryptionAlgorithm {
    "A256GCM" => ContentEncryptionAlgorithm::A256Gcm,
    "A128GCM" => ContentEncryptionAlgorithm::A128Gcm,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_serde_representation() {
        for alg in [
            SigningAlgorithm::Rs256,
            SigningAlgorithm::Rs384,
            SigningAlgorithm::Rs512,
        ] {
            let json = serde_json::to_string(&alg).unwrap();
            assert_eq!(json, format!("\"{alg}\""));
            assert_eq!(alg.as_str().parse::<SigningAlgorithm>().unwrap(), alg);
        }

        let json = serde_json::to_string(&KeyManagementAlgorithm::RsaOaep256).unwrap();
        assert_eq!(json, "\"RSA-OAEP-256\"");
        let json = serde_json::to_string(&ContentEncryptionAlgorithm::A128Gcm).unwrap();
        assert_eq!(json, "\"A128GCM\"");
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!("HS256".parse::<SigningAlgorithm>().is_err());
        assert!("none".parse::<SigningAlgorithm>().is_err());
        assert!("RSA1_5".parse::<KeyManagementAlgorithm>().is_err());
        assert!(serde_json::from_str::<ContentEncryptionAlgorithm>("\"A192GCM\"").is_err());
    }

    #[test]
    fn key_lengths() {
        assert_eq!(ContentEncryptionAlgorithm::A256Gcm.key_len(), 32);
        assert_eq!(ContentEncryptionAlgorithm::A128Gcm.key_len(), 16);
    }
}
