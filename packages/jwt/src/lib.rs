//! Signed-then-encrypted JSON Web Tokens
//!
//! Claims are signed as a compact JWS (RS256 by default) and the signed token
//! is wrapped in a compact JWE (RSA-OAEP-256 / A256GCM by default, `cty: JWT`).
//! Verification reverses the process: decrypt, authenticate, verify the
//! signature, then check the validity window.
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use sealjwt::{ClaimSet, issue, keys::load_key, verify};
//!
//! # fn main() -> sealjwt::JwtResult<()> {
//! let signing = load_key("sign-private-key.pem")?;
//! let encryption = load_key("encrypt-public-key.pem")?;
//!
//! let now = Utc::now();
//! let claims = ClaimSet::new()
//!     .with_issuer("MyApp")
//!     .with_audience("rev")
//!     .with_subject("john.doe@acme.com")
//!     .with_expiration(now + Duration::seconds(60))
//!     .with_not_before(now - Duration::seconds(60));
//!
//! let token = issue(&signing, &encryption, &claims, now)?;
//! println!("{token}");
//!
//! let decryption = load_key("encrypt-private-key.pem")?;
//! let verification = load_key("sign-public-key.pem")?;
//! let recovered = verify(&decryption, &verification, token.as_str(), now)?;
//! assert_eq!(recovered, claims);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
mod async_ops;
pub mod claims;
pub mod codec;
mod config;
pub mod content;
mod error;
mod issuer;
pub mod keys;
mod verifier;

pub use algorithms::{ContentEncryptionAlgorithm, KeyManagementAlgorithm, SigningAlgorithm};
pub use claims::ClaimSet;
pub use config::TokenConfig;
pub use error::*;
pub use issuer::{EncryptedToken, Issuer, issue};
pub use keys::{KeyMaterial, RsaKey};
pub use verifier::{Verifier, verify};
