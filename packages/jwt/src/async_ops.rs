//! Async entry points
//!
//! RSA and AES-GCM work is CPU-bound, so these run the synchronous pipeline
//! on the blocking pool instead of stalling a runtime worker.

use crate::claims::ClaimSet;
use crate::error::{JwtError, JwtResult};
use crate::issuer::{EncryptedToken, Issuer};
use crate::keys::KeyMaterial;
use crate::verifier::Verifier;
use chrono::{DateTime, Utc};
use std::sync::Arc;

impl Issuer {
    /// [`issue`](Self::issue) on the blocking thread pool.
    ///
    /// # Errors
    /// See [`Issuer::issue`]; [`JwtError::Internal`] if the task panics or is cancelled.
    pub async fn issue_async(
        &self,
        signing_key: Arc<dyn KeyMaterial>,
        encryption_key: Arc<dyn KeyMaterial>,
        claims: ClaimSet,
        now: DateTime<Utc>,
    ) -> JwtResult<EncryptedToken> {
        let issuer = self.clone();
        tokio::task::spawn_blocking(move || {
            issuer.issue(signing_key.as_ref(), encryption_key.as_ref(), &claims, now)
        })
        .await
        .map_err(|e| JwtError::Internal(format!("issue task failed: {e}")))?
    }
}

impl Verifier {
    /// [`verify`](Self::verify) on the blocking thread pool.
    ///
    /// # Errors
    /// See [`Verifier::verify`]; [`JwtError::Internal`] if the task panics or is cancelled.
    pub async fn verify_async(
        &self,
        decryption_key: Arc<dyn KeyMaterial>,
        verification_key: Arc<dyn KeyMaterial>,
        envelope: String,
        now: DateTime<Utc>,
    ) -> JwtResult<ClaimSet> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || {
            verifier.verify(decryption_key.as_ref(), verification_key.as_ref(), &envelope, now)
        })
        .await
        .map_err(|e| JwtError::Internal(format!("verify task failed: {e}")))?
    }
}
