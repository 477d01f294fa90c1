//! Symmetric attestation.
//!
//! `HMAC-SHA256(secret, canonical_json(settlement) ‖ ctHash(token0) ‖ ctHash(token1))`

use alloy_primitives::Bytes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use veilbatch_types::{
    AttestationRecord, AttestationScheme, BatchSettlement, DeploymentMode, EncryptedVolumes,
    Result, VeilBatchError, constants::DEV_ATTESTATION_SECRET,
};

type HmacSha256 = Hmac<Sha256>;

/// HMAC attester over a shared secret.
#[derive(Clone)]
pub struct HmacAttester {
    secret: Vec<u8>,
    dev_fallback: bool,
}

impl HmacAttester {
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            dev_fallback: false,
        }
    }

    /// Build from optional configuration.
    ///
    /// Without a secret, development falls back to
    /// [`DEV_ATTESTATION_SECRET`] and production refuses to start.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::InvalidConfiguration`] in production when
    /// no secret is configured.
    pub fn from_config(mode: DeploymentMode, secret: Option<&str>) -> Result<Self> {
        match (secret.filter(|s| !s.is_empty()), mode) {
            (Some(secret), _) => Ok(Self::new(secret)),
            (None, DeploymentMode::Production) => Err(VeilBatchError::InvalidConfiguration(
                "HMAC attestation requires a secret in production".into(),
            )),
            (None, DeploymentMode::Development) => {
                tracing::warn!(
                    "no attestation secret configured, using the development fallback; \
                     attestations from this process are NOT trustworthy"
                );
                Ok(Self {
                    secret: DEV_ATTESTATION_SECRET.as_bytes().to_vec(),
                    dev_fallback: true,
                })
            }
        }
    }

    /// `true` when signing with the development fallback secret.
    #[must_use]
    pub fn is_dev_fallback(&self) -> bool {
        self.dev_fallback
    }

    pub fn sign(
        &self,
        settlement: &BatchSettlement,
        volumes: &EncryptedVolumes,
    ) -> Result<AttestationRecord> {
        let canonical = settlement.canonical_json()?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| VeilBatchError::computation("hmac attestation", e))?;
        mac.update(canonical.as_bytes());
        mac.update(volumes.token0.ct_hash.as_slice());
        mac.update(volumes.token1.ct_hash.as_slice());

        Ok(AttestationRecord {
            scheme: AttestationScheme::Hmac,
            payload: Bytes::from(mac.finalize().into_bytes().to_vec()),
            signer: None,
            message_hash: None,
        })
    }
}

impl std::fmt::Debug for HmacAttester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacAttester")
            .field("secret", &"<redacted>")
            .field("dev_fallback", &self.dev_fallback)
            .finish()
    }
}
