//! Batch attestation.
//!
//! The variant is fixed at construction from configuration; callers only
//! ever see [`AttestationSigner::sign`].

mod enclave;
mod symmetric;

pub use enclave::{EnclaveAttester, attestation_message};
pub use symmetric::HmacAttester;

use veilbatch_types::{
    AttestationConfig, AttestationRecord, AttestationScheme, BatchSettlement, DeploymentMode,
    EncryptedVolumes, Result, VeilBatchError,
};

/// The attester in use for a deployment.
#[derive(Debug, Clone)]
pub enum AttestationSigner {
    Hmac(HmacAttester),
    Enclave(EnclaveAttester),
}

impl AttestationSigner {
    /// Build the configured attester.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::InvalidConfiguration`] when the HMAC variant
    /// has no secret in production, or the enclave variant has no usable
    /// key material in any mode.
    pub fn from_config(mode: DeploymentMode, config: &AttestationConfig) -> Result<Self> {
        let signer = match config.scheme {
            AttestationScheme::Hmac => {
                Self::Hmac(HmacAttester::from_config(mode, config.secret.as_deref())?)
            }
            AttestationScheme::Enclave => {
                let secret = config
                    .secret
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| {
                        VeilBatchError::InvalidConfiguration(
                            "enclave attestation requires a mnemonic or private key".into(),
                        )
                    })?;
                let attester = EnclaveAttester::from_secret(secret, config.enclave)?;
                let identity = attester.identity();
                if identity.mr_enclave.is_zero() || identity.mr_signer.is_zero() {
                    tracing::warn!("enclave attester has an unset measurement identity");
                }
                tracing::info!(
                    signer = %attester.address(),
                    mr_enclave = %identity.mr_enclave,
                    mr_signer = %identity.mr_signer,
                    "enclave attester ready"
                );
                Self::Enclave(attester)
            }
        };
        Ok(signer)
    }

    #[must_use]
    pub fn scheme(&self) -> AttestationScheme {
        match self {
            Self::Hmac(_) => AttestationScheme::Hmac,
            Self::Enclave(_) => AttestationScheme::Enclave,
        }
    }

    /// Attest a settlement and both of its committed volumes.
    pub fn sign(
        &self,
        settlement: &BatchSettlement,
        volumes: &EncryptedVolumes,
    ) -> Result<AttestationRecord> {
        match self {
            Self::Hmac(attester) => attester.sign(settlement, volumes),
            Self::Enclave(attester) => attester.sign(settlement, volumes),
        }
    }
}
