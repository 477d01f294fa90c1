//! Volume encoders.
//!
//! One contract, two strategies: `encode(magnitude) -> CommittedVolume`.
//! The strategy is chosen once from the deployment mode and never swapped
//! at call sites.

mod hash;
mod protocol;

pub use hash::HashCommitmentEncoder;
pub use protocol::ProtocolCommitmentEncoder;

use num_bigint::BigUint;
use veilbatch_types::{
    CommitmentConfig, CommittedVolume, DeploymentMode, Result, VeilBatchError,
};

/// The encoder in use for a deployment.
#[derive(Debug)]
pub enum VolumeEncoder {
    /// SHA-256/HMAC commitments (development).
    Hash(HashCommitmentEncoder),
    /// keccak/ECDSA commitments (production).
    Protocol(ProtocolCommitmentEncoder),
}

impl VolumeEncoder {
    /// Pick and build the encoder for `mode`.
    ///
    /// # Errors
    /// In production, returns [`VeilBatchError::InvalidConfiguration`] when
    /// the signer key or sender is missing, and
    /// [`VeilBatchError::InvalidSecurityZone`] for an out-of-range zone.
    pub fn from_config(
        mode: DeploymentMode,
        config: &CommitmentConfig,
        chain_id: u64,
    ) -> Result<Self> {
        match mode {
            DeploymentMode::Development => {
                if config.shared_secret.is_empty() {
                    tracing::warn!("no commitment secret configured, hash commitments use an empty key");
                }
                Ok(Self::Hash(HashCommitmentEncoder::new(&config.shared_secret)))
            }
            DeploymentMode::Production => {
                let key = config.signer_key.ok_or_else(|| {
                    VeilBatchError::InvalidConfiguration(
                        "production commitments require a signer key".into(),
                    )
                })?;
                let sender = config.sender.ok_or_else(|| {
                    VeilBatchError::InvalidConfiguration(
                        "production commitments require an authorizing sender address".into(),
                    )
                })?;
                let encoder = ProtocolCommitmentEncoder::from_key(
                    &key,
                    sender,
                    config.security_zone,
                    config.utype,
                    chain_id,
                )?;
                tracing::info!(
                    signer = %encoder.signer_address(),
                    zone = %encoder.security_zone(),
                    chain_id,
                    "protocol commitment encoder ready"
                );
                Ok(Self::Protocol(encoder))
            }
        }
    }

    /// Commit to the absolute value of one token side.
    pub fn encode(&self, magnitude: &BigUint) -> Result<CommittedVolume> {
        match self {
            Self::Hash(enc) => enc.encode(magnitude),
            Self::Protocol(enc) => enc.encode(magnitude),
        }
    }

    /// Short label for logs and the index route.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hash(_) => "hash",
            Self::Protocol(_) => "protocol",
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256};

    use super::*;

    #[test]
    fn development_builds_hash_encoder() {
        let cfg = CommitmentConfig {
            shared_secret: "s".into(),
            ..CommitmentConfig::default()
        };
        let enc = VolumeEncoder::from_config(DeploymentMode::Development, &cfg, 1).unwrap();
        assert_eq!(enc.label(), "hash");
        assert_eq!(enc.encode(&BigUint::from(1u8)).unwrap().signature.len(), 32);
    }

    #[test]
    fn production_requires_key_and_sender() {
        let mut cfg = CommitmentConfig::default();
        let err = VolumeEncoder::from_config(DeploymentMode::Production, &cfg, 1).unwrap_err();
        assert!(matches!(err, VeilBatchError::InvalidConfiguration(_)));

        cfg.signer_key = Some(B256::repeat_byte(0x42));
        let err = VolumeEncoder::from_config(DeploymentMode::Production, &cfg, 1).unwrap_err();
        assert!(matches!(err, VeilBatchError::InvalidConfiguration(_)));

        cfg.sender = Some(Address::repeat_byte(0x01));
        let enc = VolumeEncoder::from_config(DeploymentMode::Production, &cfg, 1).unwrap();
        assert_eq!(enc.label(), "protocol");
        assert_eq!(enc.encode(&BigUint::from(1u8)).unwrap().signature.len(), 65);
    }

    #[test]
    fn production_rejects_bad_zone() {
        let cfg = CommitmentConfig {
            signer_key: Some(B256::repeat_byte(0x42)),
            sender: Some(Address::repeat_byte(0x01)),
            security_zone: 300,
            ..CommitmentConfig::default()
        };
        let err = VolumeEncoder::from_config(DeploymentMode::Production, &cfg, 1).unwrap_err();
        assert!(matches!(err, VeilBatchError::InvalidSecurityZone(300)));
    }
}
