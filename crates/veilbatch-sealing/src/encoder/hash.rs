//! Hash-commitment encoder for local and mock deployments.
//!
//! ```text
//!   ctHash    = SHA-256(magnitude as 32-byte big-endian)
//!   signature = HMAC-SHA256(shared_secret, magnitude as 32-byte big-endian)
//! ```
//!
//! Deterministic: the same magnitude and secret always give the same volume.

use alloy_primitives::{B256, Bytes};
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use veilbatch_types::{CommittedVolume, Result, VeilBatchError, constants, magnitude_word};

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 commitments authenticated with a shared secret.
#[derive(Clone)]
pub struct HashCommitmentEncoder {
    shared_secret: Vec<u8>,
}

impl HashCommitmentEncoder {
    #[must_use]
    pub fn new(shared_secret: impl AsRef<[u8]>) -> Self {
        Self {
            shared_secret: shared_secret.as_ref().to_vec(),
        }
    }

    /// Commit to a magnitude.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::MagnitudeOverflow`] above 256 bits.
    pub fn encode(&self, magnitude: &BigUint) -> Result<CommittedVolume> {
        let word = magnitude_word(magnitude)?;

        let ct_hash: [u8; 32] = Sha256::digest(word).into();

        let mut mac = HmacSha256::new_from_slice(&self.shared_secret)
            .map_err(|e| VeilBatchError::computation("hash commitment", e))?;
        mac.update(&word);
        let signature = mac.finalize().into_bytes().to_vec();

        Ok(CommittedVolume {
            ct_hash: B256::from(ct_hash),
            security_zone: 0,
            utype: constants::UTYPE_EUINT128,
            signature: Bytes::from(signature),
        })
    }
}

impl std::fmt::Debug for HashCommitmentEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashCommitmentEncoder")
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        let enc = HashCommitmentEncoder::new("secret");
        let a = enc.encode(&BigUint::from(1_000_u32)).unwrap();
        let b = enc.encode(&BigUint::from(1_000_u32)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_zone_and_utype() {
        let vol = HashCommitmentEncoder::new("s").encode(&BigUint::from(7u8)).unwrap();
        assert_eq!(vol.security_zone, 0);
        assert_eq!(vol.utype, constants::UTYPE_EUINT128);
        assert_eq!(vol.signature.len(), 32);
    }

    #[test]
    fn ct_hash_is_sha256_of_word() {
        let vol = HashCommitmentEncoder::new("s").encode(&BigUint::default()).unwrap();
        let expected: [u8; 32] = Sha256::digest([0u8; 32]).into();
        assert_eq!(vol.ct_hash, B256::from(expected));
    }

    #[test]
    fn secret_changes_signature_not_hash() {
        let m = BigUint::from(99u8);
        let a = HashCommitmentEncoder::new("one").encode(&m).unwrap();
        let b = HashCommitmentEncoder::new("two").encode(&m).unwrap();
        assert_eq!(a.ct_hash, b.ct_hash);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn oversized_magnitude_is_rejected() {
        let too_big = BigUint::from(1u8) << 256;
        let err = HashCommitmentEncoder::new("s").encode(&too_big).unwrap_err();
        assert!(matches!(err, VeilBatchError::MagnitudeOverflow { .. }));
    }

    #[test]
    fn debug_hides_secret() {
        let enc = HashCommitmentEncoder::new("hunter2");
        assert!(!format!("{enc:?}").contains("hunter2"));
    }
}
