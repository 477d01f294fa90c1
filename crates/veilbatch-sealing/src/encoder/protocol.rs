//! Protocol-accurate commitment encoder.
//!
//! Produces ciphertext handles the on-chain verifier accepts:
//!
//! ```text
//!   preHash   = keccak256(magnitude ‖ sender ‖ keccak256(salt))     (32-byte words)
//!   ctHash    = preHash with the low 16 bits replaced by metadata
//!   digest    = keccak256(ctHash ‖ utype ‖ zone ‖ sender[20] ‖ chainId[32])
//!   signature = secp256k1(digest), 65 bytes r ‖ s ‖ v, v ∈ {27, 28}
//! ```
//!
//! ## Salt
//!
//! Each encoder owns its salt counter. It starts at zero and every
//! [`ProtocolCommitmentEncoder::encode`] reserves the next value with one
//! atomic `fetch_add`, so concurrent calls never share a salt. The counter
//! lives in memory only; a restarted process begins again at zero.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, B256, Bytes, U256, keccak256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use num_bigint::BigUint;
use veilbatch_types::{
    CommittedVolume, Result, SecurityZone, VeilBatchError, ct_hash_metadata, magnitude_word,
};

/// keccak/ECDSA commitments bound to a sender, zone and chain.
#[derive(Debug)]
pub struct ProtocolCommitmentEncoder {
    signer: PrivateKeySigner,
    sender: Address,
    security_zone: SecurityZone,
    utype: u8,
    chain_id: u64,
    salt: AtomicU64,
}

impl ProtocolCommitmentEncoder {
    /// Build an encoder. The zone is validated here, before any hashing.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::InvalidSecurityZone`] outside `-128..=127`.
    pub fn new(
        signer: PrivateKeySigner,
        sender: Address,
        security_zone: i64,
        utype: u8,
        chain_id: u64,
    ) -> Result<Self> {
        let security_zone = SecurityZone::new(security_zone)?;
        Ok(Self {
            signer,
            sender,
            security_zone,
            utype,
            chain_id,
            salt: AtomicU64::new(0),
        })
    }

    /// Build an encoder from a raw 32-byte secp256k1 key.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::InvalidConfiguration`] for an invalid key and
    /// [`VeilBatchError::InvalidSecurityZone`] for an out-of-range zone.
    pub fn from_key(
        key: &B256,
        sender: Address,
        security_zone: i64,
        utype: u8,
        chain_id: u64,
    ) -> Result<Self> {
        let signer = PrivateKeySigner::from_bytes(key).map_err(|e| {
            VeilBatchError::InvalidConfiguration(format!("invalid commitment signer key: {e}"))
        })?;
        Self::new(signer, sender, security_zone, utype, chain_id)
    }

    /// Address that signs every commitment.
    #[must_use]
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    #[must_use]
    pub fn security_zone(&self) -> SecurityZone {
        self.security_zone
    }

    /// Salt the next [`Self::encode`] call will use.
    #[must_use]
    pub fn next_salt(&self) -> u64 {
        self.salt.load(Ordering::SeqCst)
    }

    /// Commit to a magnitude, consuming one salt value.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::MagnitudeOverflow`] above 256 bits and
    /// [`VeilBatchError::ComputationFailure`] if signing fails.
    pub fn encode(&self, magnitude: &BigUint) -> Result<CommittedVolume> {
        let word = magnitude_word(magnitude)?;
        let salt = self.salt.fetch_add(1, Ordering::SeqCst);

        let ct_hash = self.ct_hash(&word, salt);
        let digest = self.signing_digest(&ct_hash);
        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(|e| VeilBatchError::computation("commitment signing", e))?;

        tracing::trace!(salt, ct_hash = %ct_hash, "volume committed");

        Ok(CommittedVolume {
            ct_hash,
            security_zone: self.security_zone.normalized(),
            utype: self.utype,
            signature: Bytes::from(signature.as_bytes().to_vec()),
        })
    }

    fn ct_hash(&self, word: &[u8; 32], salt: u64) -> B256 {
        let salt_hash = keccak256(U256::from(salt).to_be_bytes::<32>());

        let mut preimage = Vec::with_capacity(96);
        preimage.extend_from_slice(word);
        preimage.extend_from_slice(self.sender.into_word().as_slice());
        preimage.extend_from_slice(salt_hash.as_slice());
        let mut ct_hash = keccak256(&preimage);

        let metadata = ct_hash_metadata(self.utype, false, self.security_zone);
        ct_hash[30..].copy_from_slice(&metadata.to_be_bytes());
        ct_hash
    }

    /// Digest signed for a ctHash.
    #[must_use]
    pub fn signing_digest(&self, ct_hash: &B256) -> B256 {
        let mut preimage = Vec::with_capacity(32 + 1 + 1 + 20 + 32);
        preimage.extend_from_slice(ct_hash.as_slice());
        preimage.push(self.utype);
        preimage.push(self.security_zone.normalized());
        preimage.extend_from_slice(self.sender.as_slice());
        preimage.extend_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        keccak256(&preimage)
    }
}
