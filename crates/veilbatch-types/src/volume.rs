//! Sealed volume model: the ciphertext handle handed to the confidential
//! verifier for each side of a batch.
//!
//! ## ctHash layout
//!
//! ```text
//!   bits 255..16   commitment hash (low 16 bits cleared)
//!   bits  15..8    (is_trivial << 7) | (utype & 0x7F)
//!   bits   7..0    security zone as unsigned byte
//! ```

use std::fmt;

use alloy_primitives::{B256, Bytes};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{Result, VeilBatchError, constants};

/// Signed tag partitioning ciphertext domains. Always within `i8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityZone(i8);

impl SecurityZone {
    /// Validate a zone coming from configuration or a caller.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::InvalidSecurityZone`] outside `-128..=127`.
    pub fn new(zone: i64) -> Result<Self> {
        i8::try_from(zone)
            .map(Self)
            .map_err(|_| VeilBatchError::InvalidSecurityZone(zone))
    }

    #[must_use]
    pub fn get(self) -> i8 {
        self.0
    }

    /// Unsigned byte form: `(zone + 256) mod 256`.
    #[must_use]
    pub fn normalized(self) -> u8 {
        // Two's complement reinterpretation is exactly (zone + 256) mod 256.
        self.0.to_be_bytes()[0]
    }
}

impl fmt::Display for SecurityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A committed (sealed) magnitude. One per token side per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedVolume {
    /// 32-byte commitment with embedded metadata.
    pub ct_hash: B256,
    /// Zone as an unsigned byte (0..=255).
    pub security_zone: u8,
    /// Plaintext type tag.
    pub utype: u8,
    /// Binding signature (65-byte ECDSA in production, 32-byte HMAC in mock mode).
    pub signature: Bytes,
}

impl CommittedVolume {
    /// Metadata bits embedded in the low 16 bits of `ct_hash`.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn embedded_metadata(&self) -> u16 {
        u16::from_be_bytes([self.ct_hash[30], self.ct_hash[31]])
    }
}

/// Build the 16-bit metadata field placed in the low bits of a ctHash.
#[must_use]
pub fn ct_hash_metadata(utype: u8, is_trivial: bool, zone: SecurityZone) -> u16 {
    let type_byte = (u8::from(is_trivial) << 7) | (utype & constants::UTYPE_MASK);
    u16::from_be_bytes([type_byte, zone.normalized()])
}

/// The committed volumes for both sides of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVolumes {
    pub token0: CommittedVolume,
    pub token1: CommittedVolume,
}

/// Encode a non-negative magnitude as a 32-byte big-endian word.
///
/// # Errors
/// Returns [`VeilBatchError::MagnitudeOverflow`] above `2^256 - 1`.
pub fn magnitude_word(magnitude: &BigUint) -> Result<[u8; 32]> {
    let bytes = magnitude.to_bytes_be();
    if bytes.len() > 32 {
        return Err(VeilBatchError::MagnitudeOverflow {
            bits: magnitude.bits(),
        });
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}
