//! Identifiers used throughout VeilBatch.
//!
//! Pools are identified by their 32-byte on-chain id. Batch ids are
//! caller-chosen hex strings of arbitrary length and are echoed verbatim.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::{Result, VeilBatchError};

// ---------------------------------------------------------------------------
// PoolId
// ---------------------------------------------------------------------------

/// 32-byte pool identifier (`keccak256` of the pool key on-chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub B256);

impl PoolId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl FromStr for PoolId {
    type Err = VeilBatchError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s)
            .ok_or_else(|| VeilBatchError::schema("poolId", "Expected 0x-prefixed hex"))?;
        if digits.len() != 64 {
            return Err(VeilBatchError::schema(
                "poolId",
                "Expected 32-byte hex value",
            ));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(digits, &mut out)
            .map_err(|_| VeilBatchError::schema("poolId", "Invalid hex string"))?;
        Ok(Self(B256::from(out)))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BatchId
// ---------------------------------------------------------------------------

/// Batch identifier: `0x` followed by at least one hex digit.
///
/// Kept as the caller's string so that responses echo it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BatchId {
    type Err = VeilBatchError;

    fn from_str(s: &str) -> Result<Self> {
        match strip_hex_prefix(s) {
            Some(digits) if !digits.is_empty() && is_hex(digits) => Ok(Self(s.to_string())),
            _ => Err(VeilBatchError::schema("batchId", "Invalid hex string")),
        }
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

/// Return the digits after a mandatory `0x` prefix.
#[must_use]
pub fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x")
}

/// `true` when every character is an ASCII hex digit.
#[must_use]
pub fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `true` when `s` is `0x` followed by exactly `len` hex digits.
#[must_use]
pub fn is_prefixed_hex_of_len(s: &str, len: usize) -> bool {
    strip_hex_prefix(s).is_some_and(|d| d.len() == len && is_hex(d))
}
