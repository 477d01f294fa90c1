//! Attestation records binding a settlement and its sealed volumes to a
//! signer identity.

use std::fmt;

use alloy_primitives::{Address, B256, Bytes};
use serde::{Deserialize, Serialize};

/// Which attestation scheme produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationScheme {
    /// HMAC-SHA256 over the canonical settlement and both ctHashes.
    Hmac,
    /// Personal-message signature plus enclave measurement, ABI encoded.
    Enclave,
}

impl fmt::Display for AttestationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac => write!(f, "HMAC"),
            Self::Enclave => write!(f, "ENCLAVE"),
        }
    }
}

/// Measurement identity of the trusted execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnclaveIdentity {
    /// Hash of the enclave code.
    pub mr_enclave: B256,
    /// Hash of the enclave signing authority.
    pub mr_signer: B256,
}

/// Opaque signed payload produced for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRecord {
    pub scheme: AttestationScheme,
    /// HMAC digest, or the ABI-encoded enclave tuple.
    pub payload: Bytes,
    /// Recoverable signer (enclave scheme only).
    pub signer: Option<Address>,
    /// EIP-191 hash of the signed message (enclave scheme only).
    pub message_hash: Option<B256>,
}

impl AttestationRecord {
    /// `0x`-prefixed hex form returned to callers.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.payload))
    }
}
