//! Enclave-style attestation.
//!
//! The attester signs a JSON message with the personal-message convention
//! (EIP-191) and wraps it with the enclave measurement:
//!
//! ```text
//!   message = {"sealed":{"token0":ctHash0,"token1":ctHash1},"settlement":<canonical settlement>}
//!   payload = abi.encode(string message, bytes32 messageHash, bytes signature,
//!                        address signer, bytes32 mrEnclave, bytes32 mrSigner)
//! ```
//!
//! A verifier can check both who signed (the recovered address) and what
//! code produced it (`mrEnclave`/`mrSigner`).

use std::str::FromStr;

use alloy::primitives::{Address, B256, Bytes, eip191_hash_message};
use alloy::signers::SignerSync;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use alloy::sol_types::SolValue;
use veilbatch_types::{
    AttestationRecord, AttestationScheme, BatchSettlement, EnclaveIdentity, EncryptedVolumes,
    Result, VeilBatchError, is_hex, is_prefixed_hex_of_len,
};

/// ECDSA attester bound to an enclave identity.
#[derive(Debug, Clone)]
pub struct EnclaveAttester {
    signer: PrivateKeySigner,
    identity: EnclaveIdentity,
}

impl EnclaveAttester {
    #[must_use]
    pub fn new(signer: PrivateKeySigner, identity: EnclaveIdentity) -> Self {
        Self { signer, identity }
    }

    /// Build from key material: a BIP-39 mnemonic (first account,
    /// `m/44'/60'/0'/0/0`) or a 32-byte hex private key.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::InvalidConfiguration`] if the material is
    /// neither a usable mnemonic nor a valid key.
    pub fn from_secret(secret: &str, identity: EnclaveIdentity) -> Result<Self> {
        let secret = secret.trim();
        let signer = if is_prefixed_hex_of_len(secret, 64) || is_raw_key(secret) {
            PrivateKeySigner::from_str(secret).map_err(|e| {
                VeilBatchError::InvalidConfiguration(format!("invalid enclave private key: {e}"))
            })?
        } else {
            MnemonicBuilder::<English>::default()
                .phrase(secret)
                .index(0)
                .and_then(|builder| builder.build())
                .map_err(|e| {
                    VeilBatchError::InvalidConfiguration(format!("invalid enclave mnemonic: {e}"))
                })?
        };
        Ok(Self::new(signer, identity))
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    #[must_use]
    pub fn identity(&self) -> &EnclaveIdentity {
        &self.identity
    }

    pub fn sign(
        &self,
        settlement: &BatchSettlement,
        volumes: &EncryptedVolumes,
    ) -> Result<AttestationRecord> {
        let message = attestation_message(settlement, volumes)?;
        let message_hash = eip191_hash_message(message.as_bytes());
        let signature = self
            .signer
            .sign_message_sync(message.as_bytes())
            .map_err(|e| VeilBatchError::computation("enclave attestation", e))?;
        let signer = self.signer.address();

        let payload = (
            message,
            message_hash,
            Bytes::from(signature.as_bytes().to_vec()),
            signer,
            self.identity.mr_enclave,
            self.identity.mr_signer,
        )
            .abi_encode_params();

        Ok(AttestationRecord {
            scheme: AttestationScheme::Enclave,
            payload: Bytes::from(payload),
            signer: Some(signer),
            message_hash: Some(message_hash),
        })
    }
}

fn is_raw_key(s: &str) -> bool {
    s.len() == 64 && is_hex(s)
}

/// The JSON message covered by the enclave signature. Keys are sorted at
/// every level.
pub fn attestation_message(
    settlement: &BatchSettlement,
    volumes: &EncryptedVolumes,
) -> Result<String> {
    Ok(format!(
        r#"{{"sealed":{{"token0":"{}","token1":"{}"}},"settlement":{}}}"#,
        hex_word(&volumes.token0.ct_hash),
        hex_word(&volumes.token1.ct_hash),
        settlement.canonical_json()?
    ))
}

fn hex_word(word: &B256) -> String {
    format!("0x{}", hex::encode(word))
}
