//! # veilbatch-sealing
//!
//! **Cryptographic plane**: sealed volume commitments and batch attestations.
//!
//! ## Architecture
//!
//! The sealing plane receives a priced [`BatchSettlement`] and its net flow and:
//! 1. Commits the magnitude of each token side ([`VolumeEncoder`])
//! 2. Binds the settlement and both commitments to a signer ([`AttestationSigner`])
//!
//! Signs never cross into the commitments: only absolute values are sealed,
//! the direction stays in the settlement.
//!
//! ## Strategies
//!
//! Both planes pick their strategy once, from the deployment configuration:
//!
//! - **Development**: SHA-256/HMAC hash commitments, symmetric attestation
//! - **Production**: keccak/ECDSA commitments compatible with the on-chain
//!   verifier, and either attestation variant
//!
//! [`BatchSettlement`]: veilbatch_types::BatchSettlement

pub mod attestation;
pub mod encoder;
pub mod mock;

pub use attestation::{AttestationSigner, EnclaveAttester, HmacAttester};
pub use encoder::{HashCommitmentEncoder, ProtocolCommitmentEncoder, VolumeEncoder};
pub use mock::{ciphertext_payload, decrypt_volume, seal_volume};
