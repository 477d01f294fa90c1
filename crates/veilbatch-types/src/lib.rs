//! # veilbatch-types
//!
//! Shared types, errors, and configuration for the **VeilBatch** settlement engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PoolId`], [`BatchId`], plus re-exported EVM [`Address`] / [`B256`] / [`U256`]
//! - **Order model**: [`SwapOrder`]
//! - **Batch model**: [`BatchRequest`], [`BatchInput`], [`StrategyParams`], [`BatchMetadata`], [`OraclePrice`]
//! - **Settlement model**: [`NetFlow`], [`BatchSettlement`]
//! - **Sealed volume model**: [`CommittedVolume`], [`EncryptedVolumes`], [`SecurityZone`]
//! - **Attestation model**: [`AttestationRecord`], [`AttestationScheme`], [`EnclaveIdentity`]
//! - **Configuration**: [`AppConfig`] and its sections
//! - **Errors**: [`VeilBatchError`] with `VB_ERR_` prefix codes
//! - **Constants**: protocol constants and defaults

pub mod attestation;
pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod settlement;
pub mod volume;

// Re-export all primary types at crate root for ergonomic imports:
//   use veilbatch_types::{SwapOrder, NetFlow, BatchSettlement, ...};

pub use attestation::*;
pub use batch::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use settlement::*;
pub use volume::*;

pub use alloy_primitives::{Address, B256, Bytes, U256};

// Constants are accessed via `veilbatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
