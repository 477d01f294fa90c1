//! # veilbatch-executor
//!
//! **Service plane**: the process that accepts batches and returns
//! attested settlements.
//!
//! ## Architecture
//!
//! The executor wires the pure planes to the outside world:
//! 1. **config**: environment → [`AppConfig`](veilbatch_types::AppConfig)
//! 2. **validation**: raw JSON → [`BatchRequest`](veilbatch_types::BatchRequest), every issue collected
//! 3. **oracle**: Pyth Hermes price client
//! 4. **pipeline**: the strict per-batch stage sequence
//! 5. **api**: axum routes over a shared [`AppState`]
//!
//! ## Request Flow
//!
//! ```text
//! POST /batch → validate → oracle | open volumes → aggregate → conserve
//!             → price → seal token0 → seal token1 → attest → response
//! ```
//!
//! A batch that fails any stage returns no settlement.

pub mod api;
pub mod config;
pub mod oracle;
pub mod pipeline;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use api::router;
pub use config::{load_config, load_config_from};
pub use oracle::HermesOracle;
pub use pipeline::{
    Attester, BatchOutcome, BatchPipeline, PriceOracle, SharedSecretOpener, VolumeOpener,
    VolumeSealer,
};
pub use state::AppState;
pub use validation::validate_batch;
