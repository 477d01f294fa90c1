//! # veilbatch-pricing
//!
//! **Pure deterministic compute plane for VeilBatch.**
//!
//! Takes the orders of one batch and an oracle price and produces the
//! settlement. It has:
//!
//! - **Zero side effects**: no I/O, no keys, no shared state
//! - **Unbounded integers**: flows never overflow, whatever the batch size
//! - **Deterministic output**: same orders + price → same settlement and fingerprint
//! - **Conservation check**: order-derived flows must cancel out

pub mod aggregator;
pub mod conservation;
pub mod determinism;
pub mod pricer;

pub use aggregator::aggregate_orders;
pub use conservation::verify_flow_conservation;
pub use determinism::{fingerprint_hex, settlement_fingerprint};
pub use pricer::{
    PricedSettlement, PricingInput, SettlementPricer, clamp_spread_bps, gross_price,
    price_to_sqrt_price_x96, settlement_deadline,
};
