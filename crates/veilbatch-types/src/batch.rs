//! Batch request model, after schema validation.
//!
//! A batch either carries the raw orders (the sequencer path) or two
//! already-encrypted aggregate volumes (the pre-aggregated path). The HTTP
//! layer builds a [`BatchRequest`] only once every field has been checked.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BatchId, PoolId, SwapOrder};

/// Optional per-batch pricing knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParams {
    /// Overrides the configured base spread.
    pub base_spread_bps: Option<u32>,
    /// Signed adjustment added to the base spread.
    pub inventory_skew_bps: Option<i64>,
}

/// Metadata a caller may supply alongside the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub oracle_price: Option<Decimal>,
    pub timestamp: Option<u64>,
    pub pyth_confidence_bps: Option<i64>,
}

/// What the batch carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    /// Individual orders to be netted.
    Orders(Vec<SwapOrder>),
    /// Aggregate volumes sealed by the sequencer.
    PreAggregated {
        encrypted_token0_volume: String,
        encrypted_token1_volume: String,
    },
}

impl BatchInput {
    /// Number of orders, zero for pre-aggregated batches.
    #[must_use]
    pub fn order_count(&self) -> usize {
        match self {
            Self::Orders(orders) => orders.len(),
            Self::PreAggregated { .. } => 0,
        }
    }
}

/// A validated batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub pool_id: PoolId,
    pub batch_id: BatchId,
    pub strategy_params: StrategyParams,
    pub metadata: RequestMetadata,
    pub input: BatchInput,
}

/// A price reading from the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: Decimal,
    pub confidence: Decimal,
    /// Publish time, unix seconds.
    pub timestamp: u64,
    /// Signed price update blobs (`0x` hex) for on-chain verification.
    pub price_update_data: Option<Vec<String>>,
}

/// Pricing context actually used for a batch, echoed in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetadata {
    #[serde(with = "rust_decimal::serde::float")]
    pub oracle_price: Decimal,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pyth_confidence_bps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_update_data: Option<Vec<String>>,
}
