//! Settlement pricing.
//!
//! Turns an oracle price and the strategy knobs into the settlement record
//! that is sealed and attested:
//!
//! 1. `spread = clamp(base + skew, 0, 10_000)` bps
//! 2. `gross = oracle × (1 + spread / 10_000)`
//! 3. `sqrtPriceX96 = floor(√gross × 10⁹) × floor(2⁹⁶ / 10⁹)`
//! 4. `deadline = timestamp + 300`
//!
//! All arithmetic runs on [`Decimal`] and [`U256`], so the same inputs
//! yield the same `sqrtPriceX96` on every host.

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use veilbatch_types::constants::{
    BPS_DENOMINATOR, MAX_SPREAD_BPS, Q96_OVER_SQRT_SCALE, SETTLEMENT_WINDOW_SECS,
    SQRT_PRICE_SCALE,
};
use veilbatch_types::{
    BatchId, BatchSettlement, NetFlow, PoolId, Result, StrategyParams, VeilBatchError,
};

/// Everything needed to price one batch.
#[derive(Debug, Clone)]
pub struct PricingInput<'a> {
    pub pool_id: &'a PoolId,
    pub batch_id: &'a BatchId,
    pub flow: &'a NetFlow,
    pub params: StrategyParams,
    /// Mid price from the oracle, token1 per token0.
    pub oracle_price: Decimal,
    /// Pricing time, unix seconds.
    pub timestamp: u64,
}

/// A settlement together with the intermediate values that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedSettlement {
    pub settlement: BatchSettlement,
    pub spread_bps: u32,
    pub gross_price: Decimal,
}

/// Prices batches against a configured default spread.
#[derive(Debug, Clone, Copy)]
pub struct SettlementPricer {
    default_spread_bps: u32,
}

impl SettlementPricer {
    #[must_use]
    pub fn new(default_spread_bps: u32) -> Self {
        Self { default_spread_bps }
    }

    #[must_use]
    pub fn default_spread_bps(&self) -> u32 {
        self.default_spread_bps
    }

    /// Spread after applying the batch overrides.
    #[must_use]
    pub fn effective_spread_bps(&self, params: &StrategyParams) -> u32 {
        let base = params.base_spread_bps.unwrap_or(self.default_spread_bps);
        clamp_spread_bps(i64::from(base), params.inventory_skew_bps.unwrap_or(0))
    }

    /// Build the settlement for one batch.
    ///
    /// # Errors
    /// Returns [`VeilBatchError::PricingFailed`] when the oracle price is not
    /// strictly positive or the price leaves the representable range.
    pub fn price(&self, input: &PricingInput<'_>) -> Result<PricedSettlement> {
        if input.oracle_price <= Decimal::ZERO {
            return Err(VeilBatchError::PricingFailed {
                reason: format!("oracle price must be positive, got {}", input.oracle_price),
            });
        }

        let spread_bps = self.effective_spread_bps(&input.params);
        let gross = gross_price(input.oracle_price, spread_bps)?;
        let sqrt_price_x96 = price_to_sqrt_price_x96(gross)?;

        let settlement = BatchSettlement {
            pool_id: *input.pool_id,
            batch_id: input.batch_id.clone(),
            sqrt_price_x96,
            token0_flow: input.flow.token0.to_string(),
            token1_flow: input.flow.token1.to_string(),
            deadline: settlement_deadline(input.timestamp),
        };

        tracing::debug!(
            pool = %input.pool_id.short(),
            batch = %input.batch_id,
            spread_bps,
            %gross,
            "settlement priced"
        );

        Ok(PricedSettlement {
            settlement,
            spread_bps,
            gross_price: gross,
        })
    }
}

impl Default for SettlementPricer {
    fn default() -> Self {
        Self::new(veilbatch_types::constants::DEFAULT_SPREAD_BPS)
    }
}

/// `clamp(base + skew, 0, 10_000)`. Saturates instead of overflowing.
#[must_use]
pub fn clamp_spread_bps(base_bps: i64, skew_bps: i64) -> u32 {
    let raw = base_bps.saturating_add(skew_bps);
    let clamped = raw.clamp(0, i64::from(MAX_SPREAD_BPS));
    // In 0..=10_000 after the clamp.
    u32::try_from(clamped).unwrap_or(MAX_SPREAD_BPS)
}

/// `oracle × (1 + spread_bps / 10_000)`.
///
/// # Errors
/// Returns [`VeilBatchError::PricingFailed`] if the product overflows.
pub fn gross_price(oracle_price: Decimal, spread_bps: u32) -> Result<Decimal> {
    let markup = Decimal::from(spread_bps) / Decimal::from(BPS_DENOMINATOR);
    oracle_price
        .checked_mul(Decimal::ONE + markup)
        .ok_or_else(|| VeilBatchError::PricingFailed {
            reason: format!("gross price overflow for {oracle_price} at {spread_bps} bps"),
        })
}

/// Q64.96 square root price: `floor(√price × 10⁹) × floor(2⁹⁶ / 10⁹)`.
///
/// # Errors
/// Returns [`VeilBatchError::PricingFailed`] for negative prices or when
/// the scaled root does not fit in 128 bits.
pub fn price_to_sqrt_price_x96(price: Decimal) -> Result<U256> {
    let root = price.sqrt().ok_or_else(|| VeilBatchError::PricingFailed {
        reason: format!("no square root for price {price}"),
    })?;
    let scaled = root
        .checked_mul(Decimal::from(SQRT_PRICE_SCALE))
        .map(|v| v.floor())
        .and_then(|v| v.to_u128())
        .ok_or_else(|| VeilBatchError::PricingFailed {
            reason: format!("scaled square root out of range for price {price}"),
        })?;
    Ok(U256::from(scaled) * U256::from(Q96_OVER_SQRT_SCALE))
}

/// Settlement expiry: `timestamp + 300` seconds.
#[must_use]
pub fn settlement_deadline(timestamp: u64) -> u64 {
    timestamp.saturating_add(SETTLEMENT_WINDOW_SECS)
}
