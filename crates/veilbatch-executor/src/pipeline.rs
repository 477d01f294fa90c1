//! The per-batch pipeline.
//!
//! ```text
//! validate → oracle price        → aggregate → conserve ┐
//!          → open sealed volumes ──────────────────────┴→ price → seal token0 → seal token1 → attest
//! ```
//!
//! Stages run strictly in sequence. The attestation covers the commitments,
//! so both sides are sealed before the attester is called. Any failure
//! aborts the batch and nothing partial is returned.
//!
//! External collaborators sit behind the [`PriceOracle`], [`VolumeOpener`],
//! [`VolumeSealer`] and [`Attester`] traits. The only shared mutable state
//! a batch touches is the sealer's salt counter.

use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::{BigInt, BigUint};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use veilbatch_pricing::{
    PricingInput, SettlementPricer, aggregate_orders, fingerprint_hex, settlement_fingerprint,
    verify_flow_conservation,
};
use veilbatch_sealing::{AttestationSigner, VolumeEncoder, decrypt_volume};
use veilbatch_types::constants::BPS_DENOMINATOR;
use veilbatch_types::{
    AttestationRecord, AttestationScheme, BatchInput, BatchMetadata, BatchRequest,
    BatchSettlement, CommittedVolume, EncryptedVolumes, NetFlow, OraclePrice, Result,
    VeilBatchError,
};

use crate::validation::validate_batch;

/// Source of the reference price for order batches.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn latest_price(&self) -> Result<OraclePrice>;
}

/// Opens pre-aggregated encrypted volumes.
#[async_trait]
pub trait VolumeOpener: Send + Sync {
    async fn open(&self, ciphertext: &str) -> Result<BigUint>;
}

/// Commits to one volume magnitude.
#[async_trait]
pub trait VolumeSealer: Send + Sync {
    async fn seal(&self, magnitude: &BigUint) -> Result<CommittedVolume>;
}

/// Signs a settlement together with its commitments.
#[async_trait]
pub trait Attester: Send + Sync {
    fn scheme(&self) -> AttestationScheme;

    async fn attest(
        &self,
        settlement: &BatchSettlement,
        volumes: &EncryptedVolumes,
    ) -> Result<AttestationRecord>;
}

#[async_trait]
impl VolumeSealer for VolumeEncoder {
    async fn seal(&self, magnitude: &BigUint) -> Result<CommittedVolume> {
        self.encode(magnitude)
    }
}

#[async_trait]
impl Attester for AttestationSigner {
    fn scheme(&self) -> AttestationScheme {
        AttestationSigner::scheme(self)
    }

    async fn attest(
        &self,
        settlement: &BatchSettlement,
        volumes: &EncryptedVolumes,
    ) -> Result<AttestationRecord> {
        self.sign(settlement, volumes)
    }
}

/// Development opener keyed by the shared secret.
#[derive(Clone)]
pub struct SharedSecretOpener {
    secret: String,
}

impl SharedSecretOpener {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl VolumeOpener for SharedSecretOpener {
    async fn open(&self, ciphertext: &str) -> Result<BigUint> {
        decrypt_volume(ciphertext, &self.secret)
    }
}

/// Everything a successful batch produces.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub settlement: BatchSettlement,
    pub encrypted_volumes: EncryptedVolumes,
    pub attestation: AttestationRecord,
    pub metadata: BatchMetadata,
    pub spread_bps: u32,
    pub gross_price: Decimal,
    /// SHA-256 fingerprint of the canonical settlement.
    pub fingerprint: [u8; 32],
}

/// Stateless batch executor over its collaborators.
#[derive(Clone)]
pub struct BatchPipeline {
    pricer: SettlementPricer,
    oracle: Arc<dyn PriceOracle>,
    opener: Arc<dyn VolumeOpener>,
    sealer: Arc<dyn VolumeSealer>,
    attester: Arc<dyn Attester>,
}

impl BatchPipeline {
    #[must_use]
    pub fn new(
        pricer: SettlementPricer,
        oracle: Arc<dyn PriceOracle>,
        opener: Arc<dyn VolumeOpener>,
        sealer: Arc<dyn VolumeSealer>,
        attester: Arc<dyn Attester>,
    ) -> Self {
        Self {
            pricer,
            oracle,
            opener,
            sealer,
            attester,
        }
    }

    #[must_use]
    pub fn attestation_scheme(&self) -> AttestationScheme {
        self.attester.scheme()
    }

    /// Validate a raw body, then run it.
    pub async fn execute(&self, body: &Value) -> Result<BatchOutcome> {
        let request = validate_batch(body)?;
        self.run(request).await
    }

    /// Run a validated batch through every stage.
    #[tracing::instrument(
        skip_all,
        fields(pool = %request.pool_id.short(), batch = %request.batch_id, orders = request.input.order_count())
    )]
    pub async fn run(&self, request: BatchRequest) -> Result<BatchOutcome> {
        self.run_stages(request)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "batch aborted"))
    }

    async fn run_stages(&self, request: BatchRequest) -> Result<BatchOutcome> {
        let (flow, metadata) = match &request.input {
            BatchInput::Orders(orders) => {
                let oracle = self.oracle.latest_price().await?;
                tracing::debug!(price = %oracle.price, publish_time = oracle.timestamp, "oracle price");
                let metadata = BatchMetadata {
                    oracle_price: oracle.price,
                    timestamp: request.metadata.timestamp.unwrap_or(oracle.timestamp),
                    pyth_confidence_bps: confidence_bps(oracle.confidence, oracle.price),
                    price_update_data: oracle.price_update_data,
                };

                let flow = aggregate_orders(orders);
                verify_flow_conservation(&flow)?;
                (flow, metadata)
            }
            BatchInput::PreAggregated {
                encrypted_token0_volume,
                encrypted_token1_volume,
            } => {
                let token0 = self.opener.open(encrypted_token0_volume).await?;
                let token1 = self.opener.open(encrypted_token1_volume).await?;
                tracing::debug!(%token0, %token1, "sealed volumes opened");

                let metadata = BatchMetadata {
                    oracle_price: request
                        .metadata
                        .oracle_price
                        .ok_or_else(|| VeilBatchError::schema("metadata.oraclePrice", "Required"))?,
                    timestamp: request
                        .metadata
                        .timestamp
                        .ok_or_else(|| VeilBatchError::schema("metadata.timestamp", "Required"))?,
                    pyth_confidence_bps: request.metadata.pyth_confidence_bps,
                    price_update_data: None,
                };
                (
                    NetFlow::new(BigInt::from(token0), -BigInt::from(token1)),
                    metadata,
                )
            }
        };

        let priced = self.pricer.price(&PricingInput {
            pool_id: &request.pool_id,
            batch_id: &request.batch_id,
            flow: &flow,
            params: request.strategy_params,
            oracle_price: metadata.oracle_price,
            timestamp: metadata.timestamp,
        })?;
        tracing::debug!(spread_bps = priced.spread_bps, gross_price = %priced.gross_price, "batch priced");

        let token0 = self.sealer.seal(&flow.token0_magnitude()).await?;
        let token1 = self.sealer.seal(&flow.token1_magnitude()).await?;
        let encrypted_volumes = EncryptedVolumes { token0, token1 };
        tracing::debug!(
            token0 = %encrypted_volumes.token0.ct_hash,
            token1 = %encrypted_volumes.token1.ct_hash,
            "volumes sealed"
        );

        let attestation = self
            .attester
            .attest(&priced.settlement, &encrypted_volumes)
            .await?;

        let fingerprint = settlement_fingerprint(&priced.settlement)?;
        tracing::info!(
            spread_bps = priced.spread_bps,
            token0_flow = %priced.settlement.token0_flow,
            token1_flow = %priced.settlement.token1_flow,
            deadline = priced.settlement.deadline,
            attestation = %attestation.scheme,
            fingerprint = %fingerprint_hex(&fingerprint),
            "batch settled"
        );

        Ok(BatchOutcome {
            settlement: priced.settlement,
            encrypted_volumes,
            attestation,
            metadata,
            spread_bps: priced.spread_bps,
            gross_price: priced.gross_price,
            fingerprint,
        })
    }
}

/// `round(confidence / |price| × 10_000)`, `None` for a zero price.
#[must_use]
pub fn confidence_bps(confidence: Decimal, price: Decimal) -> Option<i64> {
    if price.is_zero() {
        return None;
    }
    confidence
        .checked_div(price.abs())?
        .checked_mul(Decimal::from(BPS_DENOMINATOR))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
