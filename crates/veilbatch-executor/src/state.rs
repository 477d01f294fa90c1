//! Shared state handed to every route.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use veilbatch_pricing::SettlementPricer;
use veilbatch_sealing::{AttestationSigner, VolumeEncoder};
use veilbatch_types::{AppConfig, AttestationScheme, DeploymentMode, PublicMetadata, Result};

use crate::oracle::HermesOracle;
use crate::pipeline::{BatchPipeline, SharedSecretOpener};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BatchPipeline>,
    pub started_at: DateTime<Utc>,
    pub public_metadata: Arc<PublicMetadata>,
    pub mode: DeploymentMode,
    /// Label of the commitment encoder (`hash` or `protocol`).
    pub encoder: &'static str,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// Wire the production collaborators from configuration.
    ///
    /// Fails when the encoder or the attester cannot be built, so a
    /// misconfigured process never starts serving.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mode = config.engine.mode;
        let encoder = VolumeEncoder::from_config(mode, &config.commitment, config.engine.chain_id)?;
        let attester = AttestationSigner::from_config(mode, &config.attestation)?;
        let label = encoder.label();

        let pipeline = BatchPipeline::new(
            SettlementPricer::new(config.engine.default_spread_bps),
            Arc::new(HermesOracle::new(reqwest::Client::new(), &config.oracle)),
            Arc::new(SharedSecretOpener::new(config.commitment.shared_secret.clone())),
            Arc::new(encoder),
            Arc::new(attester),
        );

        tracing::info!(
            %mode,
            encoder = label,
            attestation = %pipeline.attestation_scheme(),
            spread_bps = config.engine.default_spread_bps,
            "batch pipeline ready"
        );

        Ok(Self::new(pipeline, config, label))
    }

    /// State over an already built pipeline.
    #[must_use]
    pub fn new(pipeline: BatchPipeline, config: &AppConfig, encoder: &'static str) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            started_at: Utc::now(),
            public_metadata: Arc::new(config.public_metadata.clone()),
            mode: config.engine.mode,
            encoder,
            body_limit_bytes: config.server.body_limit_bytes,
        }
    }

    #[must_use]
    pub fn attestation_scheme(&self) -> AttestationScheme {
        self.pipeline.attestation_scheme()
    }
}
