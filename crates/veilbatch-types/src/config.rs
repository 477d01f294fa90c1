//! Configuration types for a VeilBatch executor.
//!
//! These are plain values; loading them (environment, `.env`) is the
//! executor's job.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{AttestationScheme, EnclaveIdentity, VeilBatchError, constants};

/// Deployment mode. Selects the encoder and how strictly secrets are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Hash commitments; the symmetric attester may fall back to a dev secret.
    #[default]
    Development,
    /// Protocol-accurate commitments; missing secrets are fatal.
    Production,
}

impl DeploymentMode {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = VeilBatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "mock" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(VeilBatchError::InvalidConfiguration(format!(
                "unknown deployment mode '{other}' (expected development|production)"
            ))),
        }
    }
}

impl FromStr for AttestationScheme {
    type Err = VeilBatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac" => Ok(Self::Hmac),
            "enclave" | "tee" => Ok(Self::Enclave),
            other => Err(VeilBatchError::InvalidConfiguration(format!(
                "unknown attestation mode '{other}' (expected hmac|enclave)"
            ))),
        }
    }
}

/// Pricing and chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: DeploymentMode,
    /// Base spread used when a batch does not override it.
    pub default_spread_bps: u32,
    pub chain_id: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Development,
            default_spread_bps: constants::DEFAULT_SPREAD_BPS,
            chain_id: constants::DEFAULT_CHAIN_ID,
        }
    }
}

/// Settings for sealing volumes.
#[derive(Clone, Serialize, Deserialize)]
pub struct CommitmentConfig {
    /// Shared secret of the mock encryption scheme.
    #[serde(skip_serializing)]
    pub shared_secret: String,
    /// secp256k1 key authorizing commitments (production).
    #[serde(skip_serializing)]
    pub signer_key: Option<B256>,
    /// Raw zone; validated when the encoder is built.
    pub security_zone: i64,
    /// Authorizing contract address bound into every commitment.
    pub sender: Option<Address>,
    pub utype: u8,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            shared_secret: String::new(),
            signer_key: None,
            security_zone: 0,
            sender: None,
            utype: constants::UTYPE_EUINT128,
        }
    }
}

impl fmt::Debug for CommitmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitmentConfig")
            .field("shared_secret", &"<redacted>")
            .field("signer_key", &self.signer_key.map(|_| "<redacted>"))
            .field("security_zone", &self.security_zone)
            .field("sender", &self.sender)
            .field("utype", &self.utype)
            .finish()
    }
}

/// Settings for attesting batches.
#[derive(Clone, Serialize, Deserialize)]
pub struct AttestationConfig {
    pub scheme: AttestationScheme,
    /// HMAC secret, or the enclave mnemonic / hex private key.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub enclave: EnclaveIdentity,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            scheme: AttestationScheme::Hmac,
            secret: None,
            enclave: EnclaveIdentity::default(),
        }
    }
}

impl fmt::Debug for AttestationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttestationConfig")
            .field("scheme", &self.scheme)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("enclave", &self.enclave)
            .finish()
    }
}

/// Pyth Hermes endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub hermes_url: String,
    pub feed_id: B256,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_API_HOST.to_string(),
            port: constants::DEFAULT_API_PORT,
            body_limit_bytes: constants::MAX_REQUEST_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Values published on the index route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMetadata {
    pub chain_rpc_url: Option<String>,
    pub launchpad_address: Option<String>,
    pub hook_address: Option<String>,
}

/// Full executor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub commitment: CommitmentConfig,
    pub attestation: AttestationConfig,
    pub oracle: OracleConfig,
    pub server: ServerConfig,
    pub public_metadata: PublicMetadata,
}
