//! Error types for the VeilBatch settlement engine.
//!
//! All errors use the `VB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Request schema errors
//! - 2xx: Upstream (oracle, delegated encryption) errors
//! - 3xx: Volume encoder errors
//! - 4xx: Signing / attestation errors
//! - 5xx: Pricing and flow errors
//! - 9xx: Configuration / internal errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single schema problem found while validating a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// Dotted path of the offending field (e.g. `orders.0.sender`).
    pub path: String,
    /// Human readable description.
    pub message: String,
}

impl SchemaIssue {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Coarse classification of an error, used by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller sent something malformed.
    Schema,
    /// An external dependency could not be reached.
    Upstream,
    /// The deployment is misconfigured.
    Configuration,
    /// A computation inside the pipeline failed.
    Computation,
}

/// Central error enum for all VeilBatch operations.
#[derive(Debug, Error)]
pub enum VeilBatchError {
    // =================================================================
    // Request Schema Errors (1xx)
    // =================================================================
    /// The batch request failed validation. No pipeline work was done.
    #[error("VB_ERR_100: Invalid payload ({} issue(s)): {}", .issues.len(), join_issues(.issues))]
    SchemaViolation { issues: Vec<SchemaIssue> },

    // =================================================================
    // Upstream Errors (2xx)
    // =================================================================
    /// The oracle or the delegated encryption service is unreachable.
    #[error("VB_ERR_200: Upstream {service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    // =================================================================
    // Encoder Errors (3xx)
    // =================================================================
    /// Security zone outside the signed byte range.
    #[error("VB_ERR_300: Invalid security zone {0}: expected -128..=127")]
    InvalidSecurityZone(i64),

    /// A magnitude does not fit in a 32-byte word.
    #[error("VB_ERR_301: Magnitude exceeds 256 bits ({bits} bits)")]
    MagnitudeOverflow { bits: u64 },

    // =================================================================
    // Signing / Attestation Errors (4xx)
    // =================================================================
    /// A cryptographic primitive rejected the signing or encoding step.
    #[error("VB_ERR_400: Computation failed during {stage}: {reason}")]
    ComputationFailure { stage: String, reason: String },

    // =================================================================
    // Pricing / Flow Errors (5xx)
    // =================================================================
    /// The settlement price could not be derived.
    #[error("VB_ERR_500: Pricing failed: {reason}")]
    PricingFailed { reason: String },

    /// Order-derived flows did not cancel out.
    #[error("VB_ERR_501: Flow conservation violated: token0={token0}, token1={token1}")]
    FlowConservationViolation { token0: String, token1: String },

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Configuration error (missing or malformed settings).
    #[error("VB_ERR_900: Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization / deserialization error.
    #[error("VB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable internal error.
    #[error("VB_ERR_902: Internal error: {0}")]
    Internal(String),
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl VeilBatchError {
    /// Shorthand for a schema violation with a single issue.
    #[must_use]
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            issues: vec![SchemaIssue::new(path, message)],
        }
    }

    /// Shorthand for an upstream failure.
    #[must_use]
    pub fn upstream(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a failed cryptographic computation.
    #[must_use]
    pub fn computation(stage: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ComputationFailure {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemaViolation { .. } => ErrorKind::Schema,
            Self::UpstreamUnavailable { .. } => ErrorKind::Upstream,
            Self::InvalidSecurityZone(_) | Self::InvalidConfiguration(_) => {
                ErrorKind::Configuration
            }
            Self::MagnitudeOverflow { .. }
            | Self::ComputationFailure { .. }
            | Self::PricingFailed { .. }
            | Self::FlowConservationViolation { .. }
            | Self::Serialization(_)
            | Self::Internal(_) => ErrorKind::Computation,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VeilBatchError>;

impl From<serde_json::Error> for VeilBatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
