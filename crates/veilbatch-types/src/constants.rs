//! System-wide constants for the VeilBatch settlement engine.

/// Basis points in 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Upper bound of the effective spread (100%).
pub const MAX_SPREAD_BPS: u32 = 10_000;

/// Default base spread when neither the request nor the environment sets one.
pub const DEFAULT_SPREAD_BPS: u32 = 35;

/// Lowest inventory skew a request may carry.
pub const MIN_INVENTORY_SKEW_BPS: i64 = -5_000;

/// Highest inventory skew a request may carry.
pub const MAX_INVENTORY_SKEW_BPS: i64 = 5_000;

/// Fixed settlement window added to the batch timestamp.
pub const SETTLEMENT_WINDOW_SECS: u64 = 300;

/// Intermediate precision used when scaling `sqrt(price)` (1e9).
pub const SQRT_PRICE_SCALE: u64 = 1_000_000_000;

/// `floor(2^96 / 1e9)`, the second stage of the Q96 scaling.
pub const Q96_OVER_SQRT_SCALE: u128 = 79_228_162_514_264_337_593;

/// Type tag for a 128-bit unsigned encrypted integer.
pub const UTYPE_EUINT128: u8 = 6;

/// Mask applied to the type tag inside the ctHash metadata byte.
pub const UTYPE_MASK: u8 = 0x7F;

/// Default chain id (Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// HMAC key used by the symmetric attester when no secret is configured.
///
/// Development only. Production deployments refuse to start without a secret.
pub const DEV_ATTESTATION_SECRET: &str = "local-dev-mnemonic";

/// Upper bound (exclusive) of values produced by the mock volume decryptor.
pub const MOCK_VOLUME_MODULUS: u64 = 1_000_000_000_000_000_000;

/// Minimum length of an encrypted volume string in a pre-aggregated batch.
pub const MIN_ENCRYPTED_VOLUME_LEN: usize = 4;

/// Default HTTP port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default HTTP bind host.
pub const DEFAULT_API_HOST: &str = "0.0.0.0";

/// Maximum accepted request body.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "VeilBatch";
