//! Environment-driven configuration for the executor.
//!
//! Variable names follow the deployment manifests:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `VEILBATCH_MODE` | `development` / `production` | `development` |
//! | `ATTESTATION_MODE` | `hmac` / `enclave` | `hmac` |
//! | `STRATEGY_SPREAD_BPS` | default spread, 0..=10000 | 35 |
//! | `CHAIN_ID` | chain bound into commitments | 11155111 |
//! | `MNEMONIC` | HMAC secret, or enclave key material | none |
//! | `FHENIX_SHARED_SECRET` | mock encryption secret | empty |
//! | `COFHE_SIGNER_PRIVATE_KEY` | 32-byte hex commitment key | none |
//! | `SWAP_HANDLER_ADDRESS` | authorizing sender | none |
//! | `COFHE_SECURITY_ZONE` | -128..=127 | 0 |
//! | `MR_ENCLAVE_PUBLIC` / `MR_SIGNER_PUBLIC` | enclave measurement | required for `enclave` |
//! | `PYTH_HERMES_URL` / `PYTH_FEED_ID` | oracle endpoint and feed | public Hermes, ETH/USD |
//! | `EXPRESS_HOST` / `EXPRESS_PORT` | listener | `0.0.0.0:8080` |
//! | `CHAIN_RPC_URL_PUBLIC`, `NAJ_LAUNCHPAD_ADDRESS_PUBLIC`, `NAJ_HOOK_ADDRESS_PUBLIC` | published on `/` | none |
//!
//! Every invalid variable is reported in one error.

use std::str::FromStr;

use veilbatch_types::constants::{self, MAX_SPREAD_BPS};
use veilbatch_types::{
    Address, AppConfig, AttestationConfig, AttestationScheme, B256, CommitmentConfig,
    DeploymentMode, EnclaveIdentity, EngineConfig, OracleConfig, PublicMetadata, Result,
    SecurityZone, ServerConfig, VeilBatchError, is_hex, strip_hex_prefix,
};

/// Public Pyth Hermes endpoint.
pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network";
/// Crypto.ETH/USD.
pub const DEFAULT_PYTH_FEED_ID: &str =
    "0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace";

/// Load configuration from the process environment, after merging a
/// `.env` file when one exists.
pub fn load_config() -> Result<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary lookup.
pub fn load_config_from<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvReader {
        lookup,
        errors: Vec::new(),
    };

    let mode = env.parsed("VEILBATCH_MODE", DeploymentMode::default());
    let scheme = env.parsed("ATTESTATION_MODE", AttestationScheme::Hmac);

    let default_spread_bps = env.parsed("STRATEGY_SPREAD_BPS", constants::DEFAULT_SPREAD_BPS);
    if default_spread_bps > MAX_SPREAD_BPS {
        env.error(format!(
            "STRATEGY_SPREAD_BPS must be within 0..={MAX_SPREAD_BPS}, got {default_spread_bps}"
        ));
    }
    let chain_id = env.parsed("CHAIN_ID", constants::DEFAULT_CHAIN_ID);

    let security_zone = env.parsed("COFHE_SECURITY_ZONE", 0_i64);
    if let Err(e) = SecurityZone::new(security_zone) {
        env.error(format!("COFHE_SECURITY_ZONE: {e}"));
    }

    let signer_key = env.word("COFHE_SIGNER_PRIVATE_KEY");
    let sender = env.address("SWAP_HANDLER_ADDRESS");
    let mnemonic = env.string("MNEMONIC");

    if mode.is_production() {
        if signer_key.is_none() {
            env.error("COFHE_SIGNER_PRIVATE_KEY is required in production".into());
        }
        if sender.is_none() {
            env.error("SWAP_HANDLER_ADDRESS is required in production".into());
        }
    }
    if mnemonic.is_none() && (mode.is_production() || scheme == AttestationScheme::Enclave) {
        env.error(format!("MNEMONIC is required for {scheme} attestation in {mode}"));
    }

    let mr_enclave = env.word("MR_ENCLAVE_PUBLIC");
    let mr_signer = env.word("MR_SIGNER_PUBLIC");
    if scheme == AttestationScheme::Enclave {
        let measurements = [("MR_ENCLAVE_PUBLIC", &mr_enclave), ("MR_SIGNER_PUBLIC", &mr_signer)];
        for (key, value) in measurements {
            if value.is_none() && env.string(key).is_none() {
                env.error(format!("{key} is required for {scheme} attestation"));
            }
        }
    }
    let enclave = EnclaveIdentity {
        mr_enclave: mr_enclave.unwrap_or_default(),
        mr_signer: mr_signer.unwrap_or_default(),
    };

    let oracle = OracleConfig {
        hermes_url: env
            .string("PYTH_HERMES_URL")
            .unwrap_or_else(|| DEFAULT_HERMES_URL.to_string()),
        feed_id: env.word("PYTH_FEED_ID").unwrap_or_else(default_feed_id),
    };

    let server = ServerConfig {
        host: env
            .string("EXPRESS_HOST")
            .unwrap_or_else(|| constants::DEFAULT_API_HOST.to_string()),
        port: env.parsed("EXPRESS_PORT", constants::DEFAULT_API_PORT),
        body_limit_bytes: constants::MAX_REQUEST_BODY_BYTES,
    };

    let public_metadata = PublicMetadata {
        chain_rpc_url: env.string("CHAIN_RPC_URL_PUBLIC"),
        launchpad_address: env.hex("NAJ_LAUNCHPAD_ADDRESS_PUBLIC"),
        hook_address: env.hex("NAJ_HOOK_ADDRESS_PUBLIC"),
    };

    let commitment = CommitmentConfig {
        shared_secret: env.string("FHENIX_SHARED_SECRET").unwrap_or_default(),
        signer_key,
        security_zone,
        sender,
        utype: constants::UTYPE_EUINT128,
    };

    if !env.errors.is_empty() {
        return Err(VeilBatchError::InvalidConfiguration(env.errors.join("; ")));
    }

    Ok(AppConfig {
        engine: EngineConfig {
            mode,
            default_spread_bps,
            chain_id,
        },
        commitment,
        attestation: AttestationConfig {
            scheme,
            secret: mnemonic,
            enclave,
        },
        oracle,
        server,
        public_metadata,
    })
}

fn default_feed_id() -> B256 {
    DEFAULT_PYTH_FEED_ID.parse().unwrap_or_default()
}

struct EnvReader<F> {
    lookup: F,
    errors: Vec<String>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    /// Trimmed, non-empty value.
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(&mut self, key: &str, default: T) -> T
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                self.error(format!("{key}: {e}"));
                default
            }),
        }
    }

    /// `0x`-prefixed 32-byte hex value.
    fn word(&mut self, key: &str) -> Option<B256> {
        let raw = self.string(key)?;
        match strip_hex_prefix(&raw) {
            Some(digits) if digits.len() == 64 && is_hex(digits) => raw.parse().ok(),
            _ => {
                self.error(format!("{key}: expected 32-byte hex value"));
                None
            }
        }
    }

    /// `0x`-prefixed 20-byte address.
    fn address(&mut self, key: &str) -> Option<Address> {
        let raw = self.string(key)?;
        match strip_hex_prefix(&raw) {
            Some(digits) if digits.len() == 40 && is_hex(digits) => raw.parse().ok(),
            _ => {
                self.error(format!("{key}: expected EVM address"));
                None
            }
        }
    }

    /// Any `0x`-prefixed hex string, kept verbatim.
    fn hex(&mut self, key: &str) -> Option<String> {
        let raw = self.string(key)?;
        if strip_hex_prefix(&raw).is_some_and(|d| !d.is_empty() && is_hex(d)) {
            Some(raw)
        } else {
            self.error(format!("{key}: expected hex string prefixed with 0x"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        load_config_from(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_development_defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.engine.mode, DeploymentMode::Development);
        assert_eq!(cfg.engine.default_spread_bps, 35);
        assert_eq!(cfg.engine.chain_id, 11_155_111);
        assert_eq!(cfg.attestation.scheme, AttestationScheme::Hmac);
        assert!(cfg.attestation.secret.is_none());
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.oracle.hermes_url, DEFAULT_HERMES_URL);
        assert_eq!(cfg.oracle.feed_id, default_feed_id());
        assert_ne!(cfg.oracle.feed_id, B256::ZERO);
        assert_eq!(cfg.public_metadata, PublicMetadata::default());
    }

    #[test]
    fn values_are_read() {
        let key = format!("0x{}", "42".repeat(32));
        let cfg = load(&[
            ("STRATEGY_SPREAD_BPS", "50"),
            ("CHAIN_ID", "1"),
            ("COFHE_SECURITY_ZONE", "-1"),
            ("COFHE_SIGNER_PRIVATE_KEY", key.as_str()),
            ("SWAP_HANDLER_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("EXPRESS_PORT", "9000"),
            ("NAJ_HOOK_ADDRESS_PUBLIC", "0xabc"),
        ])
        .unwrap();
        assert_eq!(cfg.engine.default_spread_bps, 50);
        assert_eq!(cfg.engine.chain_id, 1);
        assert_eq!(cfg.commitment.security_zone, -1);
        assert_eq!(cfg.commitment.signer_key, Some(B256::repeat_byte(0x42)));
        assert_eq!(cfg.commitment.sender, Some(Address::repeat_byte(0x11)));
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.public_metadata.hook_address.as_deref(), Some("0xabc"));
    }

    #[test]
    fn all_errors_are_reported_together() {
        let err = load(&[
            ("STRATEGY_SPREAD_BPS", "20000"),
            ("COFHE_SECURITY_ZONE", "200"),
            ("SWAP_HANDLER_ADDRESS", "0x1234"),
            ("EXPRESS_PORT", "eighty"),
        ])
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("VB_ERR_900"), "{msg}");
        assert!(msg.contains("STRATEGY_SPREAD_BPS"));
        assert!(msg.contains("COFHE_SECURITY_ZONE"));
        assert!(msg.contains("SWAP_HANDLER_ADDRESS"));
        assert!(msg.contains("EXPRESS_PORT"));
    }

    #[test]
    fn production_requires_keys() {
        let err = load(&[("VEILBATCH_MODE", "production")]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("COFHE_SIGNER_PRIVATE_KEY"));
        assert!(msg.contains("SWAP_HANDLER_ADDRESS"));
        assert!(msg.contains("MNEMONIC"));
    }

    const HARDHAT_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn enclave_env() -> Vec<(&'static str, String)> {
        vec![
            ("ATTESTATION_MODE", "enclave".into()),
            ("MNEMONIC", HARDHAT_MNEMONIC.into()),
            ("MR_ENCLAVE_PUBLIC", format!("0x{}", "e1".repeat(32))),
            ("MR_SIGNER_PUBLIC", format!("0x{}", "51".repeat(32))),
        ]
    }

    fn load_owned(vars: &[(&'static str, String)]) -> Result<AppConfig> {
        let borrowed: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        load(&borrowed)
    }

    #[test]
    fn enclave_attestation_requires_mnemonic() {
        let vars: Vec<_> = enclave_env().into_iter().filter(|(k, _)| *k != "MNEMONIC").collect();
        let msg = load_owned(&vars).unwrap_err().to_string();
        assert!(msg.contains("MNEMONIC"), "{msg}");

        let cfg = load_owned(&enclave_env()).unwrap();
        assert_eq!(cfg.attestation.scheme, AttestationScheme::Enclave);
        assert_eq!(cfg.attestation.enclave.mr_enclave, B256::repeat_byte(0xe1));
        assert_eq!(cfg.attestation.enclave.mr_signer, B256::repeat_byte(0x51));
    }

    #[test]
    fn enclave_attestation_requires_measurements() {
        let key = format!("0x{}", "42".repeat(32));
        let mut vars: Vec<_> = enclave_env()
            .into_iter()
            .filter(|(k, _)| !k.starts_with("MR_"))
            .collect();
        vars.push(("VEILBATCH_MODE", "production".into()));
        vars.push(("COFHE_SIGNER_PRIVATE_KEY", key));
        vars.push(("SWAP_HANDLER_ADDRESS", format!("0x{}", "11".repeat(20))));

        let msg = load_owned(&vars).unwrap_err().to_string();
        assert!(msg.contains("MR_ENCLAVE_PUBLIC"), "{msg}");
        assert!(msg.contains("MR_SIGNER_PUBLIC"), "{msg}");

        // One missing measurement is enough to refuse.
        let partial: Vec<_> = enclave_env()
            .into_iter()
            .filter(|(k, _)| *k != "MR_SIGNER_PUBLIC")
            .collect();
        let msg = load_owned(&partial).unwrap_err().to_string();
        assert!(msg.contains("MR_SIGNER_PUBLIC"), "{msg}");
        assert!(!msg.contains("MR_ENCLAVE_PUBLIC"), "{msg}");
    }

    #[test]
    fn hmac_attestation_does_not_need_measurements() {
        let cfg = load(&[("MNEMONIC", "hmac-secret")]).unwrap();
        assert_eq!(cfg.attestation.enclave, EnclaveIdentity::default());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("MNEMONIC", "   "), ("EXPRESS_HOST", "")]).unwrap();
        assert!(cfg.attestation.secret.is_none());
        assert_eq!(cfg.server.host, "0.0.0.0");
    }
}
