//! Settlement fingerprints for cross-run consistency.
//!
//! Two executors pricing the same batch at the same oracle price must
//! produce the same settlement. The fingerprint is a SHA-256 over the
//! canonical JSON form, so operators can compare runs from logs alone
//! without shipping full payloads around.

use sha2::{Digest, Sha256};
use veilbatch_types::{BatchSettlement, Result};

const FINGERPRINT_DOMAIN: &[u8] = b"veilbatch:settlement:v1:";

/// SHA-256 over the domain tag followed by [`BatchSettlement::canonical_json`].
///
/// # Errors
/// Fails only if the settlement cannot be serialized.
pub fn settlement_fingerprint(settlement: &BatchSettlement) -> Result<[u8; 32]> {
    let canonical = settlement.canonical_json()?;
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_DOMAIN);
    hasher.update(canonical.as_bytes());
    Ok(hasher.finalize().into())
}

/// Hex form used in log lines.
#[must_use]
pub fn fingerprint_hex(fingerprint: &[u8; 32]) -> String {
    hex::encode(fingerprint)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    fn make_settlement(token0: &str, token1: &str) -> BatchSettlement {
        BatchSettlement {
            pool_id: format!("0x{}", "ab".repeat(32)).parse().unwrap(),
            batch_id: "0x01".parse().unwrap(),
            sqrt_price_x96: U256::from(1u64) << 96,
            token0_flow: token0.into(),
            token1_flow: token1.into(),
            deadline: 1_730_000_300,
        }
    }

    #[test]
    fn same_settlement_same_fingerprint() {
        let a = settlement_fingerprint(&make_settlement("5", "-5")).unwrap();
        let b = settlement_fingerprint(&make_settlement("5", "-5")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flows_change_fingerprint() {
        let a = settlement_fingerprint(&make_settlement("5", "-5")).unwrap();
        let b = settlement_fingerprint(&make_settlement("-5", "5")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn deadline_changes_fingerprint() {
        let a = make_settlement("1", "-1");
        let mut b = a.clone();
        b.deadline += 1;
        assert_ne!(settlement_fingerprint(&a).unwrap(), settlement_fingerprint(&b).unwrap());
    }

    #[test]
    fn hex_form_is_64_chars() {
        let fp = settlement_fingerprint(&make_settlement("0", "0")).unwrap();
        assert_eq!(fingerprint_hex(&fp).len(), 64);
    }
}
