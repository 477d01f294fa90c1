//! Settlement model: the net flow of a batch and the settlement record
//! derived from it.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{BatchId, PoolId, Result};

/// Signed net flow of both pool tokens for one batch.
///
/// Positive values flow into the pool. When derived purely from orders,
/// `token0 == -token1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NetFlow {
    pub token0: BigInt,
    pub token1: BigInt,
}

impl NetFlow {
    #[must_use]
    pub fn new(token0: BigInt, token1: BigInt) -> Self {
        Self { token0, token1 }
    }

    /// `true` when the two sides cancel out.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        (&self.token0 + &self.token1).is_zero()
    }

    /// Absolute value of the token0 side.
    #[must_use]
    pub fn token0_magnitude(&self) -> BigUint {
        self.token0.magnitude().clone()
    }

    /// Absolute value of the token1 side.
    #[must_use]
    pub fn token1_magnitude(&self) -> BigUint {
        self.token1.magnitude().clone()
    }
}

/// Final settlement for one batch. Created once per pipeline run.
///
/// Signers never hash the declaration order; see [`Self::canonical_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSettlement {
    pub pool_id: PoolId,
    pub batch_id: BatchId,
    /// Q96 fixed-point square root of the gross price, serialized as `0x` hex.
    #[serde(rename = "sqrtPriceX96")]
    pub sqrt_price_x96: U256,
    /// Signed token0 flow as a base-10 string.
    pub token0_flow: String,
    /// Signed token1 flow as a base-10 string.
    pub token1_flow: String,
    /// Unix seconds after which the settlement is void.
    pub deadline: u64,
}

impl BatchSettlement {
    /// Canonical byte form: JSON with lexicographically sorted keys.
    pub fn canonical_json(&self) -> Result<String> {
        // Flat record; a BTreeMap sorts keys whatever serde_json's map flavour is.
        let sorted: BTreeMap<String, serde_json::Value> =
            serde_json::from_value(serde_json::to_value(self)?)?;
        Ok(serde_json::to_string(&sorted)?)
    }

    /// Parse the token flows back into integers.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn net_flow(&self) -> Option<NetFlow> {
        Some(NetFlow::new(
            self.token0_flow.parse().ok()?,
            self.token1_flow.parse().ok()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_settlement() -> BatchSettlement {
        BatchSettlement {
            pool_id: format!("0x{}", "11".repeat(32)).parse().unwrap(),
            batch_id: "0x01".parse().unwrap(),
            sqrt_price_x96: U256::from(0x1234_u64),
            token0_flow: "100".into(),
            token1_flow: "-100".into(),
            deadline: 1_730_000_300,
        }
    }

    #[test]
    fn conservation_detects_imbalance() {
        let ok = NetFlow::new(BigInt::from(5), BigInt::from(-5));
        assert!(ok.is_conserved());
        let bad = NetFlow::new(BigInt::from(5), BigInt::from(-4));
        assert!(!bad.is_conserved());
        assert!(NetFlow::default().is_conserved());
    }

    #[test]
    fn magnitudes_drop_sign() {
        let flow = NetFlow::new(BigInt::from(-7), BigInt::from(7));
        assert_eq!(flow.token0_magnitude(), BigUint::from(7u32));
        assert_eq!(flow.token1_magnitude(), BigUint::from(7u32));
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(make_settlement()).unwrap();
        assert_eq!(json["poolId"], format!("0x{}", "11".repeat(32)));
        assert_eq!(json["batchId"], "0x01");
        assert_eq!(json["sqrtPriceX96"], "0x1234");
        assert_eq!(json["token0Flow"], "100");
        assert_eq!(json["token1Flow"], "-100");
        assert_eq!(json["deadline"], 1_730_000_300);
    }

    #[test]
    fn canonical_json_has_sorted_keys() {
        let canonical = make_settlement().canonical_json().unwrap();
        let keys = ["batchId", "deadline", "poolId", "sqrtPriceX96", "token0Flow", "token1Flow"];
        let positions: Vec<usize> = keys.iter().map(|k| canonical.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{canonical}");
    }

    #[test]
    fn canonical_json_is_stable() {
        let s = make_settlement();
        assert_eq!(s.canonical_json().unwrap(), s.clone().canonical_json().unwrap());
    }

    #[test]
    fn net_flow_parses_back() {
        let flow = make_settlement().net_flow().unwrap();
        assert!(flow.is_conserved());
        assert_eq!(flow.token0, BigInt::from(100));
    }
}
