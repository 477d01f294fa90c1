//! Swap order model.
//!
//! Orders arrive already signed and authorized upstream; VeilBatch only
//! nets them. `amount_specified` follows the pool-manager convention:
//! a negative value is an exact-input amount.

use alloy_primitives::Address;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A single swap order in a batch. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOrder {
    /// The account that signed the order.
    pub sender: Address,
    /// `true` when swapping token0 for token1.
    pub zero_for_one: bool,
    /// Signed amount; negative means exact input.
    #[serde(with = "bigint_string")]
    pub amount_specified: BigInt,
    /// Token sold.
    pub token_in: Address,
    /// Token bought.
    pub token_out: Address,
}

/// Serialize arbitrary-precision integers as base-10 strings.
pub mod bigint_string {
    use std::str::FromStr;

    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &BigInt, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BigInt, D::Error> {
        let raw = String::deserialize(d)?;
        BigInt::from_str(raw.trim()).map_err(D::Error::custom)
    }
}

/// Dummy orders for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl SwapOrder {
    /// Create an order with fixed addresses and the given direction/amount.
    #[must_use]
    pub fn dummy(zero_for_one: bool, amount_specified: i64) -> Self {
        let (token_in, token_out) = if zero_for_one {
            (Address::repeat_byte(0x33), Address::repeat_byte(0x44))
        } else {
            (Address::repeat_byte(0x44), Address::repeat_byte(0x33))
        };
        Self {
            sender: Address::repeat_byte(0x22),
            zero_for_one,
            amount_specified: BigInt::from(amount_specified),
            token_in,
            token_out,
        }
    }

    /// Create `n` orders with random direction and exact-input amounts.
    #[must_use]
    pub fn random_batch(n: usize) -> Vec<Self> {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| {
                let amount: i64 = -rng.gen_range(1..1_000_000_000_000_000_000_i64);
                let mut order = Self::dummy(rng.gen_bool(0.5), amount);
                order.sender = Address::from(rng.r#gen::<[u8; 20]>());
                order
            })
            .collect()
    }
}
