//! Batch netting.
//!
//! Collapses every order of a batch into a single signed flow per token:
//!
//! ```text
//! aggregate_orders(&[SwapOrder]) -> NetFlow
//! ```
//!
//! For each order, with `a = amount_specified`:
//!
//! | direction       | token0 | token1 |
//! |-----------------|--------|--------|
//! | `zero_for_one`  | `-a`   | `+a`   |
//! | `!zero_for_one` | `+a`   | `-a`   |
//!
//! Accumulation uses [`BigInt`], so no batch can overflow it, and since
//! addition commutes the result does not depend on order sequence.

use num_bigint::BigInt;
use veilbatch_types::{NetFlow, SwapOrder};

/// Net all orders of a batch. An empty slice nets to `(0, 0)`.
#[must_use]
pub fn aggregate_orders(orders: &[SwapOrder]) -> NetFlow {
    let mut token0 = BigInt::default();
    let mut token1 = BigInt::default();

    for order in orders {
        let amount = &order.amount_specified;
        if order.zero_for_one {
            token0 -= amount;
            token1 += amount;
        } else {
            token0 += amount;
            token1 -= amount;
        }
    }

    tracing::trace!(orders = orders.len(), %token0, %token1, "batch netted");
    NetFlow::new(token0, token1)
}
