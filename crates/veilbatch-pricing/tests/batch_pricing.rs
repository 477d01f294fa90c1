//! Netting → conservation → pricing across randomized batches.

use num_bigint::BigInt;
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use veilbatch_pricing::{
    PricingInput, SettlementPricer, aggregate_orders, clamp_spread_bps, settlement_fingerprint,
    verify_flow_conservation,
};
use veilbatch_types::*;

fn pool() -> PoolId {
    format!("0x{}", "5a".repeat(32)).parse().unwrap()
}

#[test]
fn random_batches_always_conserve_flow() {
    for size in [1, 2, 10, 250] {
        let orders = SwapOrder::random_batch(size);
        let flow = aggregate_orders(&orders);
        verify_flow_conservation(&flow).unwrap();
    }
}

#[test]
fn shuffled_batch_prices_identically() {
    let pool = pool();
    let batch: BatchId = "0xfeed".parse().unwrap();
    let pricer = SettlementPricer::new(35);

    let mut orders = SwapOrder::random_batch(64);
    let price_of = |orders: &[SwapOrder]| {
        let flow = aggregate_orders(orders);
        let input = PricingInput {
            pool_id: &pool,
            batch_id: &batch,
            flow: &flow,
            params: StrategyParams::default(),
            oracle_price: Decimal::new(2000, 0),
            timestamp: 1_730_000_000,
        };
        pricer.price(&input).unwrap().settlement
    };

    let before = price_of(&orders);
    orders.shuffle(&mut rand::thread_rng());
    let after = price_of(&orders);

    assert_eq!(before, after);
    assert_eq!(
        settlement_fingerprint(&before).unwrap(),
        settlement_fingerprint(&after).unwrap()
    );
}

#[test]
fn settlement_flows_round_trip_through_strings() {
    let orders = SwapOrder::random_batch(32);
    let flow = aggregate_orders(&orders);
    let pool = pool();
    let batch: BatchId = "0x1".parse().unwrap();
    let input = PricingInput {
        pool_id: &pool,
        batch_id: &batch,
        flow: &flow,
        params: StrategyParams::default(),
        oracle_price: Decimal::new(1, 0),
        timestamp: 0,
    };
    let settlement = SettlementPricer::default().price(&input).unwrap().settlement;
    let parsed = settlement.net_flow().unwrap();
    assert_eq!(parsed, flow);
    assert_eq!(&parsed.token0 + &parsed.token1, BigInt::default());
}

#[test]
fn random_spread_and_skew_stay_in_range() {
    let mut rng = rand::thread_rng();
    for _ in 0..2_000 {
        let base = rng.gen_range(-1_000_000_i64..=1_000_000);
        let skew = rng.gen_range(-1_000_000_i64..=1_000_000);
        let spread = clamp_spread_bps(base, skew);
        assert!(spread <= 10_000, "base={base} skew={skew} spread={spread}");
    }
    assert_eq!(clamp_spread_bps(i64::MAX, i64::MAX), 10_000);
    assert_eq!(clamp_spread_bps(i64::MIN, i64::MIN), 0);
}
