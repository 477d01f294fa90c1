//! Batch request validation.
//!
//! Turns an untyped JSON body into a [`BatchRequest`]. Nothing downstream
//! runs until this succeeds, and every problem is reported at once as a
//! `{path, message}` issue rather than stopping at the first.
//!
//! ## Rules
//!
//! - `poolId`: `0x` + 64 hex digits
//! - `batchId`: `0x` + at least one hex digit
//! - `strategyParams.baseSpreadBps`: integer in `0..=10000`
//! - `strategyParams.inventorySkewBps`: integer in `-5000..=5000`
//! - exactly one of `orders` (non-empty) or the
//!   `encryptedToken0Volume`/`encryptedToken1Volume` pair (≥ 4 chars each,
//!   `0x` hex or base64)
//! - the pre-aggregated form also needs `metadata.oraclePrice > 0` and
//!   `metadata.timestamp > 0`

use std::str::FromStr;

use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use veilbatch_sealing::ciphertext_payload;
use veilbatch_types::constants::{
    MAX_INVENTORY_SKEW_BPS, MAX_SPREAD_BPS, MIN_ENCRYPTED_VOLUME_LEN, MIN_INVENTORY_SKEW_BPS,
};
use veilbatch_types::{
    Address, BatchId, BatchInput, BatchRequest, PoolId, RequestMetadata, Result, SchemaIssue,
    StrategyParams, SwapOrder, VeilBatchError, is_prefixed_hex_of_len,
};

const INVALID_HEX: &str = "Invalid hex string";

/// Validate a raw request body.
///
/// # Errors
/// [`VeilBatchError::SchemaViolation`] listing every issue found.
pub fn validate_batch(body: &Value) -> Result<BatchRequest> {
    let mut v = Validator::default();

    let Some(obj) = body.as_object() else {
        v.issue("", format!("Expected object, received {}", kind(body)));
        return Err(v.into_error());
    };

    let pool_id = v
        .required_str(obj, "poolId", "poolId")
        .and_then(|s| v.parse_or(s, "poolId", INVALID_HEX));
    let batch_id = v
        .required_str(obj, "batchId", "batchId")
        .and_then(|s| v.parse_or(s, "batchId", INVALID_HEX));

    let strategy_params = match v.optional_object(obj, "strategyParams", "strategyParams") {
        Some(params) => StrategyParams {
            base_spread_bps: v
                .optional_int(
                    params,
                    "baseSpreadBps",
                    "strategyParams.baseSpreadBps",
                    0,
                    i64::from(MAX_SPREAD_BPS),
                )
                .and_then(|n| u32::try_from(n).ok()),
            inventory_skew_bps: v.optional_int(
                params,
                "inventorySkewBps",
                "strategyParams.inventorySkewBps",
                MIN_INVENTORY_SKEW_BPS,
                MAX_INVENTORY_SKEW_BPS,
            ),
        },
        None => StrategyParams::default(),
    };

    let metadata_obj = v.optional_object(obj, "metadata", "metadata");
    let metadata = match metadata_obj {
        Some(meta) => RequestMetadata {
            oracle_price: v.optional_decimal(meta, "oraclePrice", "metadata.oraclePrice"),
            timestamp: v
                .optional_int(meta, "timestamp", "metadata.timestamp", 0, i64::MAX)
                .and_then(|n| u64::try_from(n).ok()),
            pyth_confidence_bps: v.optional_int(
                meta,
                "pythConfidenceBps",
                "metadata.pythConfidenceBps",
                i64::MIN,
                i64::MAX,
            ),
        },
        None => RequestMetadata::default(),
    };

    let has_orders = present(obj, "orders");
    let has_volumes =
        present(obj, "encryptedToken0Volume") || present(obj, "encryptedToken1Volume");

    let input = match (has_orders, has_volumes) {
        (true, true) => {
            v.issue(
                "",
                "Provide either orders or encryptedToken0Volume/encryptedToken1Volume, not both",
            );
            None
        }
        (false, true) => {
            let token0 = v.encrypted_volume(obj, "encryptedToken0Volume");
            let token1 = v.encrypted_volume(obj, "encryptedToken1Volume");
            v.require_sealed_metadata(metadata_obj.is_some(), &metadata);
            token0.zip(token1).map(|(t0, t1)| BatchInput::PreAggregated {
                encrypted_token0_volume: t0,
                encrypted_token1_volume: t1,
            })
        }
        _ => v.orders(obj).map(BatchInput::Orders),
    };

    if !v.issues.is_empty() {
        return Err(v.into_error());
    }
    match (pool_id, batch_id, input) {
        (Some(pool_id), Some(batch_id), Some(input)) => Ok(BatchRequest {
            pool_id,
            batch_id,
            strategy_params,
            metadata,
            input,
        }),
        _ => Err(VeilBatchError::Internal(
            "validation produced no value and no issue".into(),
        )),
    }
}

#[derive(Default)]
struct Validator {
    issues: Vec<SchemaIssue>,
}

impl Validator {
    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(SchemaIssue::new(path, message));
    }

    fn into_error(self) -> VeilBatchError {
        VeilBatchError::SchemaViolation {
            issues: self.issues,
        }
    }

    fn parse_or<T: FromStr>(&mut self, raw: &str, path: &str, message: &str) -> Option<T> {
        raw.parse().map_err(|_| self.issue(path, message)).ok()
    }

    fn required_str<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a str> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.issue(path, "Required");
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                self.issue(path, format!("Expected string, received {}", kind(other)));
                None
            }
        }
    }

    fn optional_object<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Object(inner)) => Some(inner),
            Some(other) => {
                self.issue(path, format!("Expected object, received {}", kind(other)));
                None
            }
        }
    }

    fn optional_int(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
        min: i64,
        max: i64,
    ) -> Option<i64> {
        let value = obj.get(key).filter(|v| !v.is_null())?;
        let n = match integer(value) {
            Ok(n) => n,
            Err(e) => {
                let message = match e {
                    NotInteger::NotNumber => format!("Expected number, received {}", kind(value)),
                    NotInteger::Fractional => "Expected integer, received float".to_string(),
                    NotInteger::TooLarge => format!("Number must be less than or equal to {max}"),
                    NotInteger::TooSmall => {
                        format!("Number must be greater than or equal to {min}")
                    }
                };
                self.issue(path, message);
                return None;
            }
        };
        if n < min {
            self.issue(path, format!("Number must be greater than or equal to {min}"));
            return None;
        }
        if n > max {
            self.issue(path, format!("Number must be less than or equal to {max}"));
            return None;
        }
        Some(n)
    }

    fn optional_decimal(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<Decimal> {
        let value = obj.get(key).filter(|v| !v.is_null())?;
        let Value::Number(n) = value else {
            self.issue(path, format!("Expected number, received {}", kind(value)));
            return None;
        };
        let raw = n.to_string();
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| self.issue(path, "Number out of range"))
            .ok()
    }

    fn encrypted_volume(&mut self, obj: &Map<String, Value>, key: &str) -> Option<String> {
        let s = self.required_str(obj, key, key)?;
        if s.chars().count() < MIN_ENCRYPTED_VOLUME_LEN {
            self.issue(
                key,
                format!("String must contain at least {MIN_ENCRYPTED_VOLUME_LEN} character(s)"),
            );
            return None;
        }
        if ciphertext_payload(s).is_err() {
            self.issue(key, "Expected 0x-prefixed hex or base64 ciphertext");
            return None;
        }
        Some(s.to_string())
    }

    fn require_sealed_metadata(&mut self, provided: bool, metadata: &RequestMetadata) {
        if !provided {
            self.issue("metadata", "Required");
            return;
        }
        match metadata.oracle_price {
            None => self.issue("metadata.oraclePrice", "Required"),
            Some(p) if p <= Decimal::ZERO => {
                self.issue("metadata.oraclePrice", "Number must be greater than 0");
            }
            Some(_) => {}
        }
        match metadata.timestamp {
            None => self.issue("metadata.timestamp", "Required"),
            Some(0) => self.issue("metadata.timestamp", "Number must be greater than 0"),
            Some(_) => {}
        }
    }

    fn orders(&mut self, obj: &Map<String, Value>) -> Option<Vec<SwapOrder>> {
        let items = match obj.get("orders") {
            None | Some(Value::Null) => {
                self.issue("orders", "Required");
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.issue("orders", format!("Expected array, received {}", kind(other)));
                return None;
            }
        };
        if items.is_empty() {
            self.issue("orders", "Array must contain at least 1 element(s)");
            return None;
        }

        let before = self.issues.len();
        let orders: Vec<SwapOrder> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.order(item, &format!("orders.{i}")))
            .collect();
        (self.issues.len() == before).then_some(orders)
    }

    fn order(&mut self, item: &Value, path: &str) -> Option<SwapOrder> {
        let Some(obj) = item.as_object() else {
            self.issue(path, format!("Expected object, received {}", kind(item)));
            return None;
        };

        let sender = self.address(obj, "sender", path);
        let token_in = self.address(obj, "tokenIn", path);
        let token_out = self.address(obj, "tokenOut", path);

        let zero_for_one = match obj.get("zeroForOne") {
            Some(Value::Bool(b)) => Some(*b),
            None | Some(Value::Null) => {
                self.issue(format!("{path}.zeroForOne"), "Required");
                None
            }
            Some(other) => {
                self.issue(
                    format!("{path}.zeroForOne"),
                    format!("Expected boolean, received {}", kind(other)),
                );
                None
            }
        };

        let amount_path = format!("{path}.amountSpecified");
        let amount_specified = self
            .required_str(obj, "amountSpecified", &amount_path)
            .and_then(|s| match parse_signed_integer(s) {
                Some(n) => Some(n),
                None => {
                    self.issue(&amount_path, "Expected base-10 integer string");
                    None
                }
            });

        Some(SwapOrder {
            sender: sender?,
            zero_for_one: zero_for_one?,
            amount_specified: amount_specified?,
            token_in: token_in?,
            token_out: token_out?,
        })
    }

    fn address(&mut self, obj: &Map<String, Value>, key: &str, parent: &str) -> Option<Address> {
        let path = format!("{parent}.{key}");
        let s = self.required_str(obj, key, &path)?;
        if !is_prefixed_hex_of_len(s, 40) {
            self.issue(path, INVALID_HEX);
            return None;
        }
        s.parse().ok()
    }
}

fn present(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(|v| !v.is_null())
}

/// Why a JSON value is not a usable `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotInteger {
    NotNumber,
    Fractional,
    TooLarge,
    TooSmall,
}

/// Integral JSON number, including floats with no fractional part.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integer(value: &Value) -> std::result::Result<i64, NotInteger> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    let Value::Number(n) = value else {
        return Err(NotInteger::NotNumber);
    };
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.is_u64() {
        return Err(NotInteger::TooLarge);
    }
    let f = n.as_f64().ok_or(NotInteger::NotNumber)?;
    if f.fract() != 0.0 {
        return Err(NotInteger::Fractional);
    }
    if f > MAX_SAFE {
        Err(NotInteger::TooLarge)
    } else if f < -MAX_SAFE {
        Err(NotInteger::TooSmall)
    } else {
        Ok(f as i64)
    }
}

fn parse_signed_integer(s: &str) -> Option<BigInt> {
    let digits = s.strip_prefix('-').or_else(|| s.strip_prefix('+')).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigInt::from_str(s).ok()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_order() -> Value {
        json!({
            "sender": format!("0x{}", "22".repeat(20)),
            "zeroForOne": true,
            "amountSpecified": "-100000000000000000",
            "tokenIn": format!("0x{}", "33".repeat(20)),
            "tokenOut": format!("0x{}", "44".repeat(20)),
        })
    }

    fn valid_body() -> Value {
        json!({
            "poolId": format!("0x{}", "11".repeat(32)),
            "batchId": "0x01",
            "orders": [valid_order()],
        })
    }

    fn issues(body: &Value) -> Vec<SchemaIssue> {
        match validate_batch(body).unwrap_err() {
            VeilBatchError::SchemaViolation { issues } => issues,
            other => panic!("expected schema violation, got {other}"),
        }
    }

    fn paths(body: &Value) -> Vec<String> {
        issues(body).into_iter().map(|i| i.path).collect()
    }

    #[test]
    fn accepts_reference_batch() {
        let req = validate_batch(&valid_body()).unwrap();
        assert_eq!(req.batch_id.as_str(), "0x01");
        assert_eq!(req.strategy_params, StrategyParams::default());
        let BatchInput::Orders(orders) = req.input else {
            panic!("expected orders");
        };
        assert_eq!(orders.len(), 1);
        assert!(orders[0].zero_for_one);
        assert_eq!(orders[0].amount_specified, BigInt::from(-100_000_000_000_000_000_i64));
    }

    #[test]
    fn empty_and_non_object_bodies() {
        for body in [Value::Null, json!([]), json!("x"), json!(1)] {
            let found = issues(&body);
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].path, "");
        }
    }

    #[test]
    fn empty_object_reports_every_required_field() {
        let found = paths(&json!({}));
        assert_eq!(found, vec!["poolId", "batchId", "orders"]);
    }

    #[test]
    fn bad_ids() {
        let mut body = valid_body();
        body["poolId"] = json!("0x1234");
        body["batchId"] = json!("0x");
        assert_eq!(paths(&body), vec!["poolId", "batchId"]);

        body["poolId"] = json!(42);
        body["batchId"] = json!("01");
        let found = issues(&body);
        assert_eq!(found[0].message, "Expected string, received number");
        assert_eq!(found[1].message, INVALID_HEX);
    }

    #[test]
    fn strategy_bounds() {
        let mut body = valid_body();
        body["strategyParams"] = json!({ "baseSpreadBps": 10_001, "inventorySkewBps": -5_001 });
        assert_eq!(
            paths(&body),
            vec!["strategyParams.baseSpreadBps", "strategyParams.inventorySkewBps"]
        );

        body["strategyParams"] = json!({ "baseSpreadBps": 12.5 });
        assert_eq!(issues(&body)[0].message, "Expected integer, received float");

        body["strategyParams"] = json!({ "baseSpreadBps": 10_000, "inventorySkewBps": 5_000 });
        let req = validate_batch(&body).unwrap();
        assert_eq!(req.strategy_params.base_spread_bps, Some(10_000));
        assert_eq!(req.strategy_params.inventory_skew_bps, Some(5_000));

        body["strategyParams"] = json!({ "baseSpreadBps": 0, "inventorySkewBps": -5_000 });
        assert!(validate_batch(&body).is_ok());
    }

    #[test]
    fn empty_orders_rejected() {
        let mut body = valid_body();
        body["orders"] = json!([]);
        let found = issues(&body);
        assert_eq!(found[0].path, "orders");
        assert!(found[0].message.contains("at least 1"));
    }

    #[test]
    fn order_fields_have_indexed_paths() {
        let mut body = valid_body();
        let mut bad = valid_order();
        bad["sender"] = json!("0xnothex");
        bad["zeroForOne"] = json!("yes");
        bad["amountSpecified"] = json!("1.5");
        bad.as_object_mut().unwrap().remove("tokenOut");
        body["orders"] = json!([valid_order(), bad]);
        assert_eq!(
            paths(&body),
            vec![
                "orders.1.sender",
                "orders.1.tokenOut",
                "orders.1.zeroForOne",
                "orders.1.amountSpecified"
            ]
        );
    }

    #[test]
    fn amount_must_be_plain_integer() {
        for amount in ["", "-", "1e18", "0x10", " 5", "1_000"] {
            assert!(parse_signed_integer(amount).is_none(), "{amount:?}");
        }
        assert_eq!(parse_signed_integer("+7"), Some(BigInt::from(7)));
        assert_eq!(parse_signed_integer("-0"), Some(BigInt::from(0)));
    }

    #[test]
    fn metadata_is_parsed() {
        let mut body = valid_body();
        body["metadata"] = json!({ "timestamp": 1_730_000_000, "oraclePrice": 2000.5 });
        let req = validate_batch(&body).unwrap();
        assert_eq!(req.metadata.timestamp, Some(1_730_000_000));
        assert_eq!(req.metadata.oracle_price, Some(Decimal::new(20_005, 1)));

        body["metadata"] = json!({ "timestamp": -1 });
        assert_eq!(paths(&body), vec!["metadata.timestamp"]);
    }

    #[test]
    fn pre_aggregated_batch() {
        let body = json!({
            "poolId": format!("0x{}", "11".repeat(32)),
            "batchId": "0xab",
            "encryptedToken0Volume": "0xdeadbeef",
            "encryptedToken1Volume": "3q2+7w==",
            "metadata": { "oraclePrice": 2000, "timestamp": 1_730_000_000 },
        });
        let req = validate_batch(&body).unwrap();
        assert_eq!(req.input.order_count(), 0);
        assert!(matches!(req.input, BatchInput::PreAggregated { .. }));
    }

    #[test]
    fn pre_aggregated_needs_metadata_and_length() {
        let body = json!({
            "poolId": format!("0x{}", "11".repeat(32)),
            "batchId": "0xab",
            "encryptedToken0Volume": "0x1",
            "encryptedToken1Volume": "abcd",
        });
        assert_eq!(paths(&body), vec!["encryptedToken0Volume", "metadata"]);

        let body = json!({
            "poolId": format!("0x{}", "11".repeat(32)),
            "batchId": "0xab",
            "encryptedToken0Volume": "abcd",
            "encryptedToken1Volume": "abcd",
            "metadata": { "oraclePrice": 0, "timestamp": 0 },
        });
        assert_eq!(paths(&body), vec!["metadata.oraclePrice", "metadata.timestamp"]);
    }

    #[test]
    fn undecodable_ciphertexts_are_rejected() {
        let body = json!({
            "poolId": format!("0x{}", "11".repeat(32)),
            "batchId": "0xab",
            "encryptedToken0Volume": "0xzz12",
            "encryptedToken1Volume": "!!!!",
            "metadata": { "oraclePrice": 2000, "timestamp": 1_730_000_000 },
        });
        let found = issues(&body);
        assert_eq!(
            found.iter().map(|i| i.path.as_str()).collect::<Vec<_>>(),
            vec!["encryptedToken0Volume", "encryptedToken1Volume"]
        );
        assert!(found.iter().all(|i| i.message.contains("base64")));
    }

    #[test]
    fn huge_integers_are_out_of_range() {
        let mut body = valid_body();
        body["metadata"] = json!({ "timestamp": u64::MAX });
        let found = issues(&body);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "metadata.timestamp");
        assert!(
            found[0].message.starts_with("Number must be less than or equal to"),
            "{}",
            found[0].message
        );

        let mut body = valid_body();
        body["strategyParams"] = json!({ "inventorySkewBps": -1e300 });
        let found = issues(&body);
        assert_eq!(found[0].message, "Number must be greater than or equal to -5000");

        let mut body = valid_body();
        body["strategyParams"] = json!({ "baseSpreadBps": 12.5 });
        assert_eq!(issues(&body)[0].message, "Expected integer, received float");
    }

    #[test]
    fn integral_floats_are_integers() {
        assert_eq!(integer(&json!(35.0)), Ok(35));
        assert_eq!(integer(&json!(u64::MAX)), Err(NotInteger::TooLarge));
        assert_eq!(integer(&json!(1e30)), Err(NotInteger::TooLarge));
        assert_eq!(integer(&json!(-1e30)), Err(NotInteger::TooSmall));
        assert_eq!(integer(&json!("7")), Err(NotInteger::NotNumber));
    }

    #[test]
    fn orders_and_volumes_are_exclusive() {
        let mut body = valid_body();
        body["encryptedToken0Volume"] = json!("abcd");
        assert_eq!(paths(&body), vec![""]);
    }
}
