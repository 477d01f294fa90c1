//! Pyth oracle client (Hermes HTTP).
//!
//! Fetches the latest update for one feed via
//! `GET {hermes}/v2/updates/price/latest?ids[]={feed}` and converts the
//! Pyth integer representation (`price`, `conf`, `expo`) to exact decimals.
//! The signed update blobs are passed through so callers can post them
//! on-chain next to the settlement.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use veilbatch_types::{B256, OracleConfig, OraclePrice, Result, VeilBatchError};

use crate::pipeline::PriceOracle;

const SERVICE: &str = "pyth";

#[derive(Debug, Deserialize)]
pub struct HermesLatestResponse {
    #[serde(default)]
    pub binary: Option<HermesBinary>,
    #[serde(default)]
    pub parsed: Vec<HermesParsedUpdate>,
}

#[derive(Debug, Deserialize)]
pub struct HermesBinary {
    #[serde(default)]
    pub data: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HermesParsedUpdate {
    pub id: String,
    pub price: HermesPrice,
}

#[derive(Debug, Deserialize)]
pub struct HermesPrice {
    pub price: String,
    pub conf: String,
    pub expo: i32,
    pub publish_time: i64,
}

/// Hermes client bound to a single price feed.
#[derive(Debug, Clone)]
pub struct HermesOracle {
    http: reqwest::Client,
    base_url: String,
    feed_id: B256,
}

impl HermesOracle {
    #[must_use]
    pub fn new(http: reqwest::Client, config: &OracleConfig) -> Self {
        Self {
            http,
            base_url: config.hermes_url.trim_end_matches('/').to_string(),
            feed_id: config.feed_id,
        }
    }

    fn latest_url(&self) -> String {
        format!(
            "{}/v2/updates/price/latest?ids[]={}",
            self.base_url,
            hex_feed_id(&self.feed_id)
        )
    }

    async fn fetch(&self) -> Result<OraclePrice> {
        let url = self.latest_url();
        tracing::debug!(%url, "fetching oracle price");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| VeilBatchError::upstream(SERVICE, format!("hermes fetch failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VeilBatchError::upstream(
                SERVICE,
                format!("hermes returned HTTP {status}: {body}"),
            ));
        }

        let latest: HermesLatestResponse = resp
            .json()
            .await
            .map_err(|e| VeilBatchError::upstream(SERVICE, format!("hermes decode failed: {e}")))?;
        oracle_price_from(latest)
    }
}

#[async_trait]
impl PriceOracle for HermesOracle {
    async fn latest_price(&self) -> Result<OraclePrice> {
        self.fetch().await
    }
}

/// Convert a Hermes response into an [`OraclePrice`].
///
/// # Errors
/// [`VeilBatchError::UpstreamUnavailable`] when the response carries no
/// feed, a malformed number, a non-positive price or a bad publish time.
pub fn oracle_price_from(latest: HermesLatestResponse) -> Result<OraclePrice> {
    let update = latest
        .parsed
        .into_iter()
        .next()
        .ok_or_else(|| VeilBatchError::upstream(SERVICE, "no Pyth price data available"))?;
    let raw = update.price;

    let price = scale_pyth(&raw.price, raw.expo)?;
    let confidence = scale_pyth(&raw.conf, raw.expo)?;

    if price <= Decimal::ZERO {
        return Err(VeilBatchError::upstream(
            SERVICE,
            format!("oracle price must be > 0, got {price}"),
        ));
    }
    let timestamp = u64::try_from(raw.publish_time)
        .ok()
        .filter(|t| *t > 0)
        .ok_or_else(|| {
            VeilBatchError::upstream(
                SERVICE,
                format!("invalid publish_time {}", raw.publish_time),
            )
        })?;

    let price_update_data = latest.binary.map(|b| {
        b.data
            .into_iter()
            .map(|blob| {
                if blob.starts_with("0x") {
                    blob
                } else {
                    format!("0x{blob}")
                }
            })
            .collect()
    });

    Ok(OraclePrice {
        price,
        confidence,
        timestamp,
        price_update_data,
    })
}

/// `mantissa × 10^expo`, exactly.
fn scale_pyth(mantissa: &str, expo: i32) -> Result<Decimal> {
    let bad = || VeilBatchError::upstream(SERVICE, format!("malformed value {mantissa}e{expo}"));
    let m: i64 = mantissa.trim().parse().map_err(|_| bad())?;

    if expo <= 0 {
        Decimal::try_from_i128_with_scale(i128::from(m), expo.unsigned_abs()).map_err(|_| bad())
    } else {
        let factor = u32::try_from(expo)
            .ok()
            .and_then(|e| 10_i64.checked_pow(e))
            .ok_or_else(bad)?;
        Decimal::from(m).checked_mul(Decimal::from(factor)).ok_or_else(bad)
    }
}

fn hex_feed_id(feed_id: &B256) -> String {
    format!("0x{}", hex::encode(feed_id))
}
