use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One sampled price at one instant (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Body of `GET /api/prices/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub item: String,
    pub points: Vec<PricePoint>,
}

/// Body of `GET /api/prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPrices {
    pub key_price_in_ref: f64,
    #[serde(rename = "refPriceInUSD")]
    pub ref_price_in_usd: f64,
    #[serde(rename = "keyPriceInUSD")]
    pub key_price_in_usd: f64,
    pub last_updated: String,
}

impl CurrentPrices {
    pub fn new(key_price_in_ref: f64, ref_price_in_usd: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            key_price_in_ref,
            ref_price_in_usd,
            key_price_in_usd: key_price_in_ref * ref_price_in_usd,
            last_updated: observed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Signed-in Steam user as exposed to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub steam_id: u64,
    pub name: String,
    pub image: Option<String>,
    pub access_token: String,
}
