//! Thin client for the backpack.tf web API.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::constants::TF2_APP_ID;
use crate::types::PricePoint;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream rejected the request: {0}")]
    Rejected(String),
}

/// Currency rates reported by `IGetCurrencies`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyQuote {
    pub key_price_in_ref: f64,
    pub ref_price_in_usd: f64,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct CurrenciesBody {
    success: i32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    currencies: Option<Currencies>,
}

#[derive(Debug, Deserialize)]
struct Currencies {
    keys: Currency,
    refined: Currency,
}

#[derive(Debug, Deserialize)]
struct Currency {
    price: CurrencyPrice,
}

#[derive(Debug, Deserialize)]
struct CurrencyPrice {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    success: i32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    history: Vec<PricePoint>,
}

#[derive(Clone)]
pub struct BackpackClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl BackpackClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub async fn currencies(&self) -> Result<CurrencyQuote, UpstreamError> {
        let app_id = TF2_APP_ID.to_string();
        let envelope: Envelope<CurrenciesBody> = self
            .http
            .get(format!("{}/api/IGetCurrencies/v1", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("appid", app_id.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let body = envelope.response;
        match (body.success, body.currencies) {
            (1, Some(currencies)) => Ok(CurrencyQuote {
                key_price_in_ref: currencies.keys.price.value,
                ref_price_in_usd: currencies.refined.price.value,
            }),
            _ => Err(UpstreamError::Rejected(body.message.unwrap_or_default())),
        }
    }

    /// Full upstream history for one item and quality, in upstream order.
    pub async fn price_history(
        &self,
        item: &str,
        quality: &str,
    ) -> Result<Vec<PricePoint>, UpstreamError> {
        let app_id = TF2_APP_ID.to_string();
        let envelope: Envelope<HistoryBody> = self
            .http
            .get(format!("{}/api/IGetPriceHistory/v1", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("item", item),
                ("quality", quality),
                ("appid", app_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let body = envelope.response;
        if body.success != 1 {
            return Err(UpstreamError::Rejected(body.message.unwrap_or_default()));
        }
        Ok(body.history)
    }
}
