use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{CurrentPrices, PriceHistory, SeriesKind, Timeframe, UNIQUE_QUALITY};

/// Port the pricing API listens on next to the dashboard host.
pub const API_PORT: u16 = 8080;

pub const PRICES_FAILURE: &str = "Failed to fetch current prices.";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Deserialize(String),
}

pub fn history_failure(kind: SeriesKind) -> String {
    format!("Failed to fetch {} price history.", kind.item_name())
}

pub fn api_base_for_host(host: Option<&str>) -> String {
    let host = host.filter(|host| !host.is_empty()).unwrap_or("127.0.0.1");
    format!("http://{host}:{API_PORT}")
}

/// Pricing API base URL for the page currently loaded.
#[cfg(target_arch = "wasm32")]
pub fn resolve_api_base() -> String {
    let host = web_sys::window().and_then(|window| window.location().hostname().ok());
    api_base_for_host(host.as_deref())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn resolve_api_base() -> String {
    api_base_for_host(None)
}

pub fn current_prices_url(base: &str) -> String {
    format!("{}/api/prices", base.trim_end_matches('/'))
}

pub fn history_url(base: &str, item: &str, quality: u8, timeframe: Timeframe) -> String {
    format!(
        "{}/api/prices/history?item={}&quality={quality}&timeframe={}",
        base.trim_end_matches('/'),
        urlencoding::encode(item),
        timeframe.as_query()
    )
}

pub async fn fetch_current_prices(base: &str) -> Result<CurrentPrices, FetchError> {
    get_json(&current_prices_url(base), None).await
}

pub async fn fetch_history(
    base: &str,
    kind: SeriesKind,
    timeframe: Timeframe,
) -> Result<PriceHistory, FetchError> {
    let url = history_url(base, kind.item_name(), UNIQUE_QUALITY, timeframe);
    get_json(&url, None).await
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    url: &str,
    bearer: Option<&str>,
) -> Result<T, FetchError> {
    let response = send(with_bearer(Request::get(url), bearer)).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| FetchError::Deserialize(err.to_string()))
}

pub(crate) fn with_bearer(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.header("Authorization", &format!("Bearer {token}")),
        None => request,
    }
}

/// Send `request`, treating any non-2xx status as an error.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|err| FetchError::Request(err.to_string()))?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }
    Ok(response)
}
