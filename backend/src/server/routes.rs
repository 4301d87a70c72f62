use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{bearer_token, login_redirect_url};
use crate::backpack::UpstreamError;
use crate::history::{cutoff_for, filter_points};
use crate::logging;
use crate::types::{CurrentPrices, PriceHistory, Session};

use super::{ApiError, AppState};

pub(super) async fn current_prices(
    State(state): State<AppState>,
) -> Result<Json<CurrentPrices>, ApiError> {
    let backpack = state.backpack_client()?;

    let quote = backpack.currencies().await.map_err(|err| {
        logging::error(
            "prices.upstream_error",
            "Failed to load currencies from backpack.tf",
            json!({ "error": err.to_string() }),
        );
        match err {
            UpstreamError::Rejected(_) => ApiError::Upstream("Error fetching prices".into()),
            UpstreamError::Http(_) => ApiError::Upstream("Internal server error".into()),
        }
    })?;

    Ok(Json(CurrentPrices::new(
        quote.key_price_in_ref,
        quote.ref_price_in_usd,
        Utc::now(),
    )))
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    item: Option<String>,
    quality: Option<String>,
    timeframe: Option<String>,
}

pub(super) async fn price_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<PriceHistory>, ApiError> {
    let backpack = state.backpack_client()?;

    let item = query.item.filter(|item| !item.is_empty());
    let quality = query.quality.filter(|quality| !quality.is_empty());
    let (Some(item), Some(quality)) = (item, quality) else {
        return Err(ApiError::BadRequest(
            "Missing item or quality parameter".into(),
        ));
    };

    let history = backpack
        .price_history(&item, &quality)
        .await
        .map_err(|err| {
            logging::error(
                "history.upstream_error",
                "Failed to load price history from backpack.tf",
                json!({ "item": item, "quality": quality, "error": err.to_string() }),
            );
            match err {
                UpstreamError::Rejected(message) => {
                    ApiError::Upstream(format!("Error fetching price history: {message}"))
                }
                UpstreamError::Http(_) => ApiError::Upstream("Error fetching price history".into()),
            }
        })?;

    let cutoff = cutoff_for(query.timeframe.as_deref(), Utc::now().timestamp());
    Ok(Json(PriceHistory {
        item,
        points: filter_points(history, cutoff),
    }))
}

pub(super) async fn search_items() -> Json<Value> {
    Json(json!({ "message": "Not implemented yet" }))
}

pub(super) async fn steam_login(State(state): State<AppState>) -> Redirect {
    let config = &state.config;
    Redirect::to(&login_redirect_url(
        state.steam.openid_url(),
        &config.callback_url(),
        config.realm(),
    ))
}

pub(super) async fn steam_callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Redirect, ApiError> {
    let callback_url = state.config.callback_url();
    let steam_id = state.steam.verify(&params, &callback_url).await.map_err(|err| {
        logging::warn(
            "auth.verify_failed",
            "Steam sign-in assertion rejected",
            json!({ "error": err.to_string() }),
        );
        ApiError::Unauthorized
    })?;

    let profile = state.steam.player_summary(steam_id).await.map_err(|err| {
        logging::error(
            "auth.profile_error",
            "Failed to load Steam player summary",
            json!({ "steam_id": steam_id, "error": err.to_string() }),
        );
        ApiError::Upstream("Error loading Steam profile".into())
    })?;

    let session = state.sessions.issue(steam_id, profile).await;
    logging::info(
        "auth.signed_in",
        "Steam user signed in",
        json!({ "steam_id": steam_id }),
    );
    Ok(Redirect::to(
        &state.config.session_redirect(&session.access_token),
    ))
}

pub(super) async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Session>, ApiError> {
    let token = request_token(&headers).ok_or(ApiError::Unauthorized)?;
    state
        .sessions
        .get(token)
        .await
        .map(Json)
        .ok_or(ApiError::Unauthorized)
}

pub(super) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = request_token(&headers) {
        state.sessions.revoke(token).await;
    }
    StatusCode::NO_CONTENT
}

fn request_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    )
}
