mod error;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

use crate::auth::{SessionStore, SteamClient};
use crate::backpack::BackpackClient;
use crate::config::ServerConfig;
use crate::logging;

pub use error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShutdownSignal {
    None,
    Graceful,
}

/// Shared handler state; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    backpack: Option<BackpackClient>,
    steam: SteamClient,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .context("failed to build upstream HTTP client")?;

        let backpack = config.backpack_api_key.as_ref().map(|key| {
            BackpackClient::new(http.clone(), config.backpack_base_url.clone(), key.clone())
        });
        let steam = SteamClient::new(
            http,
            config.steam_openid_url.clone(),
            config.steam_api_base_url.clone(),
            config.steam_api_key.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            backpack,
            steam,
            sessions: SessionStore::default(),
        })
    }

    fn backpack_client(&self) -> Result<&BackpackClient, ApiError> {
        self.backpack.as_ref().ok_or_else(|| {
            logging::error(
                "config.missing_key",
                "BACKPACK_TF_API_KEY is not set",
                json!({}),
            );
            ApiError::Configuration
        })
    }
}

#[derive(Clone)]
struct CorsOrigin(HeaderValue);

pub fn router(state: AppState) -> Result<Router> {
    let origin = HeaderValue::from_str(state.config.frontend_origin())
        .with_context(|| format!("invalid frontend origin {:?}", state.config.frontend_url))?;

    Ok(Router::new()
        .route("/api/prices", get(routes::current_prices))
        .route("/api/prices/history", get(routes::price_history))
        .route("/api/items/search", get(routes::search_items))
        .route("/api/auth/steam/login", get(routes::steam_login))
        .route("/api/auth/steam/callback", get(routes::steam_callback))
        .route("/api/auth/session", get(routes::current_session))
        .route("/api/auth/logout", post(routes::logout))
        .with_state(state)
        .layer(middleware::from_fn_with_state(CorsOrigin(origin), cors)))
}

async fn cors(State(origin): State<CorsOrigin>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    apply_cors_headers(response.headers_mut(), &origin.0);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(VARY, HeaderValue::from_static("Origin"));
}

/// Serve the API on `config.bind_addr` until SIGINT or SIGTERM.
pub async fn run_with_config(config: ServerConfig) -> Result<()> {
    let addr = config.bind_addr;
    if config.backpack_api_key.is_none() {
        logging::warn(
            "config.missing_key",
            "BACKPACK_TF_API_KEY is not set; price routes will fail",
            json!({}),
        );
    }

    let app = router(AppState::new(config)?)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind price API at {addr}"))?;

    logging::info(
        "server.bind",
        "Price API listening",
        json!({ "addr": addr.to_string() }),
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(ShutdownSignal::None);
    let signals_task = tokio::spawn(handle_signals(shutdown_tx));

    let shutdown = async move {
        loop {
            if shutdown_rx.changed().await.is_err() {
                // Signal handling failed to start; keep serving until aborted.
                std::future::pending::<()>().await;
            }
            if !matches!(*shutdown_rx.borrow(), ShutdownSignal::None) {
                break;
            }
        }
    };

    let result = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("price API terminated with error");

    signals_task.abort();
    let _ = signals_task.await;

    logging::info_simple("server.stop", "Price API stopped");
    result
}

async fn handle_signals(shutdown_tx: watch::Sender<ShutdownSignal>) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    logging::info(
        "signal.received",
        "Shutdown signal received, draining connections",
        json!({ "signal": name }),
    );
    let _ = shutdown_tx.send(ShutdownSignal::Graceful);
    Ok(())
}
