use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tf2_stats::config::ServerConfig;
use tf2_stats::server;
use tf2_stats::types::{CurrentPrices, PriceHistory};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const DAY: i64 = 86_400;
const API_KEY: &str = "test-key";

async fn fake_currencies(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return Json(json!({ "response": { "success": 0, "message": "bad key" } }));
    }
    Json(json!({
        "response": {
            "success": 1,
            "currencies": {
                "keys": { "price": { "value": 72.33, "value_raw": 72.335 } },
                "refined": { "price": { "value": 0.03, "value_raw": 0.0301 } }
            }
        }
    }))
}

async fn fake_history(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("item").map(String::as_str) == Some("Broken Item") {
        return Json(json!({ "response": { "success": 0, "message": "Item not found" } }));
    }
    let now = Utc::now().timestamp();
    Json(json!({
        "response": {
            "success": 1,
            "history": [
                { "value": 70.0, "timestamp": now - 100 * DAY },
                { "value": 71.5, "timestamp": now - 10 * DAY },
                { "value": 72.33, "timestamp": now - DAY }
            ]
        }
    }))
}

async fn start_stack(upstream_port: u16, api_port: u16, api_key: Option<&str>) -> Vec<JoinHandle<()>> {
    let upstream_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), upstream_port);
    let upstream = Router::new()
        .route("/api/IGetCurrencies/v1", get(fake_currencies))
        .route("/api/IGetPriceHistory/v1", get(fake_history));
    let listener = TcpListener::bind(upstream_addr).await.expect("bind upstream");
    let upstream_task = tokio::spawn(async move {
        let _ = axum::serve(listener, upstream.into_make_service()).await;
    });

    let config = ServerConfig {
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), api_port),
        backpack_base_url: format!("http://{upstream_addr}"),
        backpack_api_key: api_key.map(str::to_string),
        upstream_timeout: Duration::from_secs(2),
        ..ServerConfig::default()
    };
    let api_task = tokio::spawn(async move {
        let _ = server::run_with_config(config).await;
    });

    wait_until_listening(api_port).await;
    vec![upstream_task, api_task]
}

async fn wait_until_listening(port: u16) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("price API did not start on port {port}");
}

fn stop(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        task.abort();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn current_prices_come_from_backpack() {
    let tasks = start_stack(9141, 9142, Some(API_KEY)).await;

    let prices: CurrentPrices = reqwest::get("http://127.0.0.1:9142/api/prices")
        .await
        .expect("request")
        .error_for_status()
        .expect("status")
        .json()
        .await
        .expect("body");

    assert_eq!(prices.key_price_in_ref, 72.33);
    assert_eq!(prices.ref_price_in_usd, 0.03);
    assert!((prices.key_price_in_usd - 72.33 * 0.03).abs() < 1e-9);
    assert!(chrono::DateTime::parse_from_rfc3339(&prices.last_updated).is_ok());

    stop(tasks);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn history_is_filtered_by_timeframe() {
    let tasks = start_stack(9143, 9144, Some(API_KEY)).await;
    let client = reqwest::Client::new();
    let url = "http://127.0.0.1:9144/api/prices/history";

    let month: PriceHistory = client
        .get(url)
        .query(&[("item", "Mann Co. Supply Crate Key"), ("quality", "6"), ("timeframe", "30days")])
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");
    assert_eq!(month.item, "Mann Co. Supply Crate Key");
    let values: Vec<f64> = month.points.iter().map(|point| point.value).collect();
    assert_eq!(values, vec![71.5, 72.33]);

    let quarter: PriceHistory = client
        .get(url)
        .query(&[("item", "Refined Metal"), ("quality", "6"), ("timeframe", "1year")])
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");
    assert_eq!(quarter.points.len(), 3);

    let defaulted: PriceHistory = client
        .get(url)
        .query(&[("item", "Refined Metal"), ("quality", "6")])
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");
    assert_eq!(defaulted.points.len(), 2);

    stop(tasks);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn history_rejects_missing_parameters_and_surfaces_upstream_errors() {
    let tasks = start_stack(9145, 9146, Some(API_KEY)).await;
    let client = reqwest::Client::new();
    let url = "http://127.0.0.1:9146/api/prices/history";

    let missing = client
        .get(url)
        .query(&[("item", "Refined Metal")])
        .send()
        .await
        .expect("request");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        missing.text().await.expect("body"),
        "Missing item or quality parameter"
    );

    let rejected = client
        .get(url)
        .query(&[("item", "Broken Item"), ("quality", "6")])
        .send()
        .await
        .expect("request");
    assert_eq!(rejected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        rejected.text().await.expect("body"),
        "Error fetching price history: Item not found"
    );

    stop(tasks);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn current_prices_distinguish_rejection_from_transport_failure() {
    let tasks = start_stack(9159, 9160, Some("wrong-key")).await;

    let rejected = reqwest::get("http://127.0.0.1:9160/api/prices")
        .await
        .expect("request");
    assert_eq!(rejected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rejected.text().await.expect("body"), "Error fetching prices");

    let config = ServerConfig {
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9162),
        // Nothing listens on 9161.
        backpack_base_url: "http://127.0.0.1:9161".into(),
        backpack_api_key: Some(API_KEY.into()),
        upstream_timeout: Duration::from_secs(2),
        ..ServerConfig::default()
    };
    let unreachable_api = tokio::spawn(async move {
        let _ = server::run_with_config(config).await;
    });
    wait_until_listening(9162).await;

    let unreachable = reqwest::get("http://127.0.0.1:9162/api/prices")
        .await
        .expect("request");
    assert_eq!(unreachable.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(unreachable.text().await.expect("body"), "Internal server error");

    unreachable_api.abort();
    stop(tasks);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_api_key_is_a_configuration_error() {
    let tasks = start_stack(9147, 9148, None).await;

    let response = reqwest::get("http://127.0.0.1:9148/api/prices")
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.expect("body"), "Server configuration error");

    stop(tasks);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cors_and_search_stub() {
    let tasks = start_stack(9149, 9150, Some(API_KEY)).await;
    let client = reqwest::Client::new();

    let preflight = client
        .request(reqwest::Method::OPTIONS, "http://127.0.0.1:9150/api/prices")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .expect("preflight");
    assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        preflight.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(
        preflight.headers()["access-control-allow-credentials"],
        "true"
    );

    let search: Value = client
        .get("http://127.0.0.1:9150/api/items/search")
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");
    assert_eq!(search, json!({ "message": "Not implemented yet" }));

    stop(tasks);
}
