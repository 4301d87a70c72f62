//! Steam sign-in as seen from the dashboard.
//!
//! The pricing API runs the OpenID exchange and redirects back with
//! `?session=<token>`; the token is kept in local storage and sent as a
//! bearer token to look the session up again on later visits.

use gloo_net::http::Request;
use serde::{Deserialize, Serialize};

use crate::prices::fetch::{get_json, send, with_bearer, FetchError};

/// Query parameter carrying a freshly issued access token.
pub const SESSION_QUERY_KEY: &str = "session";

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "tf2-stats.session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub steam_id: u64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub access_token: String,
}

pub fn login_url(base: &str) -> String {
    format!("{}/api/auth/steam/login", base.trim_end_matches('/'))
}

pub fn session_url(base: &str) -> String {
    format!("{}/api/auth/session", base.trim_end_matches('/'))
}

pub fn logout_url(base: &str) -> String {
    format!("{}/api/auth/logout", base.trim_end_matches('/'))
}

pub async fn fetch_session(base: &str, token: &str) -> Result<Session, FetchError> {
    get_json(&session_url(base), Some(token)).await
}

pub async fn sign_out(base: &str, token: &str) -> Result<(), FetchError> {
    send(with_bearer(Request::post(&logout_url(base)), Some(token))).await?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub fn stored_token() -> Option<String> {
    local_storage()?
        .get_item(STORAGE_KEY)
        .ok()
        .flatten()
        .filter(|token| !token.is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn stored_token() -> Option<String> {
    None
}

/// Persist `token`, or forget the stored one when `None`.
#[cfg(target_arch = "wasm32")]
pub fn store_token(token: Option<&str>) {
    let Some(storage) = local_storage() else {
        return;
    };
    let result = match token {
        Some(token) => storage.set_item(STORAGE_KEY, token),
        None => storage.remove_item(STORAGE_KEY),
    };
    if result.is_err() {
        log::warn!("local storage unavailable; session will not survive a reload");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn store_token(_token: Option<&str>) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_deserializes_from_api_body() {
        let json = r#"{
            "steamId": 76561197960287930,
            "name": "Rabscuttle",
            "image": "https://avatars.example/full.jpg",
            "accessToken": "5f0c2b9e4e7d4d0c9a1f3b2e6d8c7a90"
        }"#;

        let session: Session = serde_json::from_str(json).expect("valid session");
        assert_eq!(session.steam_id, 76_561_197_960_287_930);
        assert_eq!(session.name, "Rabscuttle");
        assert_eq!(session.access_token, "5f0c2b9e4e7d4d0c9a1f3b2e6d8c7a90");
    }

    #[test]
    fn auth_urls_share_the_api_base() {
        assert_eq!(
            login_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/api/auth/steam/login"
        );
        assert_eq!(
            session_url("http://127.0.0.1:8080"),
            "http://127.0.0.1:8080/api/auth/session"
        );
        assert_eq!(
            logout_url("http://127.0.0.1:8080"),
            "http://127.0.0.1:8080/api/auth/logout"
        );
    }
}
