//! Steam sign-in over OpenID 2.0 plus the in-memory session table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::constants::SESSION_TTL_SECS;
use crate::types::Session;

const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";
const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
const CLAIMED_ID_PREFIXES: [&str; 2] = [
    "https://steamcommunity.com/openid/id/",
    "http://steamcommunity.com/openid/id/",
];

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("missing OpenID field {0}")]
    MissingField(&'static str),
    #[error("unexpected OpenID mode {0:?}")]
    UnexpectedMode(String),
    #[error("assertion was issued for another return address: {0:?}")]
    ReturnToMismatch(Option<String>),
    #[error("assertion names another OpenID provider: {0:?}")]
    EndpointMismatch(Option<String>),
    #[error("claimed id is not a Steam account: {0}")]
    InvalidClaimedId(String),
    #[error("Steam did not confirm the assertion")]
    NotVerified,
    #[error("Steam API key is not configured")]
    MissingApiKey,
    #[error("Steam has no profile for {0}")]
    UnknownProfile(u64),
    #[error("Steam request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// URL the browser is sent to for the Steam login page.
pub fn login_redirect_url(openid_url: &str, return_to: &str, realm: &str) -> String {
    let params = [
        ("openid.ns", OPENID_NS),
        ("openid.mode", "checkid_setup"),
        ("openid.return_to", return_to),
        ("openid.realm", realm),
        ("openid.identity", IDENTIFIER_SELECT),
        ("openid.claimed_id", IDENTIFIER_SELECT),
    ];
    let query = params
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{openid_url}?{query}")
}

pub fn steam_id_from_claimed_id(claimed_id: &str) -> Option<u64> {
    let digits = CLAIMED_ID_PREFIXES
        .iter()
        .find_map(|prefix| claimed_id.strip_prefix(prefix))?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `received` may carry extra query parameters but must otherwise be `expected`.
fn matches_return_to(received: &str, expected: &str) -> bool {
    match received.strip_prefix(expected) {
        Some(rest) => rest.is_empty() || rest.starts_with('?'),
        None => false,
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SteamProfile {
    pub steamid: String,
    pub personaname: String,
    #[serde(default)]
    pub avatarfull: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    response: SummariesBody,
}

#[derive(Debug, Deserialize)]
struct SummariesBody {
    #[serde(default)]
    players: Vec<SteamProfile>,
}

#[derive(Clone)]
pub struct SteamClient {
    http: Client,
    openid_url: String,
    api_base_url: String,
    api_key: Option<String>,
}

impl SteamClient {
    pub fn new(
        http: Client,
        openid_url: impl Into<String>,
        api_base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            openid_url: openid_url.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn openid_url(&self) -> &str {
        &self.openid_url
    }

    /// Replay the positive assertion to Steam and return the verified account id.
    ///
    /// The assertion must be addressed to `return_to` and name this client's
    /// OpenID endpoint, otherwise an assertion issued to another site could be
    /// replayed here.
    pub async fn verify(
        &self,
        params: &HashMap<String, String>,
        return_to: &str,
    ) -> Result<u64, SignInError> {
        let mode = params
            .get("openid.mode")
            .ok_or(SignInError::MissingField("openid.mode"))?;
        if mode != "id_res" {
            return Err(SignInError::UnexpectedMode(mode.clone()));
        }
        let signed_return_to = params.get("openid.return_to");
        if !signed_return_to.is_some_and(|url| matches_return_to(url, return_to)) {
            return Err(SignInError::ReturnToMismatch(signed_return_to.cloned()));
        }
        let op_endpoint = params.get("openid.op_endpoint");
        if op_endpoint.map(String::as_str) != Some(self.openid_url.as_str()) {
            return Err(SignInError::EndpointMismatch(op_endpoint.cloned()));
        }
        let claimed_id = params
            .get("openid.claimed_id")
            .ok_or(SignInError::MissingField("openid.claimed_id"))?;
        let steam_id = steam_id_from_claimed_id(claimed_id)
            .ok_or_else(|| SignInError::InvalidClaimedId(claimed_id.clone()))?;

        let form: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| {
                if name == "openid.mode" {
                    (name.as_str(), "check_authentication")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        let body = self
            .http
            .post(&self.openid_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if body.lines().any(|line| line.trim() == "is_valid:true") {
            Ok(steam_id)
        } else {
            Err(SignInError::NotVerified)
        }
    }

    pub async fn player_summary(&self, steam_id: u64) -> Result<SteamProfile, SignInError> {
        let api_key = self.api_key.as_deref().ok_or(SignInError::MissingApiKey)?;
        let steam_ids = steam_id.to_string();
        let envelope: SummariesEnvelope = self
            .http
            .get(format!(
                "{}/ISteamUser/GetPlayerSummaries/v0002/",
                self.api_base_url
            ))
            .query(&[("key", api_key), ("steamids", steam_ids.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        envelope
            .response
            .players
            .into_iter()
            .find(|player| player.steamid == steam_ids)
            .ok_or(SignInError::UnknownProfile(steam_id))
    }
}

/// Sessions keyed by their opaque access token. Entries older than the
/// time-to-live are invisible to `get` and pruned on the next `issue`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, (Session, Instant)>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    pub async fn issue(&self, steam_id: u64, profile: SteamProfile) -> Session {
        let session = Session {
            steam_id,
            name: profile.personaname,
            image: profile.avatarfull.filter(|url| !url.is_empty()),
            access_token: Uuid::new_v4().simple().to_string(),
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, issued_at)| issued_at.elapsed() < self.ttl);
        sessions.insert(
            session.access_token.clone(),
            (session.clone(), Instant::now()),
        );
        session
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions
            .read()
            .await
            .get(token)
            .filter(|(_, issued_at)| issued_at.elapsed() < self.ttl)
            .map(|(session, _)| session.clone())
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}
