use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::{
    BACKPACK_BASE_URL, DEFAULT_API_URL, FRONTEND_URL, STEAM_API_BASE_URL, STEAM_OPENID_URL,
    UPSTREAM_TIMEOUT_SECS,
};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Externally reachable base URL of this API; Steam redirects back here.
    pub public_url: String,
    pub frontend_url: String,
    pub backpack_base_url: String,
    pub backpack_api_key: Option<String>,
    pub steam_openid_url: String,
    pub steam_api_base_url: String,
    pub steam_api_key: Option<String>,
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            public_url: DEFAULT_API_URL.to_string(),
            frontend_url: FRONTEND_URL.to_string(),
            backpack_base_url: BACKPACK_BASE_URL.to_string(),
            backpack_api_key: None,
            steam_openid_url: STEAM_OPENID_URL.to_string(),
            steam_api_base_url: STEAM_API_BASE_URL.to_string(),
            steam_api_key: None,
            upstream_timeout: Duration::from_secs(UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn callback_url(&self) -> String {
        format!(
            "{}/api/auth/steam/callback",
            self.public_url.trim_end_matches('/')
        )
    }

    pub fn realm(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }

    /// Scheme, host and port of the dashboard, as browsers send it in `Origin`.
    pub fn frontend_origin(&self) -> &str {
        let url = self.frontend_url.as_str();
        let authority_start = url.find("://").map(|idx| idx + 3).unwrap_or(0);
        match url[authority_start..].find('/') {
            Some(path_start) => &url[..authority_start + path_start],
            None => url,
        }
    }

    pub fn session_redirect(&self, token: &str) -> String {
        format!(
            "{}/?session={}",
            self.frontend_url.trim_end_matches('/'),
            urlencoding::encode(token)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path() {
        let config = ServerConfig {
            frontend_url: "https://stats.example.com/dashboard/".into(),
            ..ServerConfig::default()
        };
        assert_eq!(config.frontend_origin(), "https://stats.example.com");
        assert_eq!(
            ServerConfig::default().frontend_origin(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn callback_and_redirect_ignore_trailing_slashes() {
        let config = ServerConfig {
            public_url: "http://api.example/".into(),
            frontend_url: "http://app.example/".into(),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.callback_url(),
            "http://api.example/api/auth/steam/callback"
        );
        assert_eq!(config.realm(), "http://api.example");
        assert_eq!(config.session_redirect("abc"), "http://app.example/?session=abc");
    }
}
