pub const API_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const FRONTEND_URL: &str = "http://localhost:3000";
pub const BACKPACK_BASE_URL: &str = "https://backpack.tf";
pub const STEAM_OPENID_URL: &str = "https://steamcommunity.com/openid/login";
pub const STEAM_API_BASE_URL: &str = "https://api.steampowered.com";
pub const TF2_APP_ID: u32 = 440;
pub const UNIQUE_QUALITY: u8 = 6;
pub const UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
