use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::chart::ChartArgs;
use crate::config::ServerConfig;
use crate::constants::{
    API_BIND_ADDR, BACKPACK_BASE_URL, DEFAULT_API_URL, FRONTEND_URL, STEAM_API_BASE_URL,
    STEAM_OPENID_URL, UPSTREAM_TIMEOUT_SECS,
};
use crate::prices::PricesArgs;

#[derive(Debug, Parser)]
#[command(author, version, about = "TF2 currency price API and terminal charts")]
pub struct Cli {
    #[command(flatten)]
    server: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn into_parts(self) -> (Command, ServeArgs) {
        (self.command.unwrap_or_default(), self.server)
    }
}

#[derive(Debug, Subcommand, Default)]
pub enum Command {
    /// Serve the pricing and sign-in API
    #[default]
    Serve,
    /// Print the current key and refined metal prices
    Prices(PricesArgs),
    /// Fetch a price history and render an ASCII chart
    Chart(ChartArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address the HTTP API listens on
    #[arg(long, env = "TF2_STATS_BIND", default_value = API_BIND_ADDR)]
    pub bind: SocketAddr,

    /// Public base URL of this API, used as the Steam return address
    #[arg(long, env = "TF2_STATS_PUBLIC_URL", default_value = DEFAULT_API_URL)]
    pub public_url: String,

    /// Dashboard URL; allowed as CORS origin and target after sign-in
    #[arg(long, env = "TF2_STATS_FRONTEND_URL", default_value = FRONTEND_URL)]
    pub frontend_url: String,

    /// backpack.tf API key
    #[arg(long, env = "BACKPACK_TF_API_KEY", hide_env_values = true)]
    pub backpack_api_key: Option<String>,

    /// Steam Web API key used to load player summaries
    #[arg(long, env = "STEAM_API_KEY", hide_env_values = true)]
    pub steam_api_key: Option<String>,

    /// backpack.tf base URL
    #[arg(long, env = "BACKPACK_TF_URL", default_value = BACKPACK_BASE_URL)]
    pub backpack_url: String,

    /// Seconds before an upstream request is abandoned
    #[arg(long, default_value_t = UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind_addr: args.bind,
            public_url: args.public_url,
            frontend_url: args.frontend_url,
            backpack_base_url: args.backpack_url,
            backpack_api_key: args.backpack_api_key.filter(|key| !key.is_empty()),
            steam_openid_url: STEAM_OPENID_URL.to_string(),
            steam_api_base_url: STEAM_API_BASE_URL.to_string(),
            steam_api_key: args.steam_api_key.filter(|key| !key.is_empty()),
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
        }
    }
}
