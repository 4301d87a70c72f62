use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::constants::{DEFAULT_API_URL, UPSTREAM_TIMEOUT_SECS};
use crate::types::CurrentPrices;

#[derive(Debug, Args, Clone)]
pub struct PricesArgs {
    /// Base URL of a running price API
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api: String,
}

pub async fn run(args: PricesArgs) -> Result<()> {
    let url = format!("{}/api/prices", args.api.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
        .build()
        .context("failed to build HTTP client")?;

    let prices: CurrentPrices = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach {url}; run `tf2-stats serve` first"))?
        .error_for_status()
        .context("price API returned an error")?
        .json()
        .await
        .context("malformed price snapshot")?;

    for line in snapshot_lines(&prices) {
        println!("{line}");
    }
    Ok(())
}

fn snapshot_lines(prices: &CurrentPrices) -> [String; 3] {
    [
        format!(
            "{:<14} | {:>10.2} USD",
            "Refined Metal", prices.ref_price_in_usd
        ),
        format!(
            "{:<14} | {:>10.2} ref | {:>8.2} USD",
            "Mann Co. Key", prices.key_price_in_ref, prices.key_price_in_usd
        ),
        format!("{:<14} | {}", "Last updated", prices.last_updated),
    ]
}
