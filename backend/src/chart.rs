use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use textplots::{Chart, Plot, Shape};

use crate::constants::{DEFAULT_API_URL, UNIQUE_QUALITY, UPSTREAM_TIMEOUT_SECS};
use crate::history::Timeframe;
use crate::types::{PriceHistory, PricePoint};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Series {
    Refined,
    Key,
}

impl Series {
    pub fn item_name(self) -> &'static str {
        match self {
            Series::Refined => "Refined Metal",
            Series::Key => "Mann Co. Supply Crate Key",
        }
    }

    fn format_value(self, value: f64) -> String {
        match self {
            Series::Refined => format!("${value:.3}"),
            Series::Key => format!("{value:.2} ref"),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Base URL of a running price API
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api: String,

    /// Series to plot
    #[arg(short, long, value_enum, default_value_t = Series::Key)]
    pub series: Series,

    /// History window to request
    #[arg(short, long, value_enum, default_value_t = Timeframe::ThirtyDays)]
    pub timeframe: Timeframe,

    /// Chart width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = 30)]
    pub height: u32,
}

pub async fn run(args: ChartArgs) -> Result<()> {
    let history = fetch_history(&args).await?;

    if history.points.len() < 2 {
        bail!(
            "not enough data points to render a chart for {} ({})",
            history.item,
            args.timeframe.as_query()
        );
    }

    render_chart(&history, &args);
    Ok(())
}

async fn fetch_history(args: &ChartArgs) -> Result<PriceHistory> {
    let url = format!("{}/api/prices/history", args.api.trim_end_matches('/'));
    let quality = UNIQUE_QUALITY.to_string();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
        .build()
        .context("failed to build HTTP client")?;

    client
        .get(&url)
        .query(&[
            ("item", args.series.item_name()),
            ("quality", quality.as_str()),
            ("timeframe", args.timeframe.as_query()),
        ])
        .send()
        .await
        .with_context(|| format!("failed to reach {url}; run `tf2-stats serve` first"))?
        .error_for_status()
        .context("price API returned an error")?
        .json()
        .await
        .context("malformed price history")
}

/// Days since the earliest point against value, in time order.
fn chart_samples(points: &[PricePoint]) -> Vec<(f32, f32)> {
    let Some(start) = points.iter().map(|point| point.timestamp).min() else {
        return Vec::new();
    };

    let mut samples: Vec<(f32, f32)> = points
        .iter()
        .map(|point| {
            let days = (point.timestamp - start) as f64 / SECONDS_PER_DAY;
            (days as f32, point.value as f32)
        })
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    samples
}

fn render_chart(history: &PriceHistory, args: &ChartArgs) {
    let samples = chart_samples(&history.points);

    println!(
        "Rendering {} ({} samples over {})",
        history.item,
        samples.len(),
        args.timeframe.as_query()
    );

    let min_value = history
        .points
        .iter()
        .map(|point| point.value)
        .fold(f64::INFINITY, f64::min);
    let max_value = history
        .points
        .iter()
        .map(|point| point.value)
        .fold(f64::NEG_INFINITY, f64::max);
    println!(
        "Price range: {} → {}",
        args.series.format_value(min_value),
        args.series.format_value(max_value)
    );

    let max_day = samples.last().map(|(day, _)| *day).unwrap_or(0.0).max(1e-3);

    Chart::new(args.width.max(40), args.height.max(10), 0.0, max_day)
        .lineplot(&Shape::Lines(&samples))
        .display();
    println!();
}
