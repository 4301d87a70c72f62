use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// backpack.tf quality tier for Unique items.
pub const UNIQUE_QUALITY: u8 = 6;

/// One sampled price at one instant (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub value: f64,
}

/// Historical series for one item as served by `/api/prices/history`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub item: String,
    #[serde(default)]
    pub points: Vec<PricePoint>,
}

/// Spot snapshot served by `/api/prices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPrices {
    pub key_price_in_ref: f64,
    #[serde(rename = "refPriceInUSD")]
    pub ref_price_in_usd: f64,
    #[serde(rename = "keyPriceInUSD", default)]
    pub key_price_in_usd: f64,
    pub last_updated: String,
}

/// History window offered by the timeframe tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    ThirtyDays,
    NinetyDays,
    OneYear,
    ThreeYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::ThirtyDays,
        Timeframe::NinetyDays,
        Timeframe::OneYear,
        Timeframe::ThreeYears,
    ];

    pub fn as_query(self) -> &'static str {
        match self {
            Timeframe::ThirtyDays => "30days",
            Timeframe::NinetyDays => "90days",
            Timeframe::OneYear => "1year",
            Timeframe::ThreeYears => "3years",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::ThirtyDays => "30 Days",
            Timeframe::NinetyDays => "90 Days",
            Timeframe::OneYear => "1 Year",
            Timeframe::ThreeYears => "3 Years",
        }
    }
}

impl FromStr for Timeframe {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_query() == s)
            .ok_or(())
    }
}

/// The two tracked currency items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Refined,
    Key,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 2] = [SeriesKind::Refined, SeriesKind::Key];

    /// Item name as backpack.tf knows it.
    pub fn item_name(self) -> &'static str {
        match self {
            SeriesKind::Refined => "Refined Metal",
            SeriesKind::Key => "Mann Co. Supply Crate Key",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesKind::Refined => "refined",
            SeriesKind::Key => "key",
        }
    }
}

/// Which series the history chart draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartView {
    #[default]
    Combined,
    Single(SeriesKind),
}

impl ChartView {
    pub const ALL: [ChartView; 3] = [
        ChartView::Combined,
        ChartView::Single(SeriesKind::Refined),
        ChartView::Single(SeriesKind::Key),
    ];

    pub fn kinds(self) -> &'static [SeriesKind] {
        match self {
            ChartView::Combined => &SeriesKind::ALL,
            ChartView::Single(SeriesKind::Refined) => &[SeriesKind::Refined],
            ChartView::Single(SeriesKind::Key) => &[SeriesKind::Key],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartView::Combined => "combined",
            ChartView::Single(kind) => kind.as_str(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartView::Combined => "Both",
            ChartView::Single(SeriesKind::Refined) => "Refined Metal",
            ChartView::Single(SeriesKind::Key) => "Mann Co. Key",
        }
    }
}

/// One x position of the history chart. Only the fields of the drawn series are set.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedChartRow {
    pub timestamp: i64,
    pub date: String,
    pub refined: Option<f64>,
    pub key: Option<f64>,
}

impl MergedChartRow {
    pub fn value(&self, kind: SeriesKind) -> Option<f64> {
        match kind {
            SeriesKind::Refined => self.refined,
            SeriesKind::Key => self.key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_prices_tolerate_missing_key_usd() {
        let json = r#"{
            "keyPriceInRef": 72.33,
            "refPriceInUSD": 0.03,
            "lastUpdated": "2024-05-01T12:30:00Z"
        }"#;

        let prices: CurrentPrices = serde_json::from_str(json).expect("valid snapshot");
        assert_eq!(prices.key_price_in_ref, 72.33);
        assert_eq!(prices.ref_price_in_usd, 0.03);
        assert_eq!(prices.key_price_in_usd, 0.0);
    }

    #[test]
    fn history_deserializes_from_sample() {
        let json = r#"{
            "item": "Refined Metal",
            "points": [{ "timestamp": 1714521600, "value": 0.03 }]
        }"#;

        let history: PriceHistory = serde_json::from_str(json).expect("valid history");
        assert_eq!(history.item, "Refined Metal");
        assert_eq!(
            history.points,
            vec![PricePoint {
                timestamp: 1_714_521_600,
                value: 0.03
            }]
        );
    }

    #[test]
    fn timeframes_parse_from_query_values() {
        assert_eq!("90days".parse::<Timeframe>(), Ok(Timeframe::NinetyDays));
        assert_eq!("3years".parse::<Timeframe>(), Ok(Timeframe::ThreeYears));
        assert!("7days".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::default().as_query(), "30days");
    }

    #[test]
    fn chart_views_list_their_series() {
        assert_eq!(ChartView::Combined.kinds(), &SeriesKind::ALL);
        assert_eq!(
            ChartView::Single(SeriesKind::Key).kinds(),
            &[SeriesKind::Key]
        );
    }
}
