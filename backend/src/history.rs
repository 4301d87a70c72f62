use clap::ValueEnum;

use crate::types::PricePoint;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// History window accepted by `/api/prices/history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Timeframe {
    #[value(name = "7days")]
    SevenDays,
    #[default]
    #[value(name = "30days")]
    ThirtyDays,
    #[value(name = "90days")]
    NinetyDays,
    #[value(name = "1year")]
    OneYear,
    #[value(name = "3years")]
    ThreeYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::SevenDays,
        Timeframe::ThirtyDays,
        Timeframe::NinetyDays,
        Timeframe::OneYear,
        Timeframe::ThreeYears,
    ];

    pub fn as_query(self) -> &'static str {
        match self {
            Timeframe::SevenDays => "7days",
            Timeframe::ThirtyDays => "30days",
            Timeframe::NinetyDays => "90days",
            Timeframe::OneYear => "1year",
            Timeframe::ThreeYears => "3years",
        }
    }

    pub fn from_query(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|timeframe| timeframe.as_query() == raw)
    }

    pub fn window_secs(self) -> i64 {
        let days = match self {
            Timeframe::SevenDays => 7,
            Timeframe::ThirtyDays => 30,
            Timeframe::NinetyDays => 90,
            Timeframe::OneYear => 365,
            Timeframe::ThreeYears => 3 * 365,
        };
        days * SECONDS_PER_DAY
    }
}

/// Oldest timestamp kept for a raw `timeframe` query value.
///
/// An absent or empty value means the 30 day default; an unrecognised one keeps
/// the whole upstream history.
pub fn cutoff_for(raw: Option<&str>, now: i64) -> i64 {
    match raw.filter(|value| !value.is_empty()) {
        None => now - Timeframe::default().window_secs(),
        Some(value) => Timeframe::from_query(value)
            .map(|timeframe| now - timeframe.window_secs())
            .unwrap_or(i64::MIN),
    }
}

/// Keep points at or after `cutoff`, preserving upstream order.
pub fn filter_points<I>(points: I, cutoff: i64) -> Vec<PricePoint>
where
    I: IntoIterator<Item = PricePoint>,
{
    points
        .into_iter()
        .filter(|point| point.timestamp >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_717_200_000;

    fn point(days_ago: i64, value: f64) -> PricePoint {
        PricePoint {
            timestamp: NOW - days_ago * SECONDS_PER_DAY,
            value,
        }
    }

    #[test]
    fn query_names_round_trip() {
        for timeframe in Timeframe::ALL {
            assert_eq!(Timeframe::from_query(timeframe.as_query()), Some(timeframe));
        }
        assert_eq!(Timeframe::from_query("forever"), None);
    }

    #[test]
    fn missing_timeframe_defaults_to_thirty_days() {
        assert_eq!(cutoff_for(None, NOW), NOW - 30 * SECONDS_PER_DAY);
        assert_eq!(cutoff_for(Some(""), NOW), NOW - 30 * SECONDS_PER_DAY);
    }

    #[test]
    fn unknown_timeframe_keeps_everything() {
        let cutoff = cutoff_for(Some("decade"), NOW);
        let kept = filter_points(vec![point(5_000, 1.0), point(1, 2.0)], cutoff);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn filter_keeps_boundary_and_order() {
        let cutoff = cutoff_for(Some("90days"), NOW);
        let points = vec![point(10, 3.0), point(120, 1.0), point(90, 2.0), point(0, 4.0)];

        let kept = filter_points(points, cutoff);
        let values: Vec<f64> = kept.iter().map(|point| point.value).collect();
        assert_eq!(values, vec![3.0, 2.0, 4.0]);
    }

    #[test]
    fn three_years_spans_three_calendar_years_of_days() {
        assert_eq!(
            Timeframe::ThreeYears.window_secs(),
            3 * Timeframe::OneYear.window_secs()
        );
    }
}
