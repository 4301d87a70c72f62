use std::collections::HashMap;

use super::format::format_date;
use super::types::{MergedChartRow, PricePoint, SeriesKind};

/// Join two series on equal timestamps, keeping the refined series' order.
///
/// Refined points without a key point at the same instant produce no row.
/// When the key series repeats a timestamp, its first value is used.
pub fn merge_series(refined: &[PricePoint], key: &[PricePoint]) -> Vec<MergedChartRow> {
    let mut key_by_timestamp: HashMap<i64, f64> = HashMap::with_capacity(key.len());
    for point in key {
        key_by_timestamp
            .entry(point.timestamp)
            .or_insert(point.value);
    }

    refined
        .iter()
        .filter_map(|point| {
            let key_value = key_by_timestamp.get(&point.timestamp)?;
            Some(MergedChartRow {
                timestamp: point.timestamp,
                date: format_date(point.timestamp),
                refined: Some(point.value),
                key: Some(*key_value),
            })
        })
        .collect()
}

/// Rows for a chart drawing only `kind`.
pub fn single_series_rows(points: &[PricePoint], kind: SeriesKind) -> Vec<MergedChartRow> {
    points
        .iter()
        .map(|point| {
            let value = Some(point.value);
            MergedChartRow {
                timestamp: point.timestamp,
                date: format_date(point.timestamp),
                refined: value.filter(|_| kind == SeriesKind::Refined),
                key: value.filter(|_| kind == SeriesKind::Key),
            }
        })
        .collect()
}
