use chrono::{DateTime, Utc};

use super::types::{CurrentPrices, SeriesKind};

/// Calendar date of a unix timestamp, e.g. `Jan 5, 2024`.
pub fn format_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Axis tick and tooltip text for one value of `kind`.
pub fn format_value(kind: SeriesKind, value: f64) -> String {
    match kind {
        SeriesKind::Refined => format!("${value:.3}"),
        SeriesKind::Key => format!("{value:.2} ref"),
    }
}

/// Legend and card title.
pub fn series_label(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::Refined => "Refined Metal",
        SeriesKind::Key => "Mann Co. Key",
    }
}

pub fn tooltip_label(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::Refined => "Refined",
        SeriesKind::Key => "Key",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardLines {
    pub headline: String,
    pub detail: Option<String>,
}

pub fn price_card_lines(kind: SeriesKind, prices: &CurrentPrices) -> CardLines {
    match kind {
        SeriesKind::Refined => CardLines {
            headline: format!("{:.2} USD", prices.ref_price_in_usd),
            detail: None,
        },
        SeriesKind::Key => CardLines {
            headline: format!("{:.2} Ref", prices.key_price_in_ref),
            detail: Some(format!("{:.2} USD", prices.key_price_in_usd)),
        },
    }
}

/// Local wall-clock time of an RFC 3339 timestamp; unparseable input is shown as is.
pub fn format_last_updated(raw: &str) -> String {
    if DateTime::parse_from_rfc3339(raw).is_err() {
        return raw.to_string();
    }
    local_time_of_day(raw)
}

#[cfg(target_arch = "wasm32")]
fn local_time_of_day(raw: &str) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_str(raw));
    format!(
        "{:02}:{:02}:{:02}",
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds()
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn local_time_of_day(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| {
            date.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_short_month_names() {
        assert_eq!(format_date(1_704_412_800), "Jan 5, 2024");
        assert_eq!(format_date(1_735_603_200), "Dec 31, 2024");
    }

    #[test]
    fn values_follow_series_convention() {
        assert_eq!(format_value(SeriesKind::Refined, 0.0301), "$0.030");
        assert_eq!(format_value(SeriesKind::Refined, 72.33), "$72.330");
        assert_eq!(format_value(SeriesKind::Key, 72.33), "72.33 ref");
        assert_eq!(format_value(SeriesKind::Key, 70.0), "70.00 ref");
    }

    #[test]
    fn card_lines_match_currency() {
        let prices = CurrentPrices {
            key_price_in_ref: 72.33,
            ref_price_in_usd: 0.031,
            key_price_in_usd: 2.24223,
            last_updated: "2024-05-01T12:30:00Z".into(),
        };

        assert_eq!(
            price_card_lines(SeriesKind::Refined, &prices),
            CardLines {
                headline: "0.03 USD".into(),
                detail: None
            }
        );
        let key = price_card_lines(SeriesKind::Key, &prices);
        assert_eq!(key.headline, "72.33 Ref");
        assert_eq!(key.detail.as_deref(), Some("2.24 USD"));
    }

    #[test]
    fn last_updated_shows_time_of_day() {
        let formatted = format_last_updated("2024-05-01T12:30:00Z");
        assert_eq!(formatted.len(), 8);
        assert_eq!(formatted.matches(':').count(), 2);
        assert_eq!(format_last_updated("yesterday"), "yesterday");
    }
}
