use super::merge::{merge_series, single_series_rows};
use super::types::{ChartView, CurrentPrices, MergedChartRow, PriceHistory, SeriesKind, Timeframe};

/// Lifecycle of one independent fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn settle(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(message) => FetchState::Failed(message),
        }
    }
}

/// Identifies the history trigger a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryTicket {
    generation: u64,
    timeframe: Timeframe,
}

impl HistoryTicket {
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }
}

/// What the chart area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartStatus {
    Idle,
    Loading,
    Failed(String),
    Ready,
}

/// View state for the spot snapshot and both history series.
#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    prices: FetchState<CurrentPrices>,
    refined: FetchState<PriceHistory>,
    key: FetchState<PriceHistory>,
    timeframe: Timeframe,
    generation: u64,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_prices(&mut self) {
        self.prices = FetchState::Loading;
    }

    pub fn finish_prices(&mut self, result: Result<CurrentPrices, String>) {
        self.prices = FetchState::settle(result);
    }

    /// Start a history load for `timeframe`. Responses of earlier tickets are ignored from now on.
    pub fn begin_history(&mut self, timeframe: Timeframe) -> HistoryTicket {
        self.generation += 1;
        self.timeframe = timeframe;
        self.refined = FetchState::Loading;
        self.key = FetchState::Loading;
        HistoryTicket {
            generation: self.generation,
            timeframe,
        }
    }

    /// Like `begin_history`, but a no-op when `timeframe` is already active.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> Option<HistoryTicket> {
        if self.generation > 0 && self.timeframe == timeframe {
            return None;
        }
        Some(self.begin_history(timeframe))
    }

    /// Store a history response. Returns `false` when the ticket is stale and the result was dropped.
    pub fn finish_history(
        &mut self,
        ticket: HistoryTicket,
        kind: SeriesKind,
        result: Result<PriceHistory, String>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        *self.history_mut(kind) = FetchState::settle(result);
        true
    }

    pub fn prices(&self) -> &FetchState<CurrentPrices> {
        &self.prices
    }

    pub fn history(&self, kind: SeriesKind) -> &FetchState<PriceHistory> {
        match kind {
            SeriesKind::Refined => &self.refined,
            SeriesKind::Key => &self.key,
        }
    }

    fn history_mut(&mut self, kind: SeriesKind) -> &mut FetchState<PriceHistory> {
        match kind {
            SeriesKind::Refined => &mut self.refined,
            SeriesKind::Key => &mut self.key,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn chart_status(&self) -> ChartStatus {
        let series = [&self.refined, &self.key];
        if series.iter().any(|state| state.is_loading()) {
            return ChartStatus::Loading;
        }
        if let Some(message) = series.iter().find_map(|state| state.error()) {
            return ChartStatus::Failed(message.to_string());
        }
        if series.iter().all(|state| state.ready().is_some()) {
            ChartStatus::Ready
        } else {
            ChartStatus::Idle
        }
    }

    /// Chart rows for `view`; empty until the needed series are loaded.
    pub fn rows_for(&self, view: ChartView) -> Vec<MergedChartRow> {
        match view {
            ChartView::Combined => match (self.refined.ready(), self.key.ready()) {
                (Some(refined), Some(key)) => merge_series(&refined.points, &key.points),
                _ => Vec::new(),
            },
            ChartView::Single(kind) => self
                .history(kind)
                .ready()
                .map(|history| single_series_rows(&history.points, kind))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::types::PricePoint;

    fn history(kind: SeriesKind, points: &[(i64, f64)]) -> PriceHistory {
        PriceHistory {
            item: kind.item_name().to_string(),
            points: points
                .iter()
                .map(|&(timestamp, value)| PricePoint { timestamp, value })
                .collect(),
        }
    }

    #[test]
    fn prices_move_from_loading_to_ready() {
        let mut store = PriceStore::new();
        assert!(matches!(store.prices(), FetchState::Idle));

        store.begin_prices();
        assert!(store.prices().is_loading());

        store.finish_prices(Ok(CurrentPrices {
            key_price_in_ref: 72.33,
            ref_price_in_usd: 0.03,
            key_price_in_usd: 2.17,
            last_updated: "2024-05-01T12:30:00Z".into(),
        }));
        assert_eq!(store.prices().ready().map(|p| p.key_price_in_ref), Some(72.33));
    }

    #[test]
    fn history_failure_clears_loading_and_keeps_message() {
        let mut store = PriceStore::new();
        let ticket = store.begin_history(Timeframe::NinetyDays);
        assert_eq!(store.chart_status(), ChartStatus::Loading);

        assert!(store.finish_history(
            ticket,
            SeriesKind::Refined,
            Ok(history(SeriesKind::Refined, &[(1, 0.03)]))
        ));
        assert_eq!(store.chart_status(), ChartStatus::Loading);

        assert!(store.finish_history(
            ticket,
            SeriesKind::Key,
            Err("Failed to fetch Mann Co. Supply Crate Key price history.".into())
        ));
        assert!(!store.history(SeriesKind::Key).is_loading());
        assert_eq!(
            store.chart_status(),
            ChartStatus::Failed("Failed to fetch Mann Co. Supply Crate Key price history.".into())
        );
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut store = PriceStore::new();
        let slow = store.begin_history(Timeframe::ThirtyDays);
        let fast = store.select_timeframe(Timeframe::OneYear).expect("new timeframe");

        assert!(store.finish_history(
            fast,
            SeriesKind::Key,
            Ok(history(SeriesKind::Key, &[(10, 72.0)]))
        ));
        assert!(!store.finish_history(
            slow,
            SeriesKind::Key,
            Ok(history(SeriesKind::Key, &[(1, 60.0)]))
        ));

        let key = store.history(SeriesKind::Key).ready().expect("fresh history");
        assert_eq!(key.points[0].value, 72.0);
        assert_eq!(store.timeframe(), Timeframe::OneYear);
    }

    #[test]
    fn reselecting_the_active_timeframe_does_not_refetch() {
        let mut store = PriceStore::new();
        store.begin_history(Timeframe::ThirtyDays);

        assert!(store.select_timeframe(Timeframe::ThirtyDays).is_none());
        let ticket = store.select_timeframe(Timeframe::ThreeYears).expect("ticket");
        assert_eq!(ticket.timeframe(), Timeframe::ThreeYears);
    }

    #[test]
    fn rows_follow_selected_view() {
        let mut store = PriceStore::new();
        assert!(store.rows_for(ChartView::Combined).is_empty());

        let ticket = store.begin_history(Timeframe::ThirtyDays);
        store.finish_history(
            ticket,
            SeriesKind::Refined,
            Ok(history(SeriesKind::Refined, &[(1, 10.0), (2, 20.0)])),
        );
        assert!(store.rows_for(ChartView::Combined).is_empty());
        assert_eq!(
            store.rows_for(ChartView::Single(SeriesKind::Refined)).len(),
            2
        );

        store.finish_history(
            ticket,
            SeriesKind::Key,
            Ok(history(SeriesKind::Key, &[(1, 0.5)])),
        );
        assert_eq!(store.chart_status(), ChartStatus::Ready);
        let rows = store.rows_for(ChartView::Combined);
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].refined, rows[0].key), (Some(10.0), Some(0.5)));
    }
}
