use leptos::*;

use crate::prices::{
    format::{format_value, series_label, tooltip_label},
    store::ChartStatus,
    types::{ChartView, MergedChartRow, SeriesKind},
};

use super::{
    dashboard::{ChartViewSignal, PriceStoreSignal},
    timeframe_tabs::TimeframeTabs,
};

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 72.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;

#[component]
pub fn PriceChart() -> impl IntoView {
    let store = use_context::<PriceStoreSignal>().expect("price store context missing");
    let chart_view = use_context::<ChartViewSignal>().expect("chart view context missing");

    let status = create_memo(move |_| store.0.with(|store| store.chart_status()));
    let rows = create_memo(move |_| {
        let selected = chart_view.0.get();
        store.0.with(|store| store.rows_for(selected))
    });

    view! {
        <section class="price-chart">
            <header class="price-chart__header">
                <h2>"Historical Price Data"</h2>
                <p>"Track price trends over time for TF2 currencies"</p>
            </header>
            <div class="price-chart__toolbar">
                <TimeframeTabs />
                <ChartViewPicker />
            </div>
            <div class="price-chart__body">
                {move || match status.get() {
                    ChartStatus::Loading => {
                        view! { <p class="price-chart__status">"Loading chart data..."</p> }.into_view()
                    }
                    ChartStatus::Failed(message) => {
                        view! { <p class="price-chart__error">{message}</p> }.into_view()
                    }
                    ChartStatus::Idle | ChartStatus::Ready => {
                        view! { <AreaChart rows=rows chart_view=chart_view.0 /> }.into_view()
                    }
                }}
            </div>
        </section>
    }
}

#[component]
fn ChartViewPicker() -> impl IntoView {
    let chart_view = use_context::<ChartViewSignal>().expect("chart view context missing");

    view! {
        <div class="chart-view-picker">
            <For
                each=move || ChartView::ALL.into_iter()
                key=|option| option.as_str()
                children=move |option: ChartView| {
                    view! {
                        <button
                            class="chart-view-picker__option"
                            class:active=move || chart_view.0.get() == option
                            on:click=move |_| chart_view.0.set(option)
                        >
                            {option.label()}
                        </button>
                    }
                }
            />
        </div>
    }
}

/// Area chart of the given rows; a placeholder when there is nothing to plot.
#[component]
fn AreaChart(rows: Memo<Vec<MergedChartRow>>, chart_view: RwSignal<ChartView>) -> impl IntoView {
    let plot = PlotArea::standard();
    let hovered = create_rw_signal(None::<usize>);
    let geometry = create_memo(move |_| {
        let selected = chart_view.get();
        rows.with(|rows| compute_chart_geometry(rows, selected, plot))
    });

    move || {
        let Some(geometry) = geometry.get() else {
            return view! { <p class="price-chart__placeholder">"Loading or no data available."</p> }
                .into_view();
        };

        let tooltip = {
            let geometry = geometry.clone();
            move || {
                let row_index = hovered.get()?;
                let row = rows.with(|rows| rows.get(row_index).cloned())?;
                let (x, y) = geometry.anchor(row_index)?;
                let kinds: Vec<SeriesKind> = geometry.series.iter().map(|series| series.kind).collect();
                let lines = tooltip_lines(&row, &kinds);
                Some(view! {
                    <div class="price-chart__tooltip" style=format!("left: {x:.0}px; top: {y:.0}px;")>
                        <div class="price-chart__tooltip-date">{row.date.clone()}</div>
                        {lines
                            .into_iter()
                            .map(|(kind, text)| {
                                view! {
                                    <div class="price-chart__tooltip-line">
                                        <span class="price-chart__swatch" style=format!("background: {}", stroke_color(kind)) />
                                        {text}
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                })
            }
        };

        let grid = geometry
            .series
            .first()
            .map(|series| {
                series
                    .ticks
                    .iter()
                    .map(|tick| {
                        let y = format!("{:.2}", tick.position);
                        view! {
                            <line class="price-chart__grid" x1=plot.left x2=plot.right() y1=y.clone() y2=y />
                        }
                    })
                    .collect_view()
            });

        view! {
            <div class="price-chart__canvas">
                <svg
                    width=CHART_WIDTH
                    height=CHART_HEIGHT
                    viewBox=format!("0 0 {} {}", CHART_WIDTH, CHART_HEIGHT)
                    class="price-chart__svg"
                    on:mouseleave=move |_| hovered.set(None)
                >
                    {grid}
                    {geometry.series.iter().map(|series| series_view(series, hovered)).collect_view()}
                    {axes_view(&geometry, plot)}
                </svg>
                {tooltip}
                <ul class="price-chart__legend">
                    {geometry
                        .series
                        .iter()
                        .map(|series| {
                            view! {
                                <li class="price-chart__legend-item">
                                    <span class="price-chart__swatch" style=format!("background: {}", stroke_color(series.kind)) />
                                    {series_label(series.kind)}
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </div>
        }
        .into_view()
    }
}

fn series_view(series: &SeriesGeometry, hovered: RwSignal<Option<usize>>) -> View {
    let stroke = stroke_color(series.kind);
    view! {
        <g class=format!("price-chart__series price-chart__series--{}", series.kind.as_str())>
            <polygon class="price-chart__area" points=series.area_points.clone() fill=fill_color(series.kind) />
            <polyline class="price-chart__line" points=series.line_points.clone() stroke=stroke fill="none" />
            {series
                .markers
                .iter()
                .map(|marker| {
                    let row = marker.row;
                    view! {
                        <circle
                            class="price-chart__marker"
                            class:active=move || hovered.get() == Some(row)
                            cx=format!("{:.2}", marker.x)
                            cy=format!("{:.2}", marker.y)
                            r="3"
                            fill=stroke
                            on:mouseenter=move |_| hovered.set(Some(row))
                        />
                    }
                })
                .collect_view()}
        </g>
    }
    .into_view()
}

fn axes_view(geometry: &ChartGeometry, plot: PlotArea) -> View {
    let value_labels = geometry
        .series
        .iter()
        .map(|series| {
            let (x, anchor) = match series.side {
                AxisSide::Left => (plot.left - 8.0, "end"),
                AxisSide::Right => (plot.right() + 8.0, "start"),
            };
            series
                .ticks
                .iter()
                .map(|tick| {
                    view! {
                        <text
                            class="price-chart__tick"
                            x=format!("{x:.2}")
                            y=format!("{:.2}", tick.position)
                            text-anchor=anchor
                            dominant-baseline="middle"
                        >
                            {tick.label.clone()}
                        </text>
                    }
                })
                .collect_view()
        })
        .collect_view();

    let date_labels = geometry
        .x_ticks
        .iter()
        .map(|tick| {
            view! {
                <text
                    class="price-chart__tick"
                    x=format!("{:.2}", tick.position)
                    y=format!("{:.2}", plot.bottom() + 24.0)
                    text-anchor="middle"
                >
                    {tick.label.clone()}
                </text>
            }
        })
        .collect_view();

    view! {
        <g class="price-chart__axes">
            <line class="price-chart__axis" x1=plot.left x2=plot.right() y1=plot.bottom() y2=plot.bottom() />
            {value_labels}
            {date_labels}
        </g>
    }
    .into_view()
}

fn stroke_color(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::Refined => "hsl(217, 91%, 60%)",
        SeriesKind::Key => "hsl(180, 100%, 50%)",
    }
}

fn fill_color(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::Refined => "hsla(217, 91%, 60%, 0.2)",
        SeriesKind::Key => "hsla(180, 100%, 50%, 0.2)",
    }
}

/// `"{label}: {value}"` for every drawn series that has a value in `row`.
fn tooltip_lines(row: &MergedChartRow, kinds: &[SeriesKind]) -> Vec<(SeriesKind, String)> {
    kinds
        .iter()
        .filter_map(|&kind| {
            row.value(kind).map(|value| {
                (
                    kind,
                    format!("{}: {}", tooltip_label(kind), format_value(kind, value)),
                )
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn standard() -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
            height: CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Rows are evenly spaced; every series shares this horizontal scale.
    fn x_at(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.left + self.width / 2.0;
        }
        self.left + (index as f64 / (count - 1) as f64) * self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
struct AxisTick {
    position: f64,
    label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Marker {
    row: usize,
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct SeriesGeometry {
    kind: SeriesKind,
    side: AxisSide,
    line_points: String,
    area_points: String,
    markers: Vec<Marker>,
    ticks: Vec<AxisTick>,
    min_value: f64,
    max_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct ChartGeometry {
    series: Vec<SeriesGeometry>,
    x_ticks: Vec<AxisTick>,
}

impl ChartGeometry {
    /// Topmost marker of `row`, where the tooltip is pinned.
    fn anchor(&self, row: usize) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|series| series.markers.iter())
            .filter(|marker| marker.row == row)
            .fold(None, |anchor, marker| match anchor {
                None => Some((marker.x, marker.y)),
                Some((x, y)) => Some((x, f64::min(y, marker.y))),
            })
    }
}

fn compute_chart_geometry(
    rows: &[MergedChartRow],
    view: ChartView,
    plot: PlotArea,
) -> Option<ChartGeometry> {
    let series: Vec<SeriesGeometry> = view
        .kinds()
        .iter()
        .enumerate()
        .filter_map(|(idx, &kind)| {
            let side = if idx == 0 {
                AxisSide::Left
            } else {
                AxisSide::Right
            };
            compute_series_geometry(rows, kind, side, plot)
        })
        .collect();

    if series.is_empty() {
        return None;
    }

    Some(ChartGeometry {
        series,
        x_ticks: x_axis_ticks(rows, plot),
    })
}

fn compute_series_geometry(
    rows: &[MergedChartRow],
    kind: SeriesKind,
    side: AxisSide,
    plot: PlotArea,
) -> Option<SeriesGeometry> {
    let samples: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            row.value(kind)
                .filter(|value| value.is_finite())
                .map(|value| (index, value))
        })
        .collect();

    if samples.is_empty() || plot.width <= 0.0 || plot.height <= 0.0 {
        return None;
    }

    let min_value = samples
        .iter()
        .map(|&(_, value)| value)
        .fold(f64::INFINITY, f64::min);
    let max_value = samples
        .iter()
        .map(|&(_, value)| value)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = max_value - min_value;
    let flat = span.abs() < f64::EPSILON;

    // Flat series sit at mid-height.
    let y_of = |value: f64| {
        if flat {
            plot.top + plot.height / 2.0
        } else {
            plot.bottom() - ((value - min_value) / span) * plot.height
        }
    };

    let markers: Vec<Marker> = samples
        .iter()
        .map(|&(row, value)| Marker {
            row,
            x: plot.x_at(row, rows.len()),
            y: y_of(value),
        })
        .collect();

    let line_points = markers
        .iter()
        .map(|marker| format!("{:.2},{:.2}", marker.x, marker.y))
        .collect::<Vec<_>>()
        .join(" ");
    let first = markers.first()?;
    let last = markers.last()?;
    let area_points = format!(
        "{} {:.2},{:.2} {:.2},{:.2}",
        line_points,
        last.x,
        plot.bottom(),
        first.x,
        plot.bottom()
    );

    let ticks = if flat {
        vec![AxisTick {
            position: y_of(min_value),
            label: format_value(kind, min_value),
        }]
    } else {
        (0..Y_TICKS)
            .map(|step| {
                let value = min_value + span * (step as f64 / (Y_TICKS - 1) as f64);
                AxisTick {
                    position: y_of(value),
                    label: format_value(kind, value),
                }
            })
            .collect()
    };

    Some(SeriesGeometry {
        kind,
        side,
        line_points,
        area_points,
        markers,
        ticks,
        min_value,
        max_value,
    })
}

fn x_axis_ticks(rows: &[MergedChartRow], plot: PlotArea) -> Vec<AxisTick> {
    let count = rows.len();
    if count == 0 {
        return Vec::new();
    }

    let slots = X_TICKS.min(count);
    let mut indices: Vec<usize> = (0..slots)
        .map(|slot| {
            if slots == 1 {
                0
            } else {
                ((slot * (count - 1)) as f64 / (slots - 1) as f64).round() as usize
            }
        })
        .collect();
    indices.dedup();

    indices
        .into_iter()
        .map(|index| AxisTick {
            position: plot.x_at(index, count),
            label: rows[index].date.clone(),
        })
        .collect()
}
