use leptos::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{A, Route, Router, Routes};
use wasm_bindgen::prelude::wasm_bindgen;

pub mod auth;
mod components;
mod logging;
pub mod prices;

pub use auth::Session;
pub use components::dashboard::Dashboard;
pub use logging::init_logging;
pub use prices::merge::{merge_series, single_series_rows};
pub use prices::store::{ChartStatus, FetchState, PriceStore};
pub use prices::types::{
    ChartView, CurrentPrices, MergedChartRow, PriceHistory, PricePoint, SeriesKind, Timeframe,
};

/// Root component bootstrapping the dashboard.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="TF2 Trading Stats" />
        <Router>
            <main class="app-root">
                <Routes>
                    <Route path="/" view=Dashboard />
                    <Route path="/*any" view=NotFound />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <section class="not-found">
            <h1>"Page not found"</h1>
            <A href="/">"Back to the dashboard"</A>
        </section>
    }
}

/// WASM entry point called automatically by `trunk`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), wasm_bindgen::JsValue> {
    init_logging();
    console_error_panic_hook::set_once();

    leptos::mount_to_body(|| view! { <App /> });
    Ok(())
}
