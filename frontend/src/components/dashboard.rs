use leptos::*;
use leptos_router::{NavigateOptions, use_navigate, use_query_map};
use wasm_bindgen_futures::spawn_local;

use crate::{
    PriceStore,
    auth::{self, SESSION_QUERY_KEY, Session},
    prices::{
        fetch::{
            PRICES_FAILURE, fetch_current_prices, fetch_history, history_failure, resolve_api_base,
        },
        store::HistoryTicket,
        types::{ChartView, SeriesKind, Timeframe},
    },
};

use super::{price_cards::PriceCards, price_chart::PriceChart, sign_in::SignIn};

#[derive(Clone, Copy)]
pub struct PriceStoreSignal(pub RwSignal<PriceStore>);

#[derive(Clone, Copy)]
pub struct SessionSignal(pub RwSignal<Option<Session>>);

#[derive(Clone, Copy)]
pub struct ChartViewSignal(pub RwSignal<ChartView>);

/// Base URL of the pricing API, e.g. `http://127.0.0.1:8080`.
#[derive(Clone)]
pub struct ApiBase(pub String);

/// Top-level dashboard wrapper providing shared application state via context.
#[component]
pub fn Dashboard() -> impl IntoView {
    let store = create_rw_signal(PriceStore::new());
    let session = create_rw_signal(None::<Session>);
    let chart_view = create_rw_signal(ChartView::default());
    let api_base = ApiBase(resolve_api_base());

    let query = use_query_map();
    let navigate = use_navigate();
    let initial_timeframe = query.with_untracked(|params| {
        params
            .get("timeframe")
            .and_then(|raw| raw.parse::<Timeframe>().ok())
            .unwrap_or_default()
    });
    let issued_token = query.with_untracked(|params| params.get(SESSION_QUERY_KEY).cloned());

    let base_for_mount = api_base.0.clone();
    create_effect(move |_| {
        load_current_prices(store, base_for_mount.clone());
        load_history(store, base_for_mount.clone(), initial_timeframe);

        if let Some(token) = issued_token.clone() {
            auth::store_token(Some(&token));
            navigate("/", NavigateOptions {
                replace: true,
                ..Default::default()
            });
        }
        if let Some(token) = auth::stored_token() {
            restore_session(session, base_for_mount.clone(), token);
        }
    });

    provide_context(PriceStoreSignal(store));
    provide_context(SessionSignal(session));
    provide_context(ChartViewSignal(chart_view));
    provide_context(api_base);

    view! {
        <div class="dashboard">
            <header class="dashboard__header">
                <div class="dashboard__title">
                    <h1>"TF2 Trading Statistics"</h1>
                    <p>"Real-time market data and historical trends for Team Fortress 2 trading."</p>
                </div>
                <SignIn />
            </header>
            <section class="dashboard__body">
                <PriceCards />
                <PriceChart />
            </section>
        </div>
    }
}

fn load_current_prices(store: RwSignal<PriceStore>, api_base: String) {
    store.update(PriceStore::begin_prices);
    spawn_local(async move {
        let result = fetch_current_prices(&api_base).await.map_err(|err| {
            log::error!("current prices fetch failed: {err}");
            PRICES_FAILURE.to_string()
        });
        // The dashboard may be gone by now; a disposed signal ignores the write.
        let _ = store.try_update(|store| store.finish_prices(result));
    });
}

fn load_history(store: RwSignal<PriceStore>, api_base: String, timeframe: Timeframe) {
    if let Some(ticket) = store.try_update(|store| store.begin_history(timeframe)) {
        spawn_history_fetches(store, api_base, ticket);
    }
}

/// Switch the chart to `timeframe`, fetching both series unless it is already shown.
pub fn change_timeframe(store: RwSignal<PriceStore>, api_base: String, timeframe: Timeframe) {
    if let Some(Some(ticket)) = store.try_update(|store| store.select_timeframe(timeframe)) {
        spawn_history_fetches(store, api_base, ticket);
    }
}

fn spawn_history_fetches(store: RwSignal<PriceStore>, api_base: String, ticket: HistoryTicket) {
    for kind in SeriesKind::ALL {
        let api_base = api_base.clone();
        spawn_local(async move {
            let result = fetch_history(&api_base, kind, ticket.timeframe())
                .await
                .map_err(|err| {
                    log::error!("{} history fetch failed: {err}", kind.item_name());
                    history_failure(kind)
                });
            let applied = store
                .try_update(|store| store.finish_history(ticket, kind, result))
                .unwrap_or(false);
            if !applied {
                log::debug!(
                    "dropped {} history for {}; a newer request is pending",
                    kind.as_str(),
                    ticket.timeframe().as_query()
                );
            }
        });
    }
}

fn restore_session(session: RwSignal<Option<Session>>, api_base: String, token: String) {
    spawn_local(async move {
        match auth::fetch_session(&api_base, &token).await {
            Ok(restored) => {
                let _ = session.try_set(Some(restored));
            }
            Err(err) => {
                log::warn!("stored session rejected: {err}");
                auth::store_token(None);
            }
        }
    });
}
