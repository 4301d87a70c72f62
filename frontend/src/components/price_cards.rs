use leptos::*;

use crate::prices::{
    format::{format_last_updated, price_card_lines, series_label},
    store::FetchState,
    types::{CurrentPrices, SeriesKind},
};

use super::dashboard::PriceStoreSignal;

#[component]
pub fn PriceCards() -> impl IntoView {
    let store = use_context::<PriceStoreSignal>().expect("price store context missing");
    let prices = create_memo(move |_| store.0.with(|store| store.prices().clone()));

    view! {
        <section class="price-cards">
            <For
                each=move || SeriesKind::ALL.into_iter()
                key=|kind| *kind
                children=move |kind: SeriesKind| view! { <PriceCard kind=kind prices=prices /> }
            />
        </section>
    }
}

#[component]
fn PriceCard(kind: SeriesKind, prices: Memo<FetchState<CurrentPrices>>) -> impl IntoView {
    view! {
        <article class="price-card">
            <header class="price-card__header">
                <span class="price-card__caption">"Current Price"</span>
                <h2>{series_label(kind)}</h2>
            </header>
            {move || match prices.get() {
                FetchState::Idle | FetchState::Loading => {
                    view! { <div class="price-card__value">"Loading..."</div> }.into_view()
                }
                FetchState::Failed(message) => {
                    view! { <div class="price-card__error">{message}</div> }.into_view()
                }
                FetchState::Ready(current) => {
                    let lines = price_card_lines(kind, &current);
                    view! {
                        <div class="price-card__value">{lines.headline}</div>
                        {lines.detail.map(|detail| view! { <div class="price-card__detail">{detail}</div> })}
                        <div class="price-card__detail">
                            "Last updated: "{format_last_updated(&current.last_updated)}
                        </div>
                    }
                    .into_view()
                }
            }}
        </article>
    }
}
