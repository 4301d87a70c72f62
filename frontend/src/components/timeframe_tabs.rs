use leptos::*;

use crate::prices::types::Timeframe;

use super::dashboard::{ApiBase, PriceStoreSignal, change_timeframe};

#[component]
pub fn TimeframeTabs() -> impl IntoView {
    let store = use_context::<PriceStoreSignal>().expect("price store context missing");
    let api_base = use_context::<ApiBase>().expect("api base context missing");
    let active = create_memo(move |_| store.0.with(|store| store.timeframe()));

    view! {
        <div class="timeframe-tabs" role="tablist">
            <For
                each=move || Timeframe::ALL.into_iter()
                key=|timeframe| timeframe.as_query()
                children=move |timeframe: Timeframe| {
                    let api_base = api_base.clone();
                    view! {
                        <button
                            class="timeframe-tabs__tab"
                            role="tab"
                            class:active=move || active.get() == timeframe
                            on:click=move |_| change_timeframe(store.0, api_base.0.clone(), timeframe)
                        >
                            {timeframe.label()}
                        </button>
                    }
                }
            />
        </div>
    }
}
