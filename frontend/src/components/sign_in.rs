use leptos::*;
use wasm_bindgen_futures::spawn_local;

use crate::auth::{self, Session};

use super::dashboard::{ApiBase, SessionSignal};

#[component]
pub fn SignIn() -> impl IntoView {
    let session = use_context::<SessionSignal>().expect("session context missing");
    let api_base = use_context::<ApiBase>().expect("api base context missing");
    let login_href = auth::login_url(&api_base.0);

    view! {
        <div class="sign-in">
            <Show
                when=move || session.0.with(Option::is_some)
                fallback=move || {
                    view! {
                        <a class="sign-in__button" href=login_href.clone()>
                            "Sign in through Steam"
                        </a>
                    }
                }
            >
                {
                    let api_base = api_base.clone();
                    move || {
                        let api_base = api_base.clone();
                        session.0.get().map(|user| {
                            view! {
                                <div class="sign-in__user">
                                    {user.image.clone().map(|src| view! { <img class="sign-in__avatar" src=src alt="" /> })}
                                    <span class="sign-in__name">{user.name.clone()}</span>
                                    <button
                                        class="sign-in__button sign-in__button--secondary"
                                        on:click=move |_| end_session(session, api_base.0.clone())
                                    >
                                        "Sign out"
                                    </button>
                                </div>
                            }
                        })
                    }
                }
            </Show>
        </div>
    }
}

fn end_session(session: SessionSignal, api_base: String) {
    let Some(Session { access_token, .. }) = session.0.get_untracked() else {
        return;
    };
    session.0.set(None);
    auth::store_token(None);
    spawn_local(async move {
        if let Err(err) = auth::sign_out(&api_base, &access_token).await {
            log::warn!("sign-out request failed: {err}");
        }
    });
}
