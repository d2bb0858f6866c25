//! Email + password login page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Validation runs locally first. A successful login updates the session
//! mirror, and the effect below moves the user on: to the change-password
//! screen when a reset is pending, otherwise home.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use session::account::validate_login_input;
use session::guard::after_login_path;
use session::{SessionContext, SessionSnapshot};

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<SessionContext>();
    let session = expect_context::<RwSignal<SessionSnapshot>>();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    Effect::new(move || {
        if let Some(target) = after_login_path(&session.get()) {
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = match validate_login_input(&email.get(), &password.get()) {
            Ok(value) => value,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Signing in...".to_owned());

        #[cfg(feature = "csr")]
        {
            let ctx = ctx.clone();
            let password_value = password.get();
            leptos::task::spawn_local(async move {
                match ctx.session.login(&email_value, &password_value).await {
                    Ok(_) => {
                        let _ = info.try_set(String::new());
                    }
                    Err(e) => {
                        let _ = info.try_set(e.to_string());
                    }
                }
                let _ = busy.try_set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&ctx, email_value);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Jamii Clinic"</h1>
                <p class="login-card__subtitle">"Sign in to continue"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
