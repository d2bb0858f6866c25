//! Change-password page, the only screen open while a reset is pending.
//!
//! On success the session user loses its reset flag and the route guard
//! sends the user home.

use leptos::prelude::*;
use session::account::validate_password_change;
use session::{SessionContext, SessionSnapshot};
#[cfg(feature = "csr")]
use session::{Notice, NoticeLevel, Notifier, account::change_password};

#[component]
pub fn ChangePasswordPage() -> impl IntoView {
    let ctx = expect_context::<SessionContext>();
    let auth = expect_context::<RwSignal<SessionSnapshot>>();

    let current = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let forced = move || auth.with(|s| s.user.as_ref().is_some_and(|u| u.must_change_password));

    let logout_ctx = ctx.clone();
    let on_logout = move |_| logout_ctx.session.logout();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (current_value, new_value) = (current.get(), new_password.get());
        if let Err(message) = validate_password_change(&current_value, &new_value, &confirm.get()) {
            info.set(message.to_owned());
            return;
        }
        busy.set(true);
        info.set("Updating password...".to_owned());

        #[cfg(feature = "csr")]
        {
            let fetch = ctx.fetch.clone();
            leptos::task::spawn_local(async move {
                match change_password(&fetch, &current_value, &new_value).await {
                    Ok(_) => fetch.notifier().notify(Notice::new(
                        NoticeLevel::Success,
                        "Password updated",
                        "Your password has been changed.",
                    )),
                    // The session has ended; the guard redirects to login.
                    Err(e) if e.is_unauthorized() => {}
                    Err(e) => {
                        let _ = info.try_set(e.to_string());
                    }
                }
                let _ = busy.try_set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&ctx, current_value, new_value);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Change Password"</h1>
                <Show when=forced>
                    <p class="login-card__subtitle">"You must set a new password before continuing."</p>
                </Show>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Current password"
                        autocomplete="current-password"
                        prop:value=move || current.get()
                        on:input=move |ev| current.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="New password"
                        autocomplete="new-password"
                        prop:value=move || new_password.get()
                        on:input=move |ev| new_password.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Confirm new password"
                        autocomplete="new-password"
                        prop:value=move || confirm.get()
                        on:input=move |ev| confirm.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Update Password"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <button class="btn login-card__logout" on:click=on_logout>"Log out"</button>
            </div>
        </div>
    }
}
