//! Authenticated layout: sidebar navigation, clinic picker, user header.
//!
//! SYSTEM CONTEXT
//! ==============
//! Navigation entries come from the route table filtered by role, so the
//! sidebar never links to a screen the guard would refuse.

use leptos::prelude::*;
use leptos_router::components::A;
use session::{SessionContext, SessionSnapshot};

use crate::components::clinic_selector::ClinicSelector;
use crate::routes::{RouteEntry, nav_entries};
use crate::state::auth::display_name;

#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let ctx = expect_context::<SessionContext>();
    let session = expect_context::<RwSignal<SessionSnapshot>>();

    let entries = move || {
        session
            .with(|s| s.user.as_ref().map(|u| nav_entries(u.role)))
            .unwrap_or_default()
    };
    let avatar = move || session.with(|s| s.user.as_ref().map(|u| u.avatar.clone()).unwrap_or_default());
    let role = move || session.with(|s| s.user.as_ref().map(|u| u.role.to_string()).unwrap_or_default());

    // The guard redirects to /login once the session mirror empties.
    let on_logout = move |_| ctx.session.logout();

    view! {
        <div class="shell">
            <aside class="sidebar">
                <div class="sidebar__brand">"Jamii Clinic"</div>
                <ClinicSelector/>
                <nav class="sidebar__nav">
                    <For
                        each=entries
                        key=|entry| entry.path()
                        children=|entry: &'static RouteEntry| {
                            view! { <A href=entry.path() attr:class="sidebar__link">{entry.title}</A> }
                        }
                    />
                </nav>
            </aside>
            <div class="shell__main">
                <header class="shell__header">
                    <img class="shell__avatar" src=avatar alt=""/>
                    <span class="shell__user">{move || display_name(&session.get())}</span>
                    <span class="shell__role">{role}</span>
                    <button class="btn shell__logout" on:click=on_logout>"Log out"</button>
                </header>
                <main class="shell__content">{children()}</main>
            </div>
        </div>
    }
}
