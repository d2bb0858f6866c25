//! Landing page: greeting, active clinic, and shortcuts to allowed screens.

use leptos::prelude::*;
use leptos_router::components::A;
use session::{ClinicScope, SessionSnapshot};

use crate::routes::{RouteEntry, Screen, nav_entries};
use crate::state::auth::display_name;

/// Text describing the active clinic scope.
pub fn scope_caption(scope: &ClinicScope) -> String {
    match (&scope.selected, scope.role) {
        (Some(clinic), _) => format!("Working in {}", clinic.clinic_name),
        (None, Some(role)) if role.is_admin() => "Viewing all clinics".to_owned(),
        (None, Some(_)) if scope.clinics.is_empty() && !scope.stale => "No clinic assigned".to_owned(),
        _ => String::new(),
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionSnapshot>>();
    let clinics = expect_context::<RwSignal<ClinicScope>>();

    let shortcuts = move || {
        session
            .with(|s| s.user.as_ref().map(|u| nav_entries(u.role)))
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| entry.screen != Screen::Home)
            .collect::<Vec<_>>()
    };

    view! {
        <section class="home">
            <h1>"Welcome, " {move || display_name(&session.get())}</h1>
            <p class="home__scope">{move || clinics.with(scope_caption)}</p>
            <div class="home__cards">
                <For
                    each=shortcuts
                    key=|entry| entry.path()
                    children=|entry: &'static RouteEntry| {
                        view! { <A href=entry.path() attr:class="home__card">{entry.title}</A> }
                    }
                />
            </div>
        </section>
    }
}
