//! Single guard component for every protected route.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard reads the session mirror and the current path, looks the path
//! up in the route table, and asks `session::guard::decide` what to do.
//! Protected children are only constructed for `GuardOutcome::Render`.

#[cfg(test)]
#[path = "route_guard_test.rs"]
mod route_guard_test;

use leptos::prelude::*;
use leptos::tachys::view::any_view::IntoAny;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};
use session::guard::decide;
use session::{GuardOutcome, RouteRequirement, SessionSnapshot};

use crate::pages::not_found::NotFoundPage;
use crate::routes::requirement_for;

/// Guard decision for `path`, including paths missing from the route table.
///
/// Unknown paths still send signed-out users to login; signed-in users get
/// not-found.
pub fn guard_outcome(snapshot: &SessionSnapshot, path: &str) -> GuardOutcome {
    match requirement_for(path) {
        Some(requirement) => decide(snapshot, &requirement, path),
        None => match decide(snapshot, &RouteRequirement::any_role(), path) {
            GuardOutcome::Render => GuardOutcome::NotFound,
            other => other,
        },
    }
}

#[component]
pub fn RouteGuard(children: ChildrenFn) -> impl IntoView {
    let session = expect_context::<RwSignal<SessionSnapshot>>();
    let location = use_location();
    let navigate = use_navigate();

    let outcome = Memo::new(move |_| guard_outcome(&session.get(), &location.pathname.get()));

    Effect::new(move || {
        if let GuardOutcome::Redirect(target) = outcome.get() {
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    move || match outcome.get() {
        GuardOutcome::Loading => view! { <div class="page-loading">"Loading..."</div> }.into_any(),
        GuardOutcome::Render => children().into_any(),
        GuardOutcome::NotFound => view! { <NotFoundPage/> }.into_any(),
        GuardOutcome::Redirect(_) => ().into_any(),
    }
}
