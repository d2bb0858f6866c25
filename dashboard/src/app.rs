//! Root application component with routing and context providers.
//!
//! ARCHITECTURE
//! ============
//! `App` builds the one `SessionContext` for the page over browser seams,
//! mirrors its events into signals, and provides both through context.
//! Initialization runs synchronously before the first render; the clinic
//! scope is resolved asynchronously whenever the signed-in identity changes.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};
use session::{ApiConfig, ClinicScope, SessionContext, SessionSnapshot};

use crate::components::route_guard::RouteGuard;
use crate::components::shell::Shell;
use crate::components::toast_stack::ToastStack;
use crate::net::notifier::ToastNotifier;
use crate::net::storage::LocalStorage;
use crate::net::transport::GlooTransport;
use crate::pages::{
    change_password::ChangePasswordPage,
    home::HomePage,
    login::LoginPage,
    not_found::NotFoundPage,
    resource::{ResourceDetailPage, ResourceListPage},
};
use crate::state::{auth::mirror_observer, toast::ToastState};

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionSnapshot::default());
    let clinics = RwSignal::new(ClinicScope::default());
    let toasts = RwSignal::new(ToastState::default());

    let ctx = SessionContext::new(
        ApiConfig::same_origin(),
        Arc::new(GlooTransport),
        Arc::new(LocalStorage),
        Arc::new(ToastNotifier::new(toasts)),
    );
    ctx.session.subscribe(mirror_observer(session, clinics));

    provide_context(session);
    provide_context(clinics);
    provide_context(toasts);
    provide_context(ctx.clone());

    ctx.session.initialize();
    install_scope_refresh(ctx, session, clinics);

    view! {
        <Title text="Jamii Clinic"/>

        <Router>
            <ToastStack/>
            <Routes fallback=|| view! { <RouteGuard><NotFoundPage/></RouteGuard> }>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route
                    path=StaticSegment("change-password")
                    view=|| view! { <RouteGuard><ChangePasswordPage/></RouteGuard> }
                />
                <Route
                    path=StaticSegment("")
                    view=|| view! { <RouteGuard><Shell><HomePage/></Shell></RouteGuard> }
                />
                <Route
                    path=ParamSegment("resource")
                    view=|| view! { <RouteGuard><Shell><ResourceListPage/></Shell></RouteGuard> }
                />
                <Route
                    path=(ParamSegment("resource"), ParamSegment("id"))
                    view=|| view! { <RouteGuard><Shell><ResourceDetailPage/></Shell></RouteGuard> }
                />
            </Routes>
        </Router>
    }
}

/// Resolve the clinic scope whenever a signed-in identity leaves it stale.
fn install_scope_refresh(ctx: SessionContext, session: RwSignal<SessionSnapshot>, clinics: RwSignal<ClinicScope>) {
    Effect::new(move || {
        let signed_in = session.with(|s| s.user.is_some());
        if !signed_in || !clinics.with_untracked(|scope| scope.stale) {
            return;
        }
        #[cfg(feature = "csr")]
        {
            let ctx = ctx.clone();
            leptos::task::spawn_local(async move {
                let scope = ctx.refresh_scope().await;
                let _ = clinics.try_set(scope);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = &ctx;
        }
    });
}
