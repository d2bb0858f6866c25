//! Reactive mirror of the session and clinic scope.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` notifies observers synchronously after every identity
//! change. [`mirror_observer`] forwards those events into signals so guards
//! and the sidebar re-evaluate immediately, including after a 401 ends the
//! session mid-request.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use leptos::prelude::*;
use session::clinic::apply_session_event;
use session::session::SessionObserver;
use session::{ClinicScope, SessionEvent, SessionSnapshot};

/// Apply `event` to a snapshot mirror.
pub fn mirror_event(snapshot: &mut SessionSnapshot, event: &SessionEvent) {
    let previous = snapshot.user.clone();
    snapshot.loading = false;
    snapshot.user = match event {
        SessionEvent::Initialized(user) => user.clone(),
        SessionEvent::LoggedIn(user) | SessionEvent::UserUpdated(user) => Some(user.clone()),
        SessionEvent::LoggedOut => None,
    };
    let same_identity = match (&previous, &snapshot.user) {
        (Some(a), Some(b)) => a.id == b.id && a.role == b.role,
        (None, None) => true,
        _ => false,
    };
    if !same_identity {
        snapshot.generation += 1;
    }
}

/// Observer keeping the session and clinic signals in step with the store.
pub fn mirror_observer(session: RwSignal<SessionSnapshot>, clinics: RwSignal<ClinicScope>) -> SessionObserver {
    Arc::new(move |event: &SessionEvent| {
        // Signals may already be disposed during teardown.
        let _ = session.try_update(|s| mirror_event(s, event));
        let _ = clinics.try_update(|scope| apply_session_event(scope, event));
    })
}

/// Display name for the header, falling back to the email.
pub fn display_name(snapshot: &SessionSnapshot) -> String {
    snapshot.user.as_ref().map_or_else(String::new, |user| {
        if user.name.trim().is_empty() { user.email.clone() } else { user.name.clone() }
    })
}
