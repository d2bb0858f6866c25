//! Clinic scope: which clinic's data the dashboard is currently showing.
//!
//! SYSTEM CONTEXT
//! ==============
//! Admins see the clinic registry and may pick "all" (no selection). Doctors
//! and staff see only clinics tied to their own assignments and always have
//! exactly one selected when any exist. The selection id survives reloads via
//! storage and is revalidated against each freshly fetched list.
//!
//! The resolver observes the session: logout clears the scope immediately,
//! any identity change marks it stale, and the owner re-runs [`resolve`].
//!
//! [`resolve`]: ClinicScopeResolver::resolve

#[cfg(test)]
#[path = "clinic_test.rs"]
mod clinic_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::fetch::{AuthorizedFetch, FetchError};
use crate::notify::{Notice, NoticeLevel};
use crate::session::{SessionEvent, SessionObserver};
use crate::storage::{KeyValueStore, SELECTED_CLINIC_KEY};
use crate::token::Role;

pub const ADMIN_CLINICS_ENDPOINT: &str = "/api/clinics/";
pub const DOCTOR_CLINICS_ENDPOINT: &str = "/api/doctors/my-clinics/";
pub const STAFF_CLINICS_ENDPOINT: &str = "/api/staff/my-clinics/";

/// Normalized clinic entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicSummary {
    pub clinic_id: i64,
    pub clinic_name: String,
}

/// Current clinic list and selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClinicScope {
    /// Role the list was resolved for; `None` when nothing is resolved.
    pub role: Option<Role>,
    pub clinics: Vec<ClinicSummary>,
    /// `None` means "all clinics" for admins and "no clinic" otherwise.
    pub selected: Option<ClinicSummary>,
    /// True once the session changed and the list must be re-resolved.
    pub stale: bool,
}

impl ClinicScope {
    #[must_use]
    pub fn selected_id(&self) -> Option<i64> {
        self.selected.as_ref().map(|c| c.clinic_id)
    }

    #[must_use]
    pub fn find(&self, clinic_id: i64) -> Option<&ClinicSummary> {
        self.clinics.iter().find(|c| c.clinic_id == clinic_id)
    }
}

/// Result of [`ClinicScopeResolver::set_selection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionChange {
    pub selected: Option<ClinicSummary>,
    /// When true, views tied to records under the old scope are invalid and
    /// the caller should navigate to [`collapse_path`] of the current path.
    pub changed: bool,
}

/// Endpoint listing the clinics visible to `role`.
#[must_use]
pub fn clinics_endpoint(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_CLINICS_ENDPOINT,
        Role::Doctor => DOCTOR_CLINICS_ENDPOINT,
        Role::Staff => STAFF_CLINICS_ENDPOINT,
    }
}

/// Clinic record as returned by either the registry or a "my clinics" endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClinicRecord {
    Assignment { clinic_id: i64, clinic_name: String },
    Registry { id: i64, name: String },
}

impl From<ClinicRecord> for ClinicSummary {
    fn from(record: ClinicRecord) -> Self {
        match record {
            ClinicRecord::Assignment { clinic_id, clinic_name } => Self { clinic_id, clinic_name },
            ClinicRecord::Registry { id, name } => Self { clinic_id: id, clinic_name: name },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClinicListBody {
    Plain(Vec<serde_json::Value>),
    Paginated { results: Vec<serde_json::Value> },
}

/// Normalize a clinic list response into summaries.
///
/// Accepts a bare array or a paginated `{ "results": [...] }` envelope.
/// Entries that match neither record shape are skipped; repeated clinic ids
/// keep their first occurrence.
///
/// # Errors
///
/// Returns a description when the body is not a list at all.
pub fn normalize_clinics(body: serde_json::Value) -> Result<Vec<ClinicSummary>, String> {
    let items = match serde_json::from_value::<ClinicListBody>(body) {
        Ok(ClinicListBody::Plain(items) | ClinicListBody::Paginated { results: items }) => items,
        Err(e) => return Err(e.to_string()),
    };

    let mut clinics: Vec<ClinicSummary> = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<ClinicRecord>(item) {
            Ok(record) => {
                let summary = ClinicSummary::from(record);
                if !clinics.iter().any(|c| c.clinic_id == summary.clinic_id) {
                    clinics.push(summary);
                }
            }
            Err(e) => tracing::debug!(error = %e, "skipping unrecognized clinic record"),
        }
    }
    Ok(clinics)
}

/// Pick the selection for a freshly fetched list.
///
/// Returns the selection and whether the persisted id must be rewritten
/// (`Some(Some(id))`), cleared (`Some(None)`), or left alone (`None`).
fn reconcile(
    role: Role,
    clinics: &[ClinicSummary],
    persisted: Option<i64>,
) -> (Option<ClinicSummary>, Option<Option<i64>>) {
    if let Some(id) = persisted {
        if let Some(found) = clinics.iter().find(|c| c.clinic_id == id) {
            return (Some(found.clone()), None);
        }
    }
    if !role.is_admin() {
        if let Some(first) = clinics.first() {
            return (Some(first.clone()), Some(Some(first.clinic_id)));
        }
    }
    // Non-admins with no clinics keep their stored id for the next resolve.
    if role.is_admin() && persisted.is_some() {
        return (None, Some(None));
    }
    (None, None)
}

/// Path to navigate to after the clinic scope changes.
///
/// Nested record views (`/patients/12`, `/patients/12/cases`) belong to the old
/// scope; the first segment's list view does not. Returns `None` when `path`
/// is already scope-independent.
#[must_use]
pub fn collapse_path(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = segments.next()?;
    segments.next()?;
    Some(format!("/{first}"))
}

/// Logout clears the scope; identity changes mark it stale.
pub fn apply_session_event(scope: &mut ClinicScope, event: &SessionEvent) {
    match event {
        SessionEvent::LoggedOut | SessionEvent::Initialized(None) => *scope = ClinicScope::default(),
        SessionEvent::Initialized(Some(_)) | SessionEvent::LoggedIn(_) => {
            *scope = ClinicScope { stale: true, ..ClinicScope::default() };
        }
        SessionEvent::UserUpdated(user) => {
            if scope.role != Some(user.role) {
                *scope = ClinicScope { stale: true, ..ClinicScope::default() };
            }
        }
    }
}

/// Resolves and persists the active clinic scope.
#[derive(Clone)]
pub struct ClinicScopeResolver {
    fetch: AuthorizedFetch,
    storage: Arc<dyn KeyValueStore>,
    scope: Arc<Mutex<ClinicScope>>,
}

impl ClinicScopeResolver {
    #[must_use]
    pub fn new(fetch: AuthorizedFetch) -> Self {
        let storage = fetch.session().storage();
        Self { fetch, storage, scope: Arc::new(Mutex::new(ClinicScope::default())) }
    }

    fn lock(&self) -> MutexGuard<'_, ClinicScope> {
        self.scope.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn scope(&self) -> ClinicScope {
        self.lock().clone()
    }

    fn persisted_id(&self) -> Option<i64> {
        let raw = self.storage.get(SELECTED_CLINIC_KEY)?;
        match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!(%raw, "discarding unparsable stored clinic id");
                self.storage.remove(SELECTED_CLINIC_KEY);
                None
            }
        }
    }

    fn persist(&self, id: Option<i64>) {
        match id {
            Some(id) => self.storage.set(SELECTED_CLINIC_KEY, &id.to_string()),
            None => self.storage.remove(SELECTED_CLINIC_KEY),
        }
    }

    fn clear(&self) {
        *self.lock() = ClinicScope::default();
    }

    /// React to a session transition.
    pub fn on_session_event(&self, event: &SessionEvent) {
        apply_session_event(&mut self.lock(), event);
    }

    /// Session observer that updates this resolver without keeping it alive.
    #[must_use]
    pub fn observer(&self) -> SessionObserver {
        let scope = Arc::downgrade(&self.scope);
        Arc::new(move |event: &SessionEvent| {
            if let Some(scope) = scope.upgrade() {
                apply_session_event(&mut scope.lock().unwrap_or_else(PoisonError::into_inner), event);
            }
        })
    }

    /// Fetch the clinics visible to `role` and reconcile the selection.
    ///
    /// Failures never propagate: an unauthorized response clears the scope
    /// silently (the fetch layer already notified), anything else clears it
    /// and emits a warning. A response that arrives after the session changed
    /// is dropped and the current scope returned unchanged.
    pub async fn resolve(&self, role: Role) -> ClinicScope {
        let session = self.fetch.session();
        let generation = session.generation();

        let result = self
            .fetch
            .get_json::<serde_json::Value>(clinics_endpoint(role))
            .await
            .and_then(|body| normalize_clinics(body).map_err(FetchError::Decode));

        if matches!(result, Err(FetchError::Unauthorized)) {
            self.clear();
            return self.scope();
        }
        if session.generation() != generation || session.user().is_none_or(|u| u.role != role) {
            tracing::debug!(%role, "dropping clinic list for a superseded session");
            return self.scope();
        }

        let clinics = match result {
            Ok(clinics) => clinics,
            Err(e) => {
                tracing::warn!(%role, error = %e, "failed to load clinics");
                self.clear();
                self.fetch.notifier().notify(Notice::new(
                    NoticeLevel::Warning,
                    "Clinics unavailable",
                    format!("Could not load clinics: {e}"),
                ));
                return self.scope();
            }
        };

        let (selected, persist) = reconcile(role, &clinics, self.persisted_id());
        if let Some(id) = persist {
            self.persist(id);
        }

        tracing::debug!(%role, count = clinics.len(), selected = ?selected.as_ref().map(|c| c.clinic_id), "clinic scope resolved");
        let scope = ClinicScope { role: Some(role), clinics, selected, stale: false };
        *self.lock() = scope.clone();
        scope
    }

    /// Change the active clinic.
    ///
    /// An id not in the current list is treated as "none"; non-admins then
    /// fall back to the first clinic so they are never left without one.
    pub fn set_selection(&self, clinic_id: Option<i64>) -> SelectionChange {
        let (selected, changed) = {
            let mut scope = self.lock();
            let mut selected = clinic_id.and_then(|id| scope.find(id).cloned());
            if selected.is_none() && scope.role.is_some_and(|r| !r.is_admin()) {
                selected = scope.clinics.first().cloned();
            }
            let changed = scope.selected != selected;
            scope.selected.clone_from(&selected);
            (selected, changed)
        };
        self.persist(selected.as_ref().map(|c| c.clinic_id));
        SelectionChange { selected, changed }
    }
}
