//! Route table with per-route role requirements.
//!
//! DESIGN
//! ======
//! Every guarded screen is declared once here. The router, the sidebar, and
//! the guard component all read this table, so a screen's allowed roles live
//! in exactly one place. Nested paths (`/patients/12`) inherit the
//! requirement of their first segment.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use session::guard::{CHANGE_PASSWORD_PATH, HOME_PATH};
use session::resource::ResourceKind;
use session::{Role, RouteRequirement};

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const CLINICAL: &[Role] = &[Role::Admin, Role::Doctor];

/// What a route renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    ChangePassword,
    Resource(ResourceKind),
}

/// One guarded route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub screen: Screen,
    pub title: &'static str,
    /// `None` admits every authenticated role.
    pub roles: Option<&'static [Role]>,
    /// Listed in the sidebar.
    pub in_nav: bool,
}

const fn resource(kind: ResourceKind, title: &'static str, roles: Option<&'static [Role]>) -> RouteEntry {
    RouteEntry { screen: Screen::Resource(kind), title, roles, in_nav: true }
}

pub const ROUTES: &[RouteEntry] = &[
    RouteEntry { screen: Screen::Home, title: "Dashboard", roles: None, in_nav: true },
    RouteEntry { screen: Screen::ChangePassword, title: "Change Password", roles: None, in_nav: false },
    resource(ResourceKind::Clinics, "Clinics", Some(ADMIN_ONLY)),
    resource(ResourceKind::Doctors, "Doctors", Some(ADMIN_ONLY)),
    resource(ResourceKind::Staff, "Staff", Some(ADMIN_ONLY)),
    resource(ResourceKind::Patients, "Patients", None),
    resource(ResourceKind::MedicalCases, "Medical Cases", Some(CLINICAL)),
    resource(ResourceKind::MedicalRecords, "Medical Records", Some(CLINICAL)),
    resource(ResourceKind::Complications, "Complications", Some(CLINICAL)),
    resource(ResourceKind::TreatmentSchedules, "Treatment Schedules", None),
];

impl RouteEntry {
    #[must_use]
    pub fn path(&self) -> String {
        match self.screen {
            Screen::Home => HOME_PATH.to_owned(),
            Screen::ChangePassword => CHANGE_PASSWORD_PATH.to_owned(),
            Screen::Resource(kind) => format!("/{}", kind.slug()),
        }
    }

    #[must_use]
    pub fn requirement(&self) -> RouteRequirement {
        self.roles.map_or_else(RouteRequirement::any_role, RouteRequirement::roles)
    }
}

/// Find the entry governing `path`, if any.
#[must_use]
pub fn lookup(path: &str) -> Option<&'static RouteEntry> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let Some(first) = segments.next() else {
        return find(Screen::Home);
    };
    let nested = segments.next().is_some();
    if format!("/{first}") == CHANGE_PASSWORD_PATH {
        return if nested { None } else { find(Screen::ChangePassword) };
    }
    // Resource routes parse their slug strictly; underscores are not routes.
    if first.contains('_') {
        return None;
    }
    let kind = first.parse::<ResourceKind>().ok()?;
    find(Screen::Resource(kind))
}

/// Requirement for `path`; unknown paths have none and render not-found.
#[must_use]
pub fn requirement_for(path: &str) -> Option<RouteRequirement> {
    lookup(path).map(RouteEntry::requirement)
}

fn find(screen: Screen) -> Option<&'static RouteEntry> {
    ROUTES.iter().find(|entry| entry.screen == screen)
}

/// Sidebar entries visible to `role`.
#[must_use]
pub fn nav_entries(role: Role) -> Vec<&'static RouteEntry> {
    ROUTES
        .iter()
        .filter(|entry| entry.in_nav && entry.requirement().admits(role))
        .collect()
}
