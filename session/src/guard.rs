//! Route guard: may the current view render?
//!
//! DESIGN
//! ======
//! Routes declare their role requirement once; the guard evaluates it
//! together with the session snapshot and the active path. Nothing protected
//! renders outside [`GuardState::Authorized`]. Forbidden routes render a
//! not-found page so their existence is not revealed.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::session::SessionSnapshot;
use crate::token::Role;

pub const LOGIN_PATH: &str = "/login";
pub const CHANGE_PASSWORD_PATH: &str = "/change-password";
pub const HOME_PATH: &str = "/";

/// Per-route capability requirement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    /// `None` admits any authenticated role.
    pub roles: Option<Vec<Role>>,
}

impl RouteRequirement {
    #[must_use]
    pub fn any_role() -> Self {
        Self { roles: None }
    }

    #[must_use]
    pub fn roles(roles: &[Role]) -> Self {
        Self { roles: Some(roles.to_vec()) }
    }

    #[must_use]
    pub fn admits(&self, role: Role) -> bool {
        self.roles.as_ref().is_none_or(|roles| roles.contains(&role))
    }
}

/// Where a protected route stands for the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    /// Session initialization has not finished.
    Resolving,
    Unauthenticated,
    /// The user must change their password before anything else.
    ForcedReset,
    Authorized,
    /// Authenticated but the route requires a different role.
    Forbidden,
}

/// What the guard component should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Neutral loading indicator.
    Loading,
    Render,
    NotFound,
    /// Render nothing and navigate.
    Redirect(String),
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { HOME_PATH } else { trimmed }
}

/// Classify the session against a route.
#[must_use]
pub fn evaluate(session: &SessionSnapshot, requirement: &RouteRequirement, path: &str) -> GuardState {
    if session.loading {
        return GuardState::Resolving;
    }
    let Some(user) = session.user.as_ref() else {
        return GuardState::Unauthenticated;
    };
    if user.must_change_password && normalize(path) != CHANGE_PASSWORD_PATH {
        return GuardState::ForcedReset;
    }
    if !requirement.admits(user.role) {
        return GuardState::Forbidden;
    }
    GuardState::Authorized
}

/// Decide what to render for `path`.
#[must_use]
pub fn decide(session: &SessionSnapshot, requirement: &RouteRequirement, path: &str) -> GuardOutcome {
    let on_reset_route = normalize(path) == CHANGE_PASSWORD_PATH;
    match evaluate(session, requirement, path) {
        GuardState::Resolving => GuardOutcome::Loading,
        GuardState::Unauthenticated => GuardOutcome::Redirect(LOGIN_PATH.to_owned()),
        GuardState::ForcedReset => GuardOutcome::Redirect(CHANGE_PASSWORD_PATH.to_owned()),
        GuardState::Forbidden => GuardOutcome::NotFound,
        GuardState::Authorized => {
            let reset_pending = session.user.as_ref().is_some_and(|u| u.must_change_password);
            if on_reset_route && !reset_pending {
                GuardOutcome::Redirect(HOME_PATH.to_owned())
            } else {
                GuardOutcome::Render
            }
        }
    }
}

/// Where the login page should send an already authenticated user.
#[must_use]
pub fn after_login_path(session: &SessionSnapshot) -> Option<&'static str> {
    let user = session.user.as_ref()?;
    if user.must_change_password {
        Some(CHANGE_PASSWORD_PATH)
    } else {
        Some(HOME_PATH)
    }
}
