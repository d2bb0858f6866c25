//! Account actions and client-side form validation.
//!
//! Validation runs before any request is built; invalid input never reaches
//! the network.

#[cfg(test)]
#[path = "account_test.rs"]
mod account_test;

use serde::Deserialize;

use crate::fetch::{AuthorizedFetch, FetchError};
use crate::token::User;
use crate::transport::Method;

pub const CHANGE_PASSWORD_ENDPOINT: &str = "/api/change-password/";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validate login form input; returns the trimmed email.
///
/// # Errors
///
/// Returns the message to show next to the form.
pub fn validate_login_input(email: &str, password: &str) -> Result<String, &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    Ok(email.to_owned())
}

/// Validate the change-password form.
///
/// # Errors
///
/// Returns the message to show next to the form.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), &'static str> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err("Fill in all password fields.");
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err("New password must be at least 8 characters.");
    }
    if new != confirm {
        return Err("New passwords do not match.");
    }
    if new == current {
        return Err("New password must differ from the current one.");
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ChangePasswordResponse {
    #[serde(default)]
    access: Option<String>,
}

/// Change the signed-in user's password and lift any forced-reset flag.
///
/// When the server reissues a token it replaces the current one; otherwise the
/// flag is cleared on the in-memory user.
///
/// # Errors
///
/// Propagates [`FetchError`]s; `Unauthorized` has already ended the session.
pub async fn change_password(fetch: &AuthorizedFetch, current: &str, new: &str) -> Result<Option<User>, FetchError> {
    let body = serde_json::json!({ "old_password": current, "new_password": new });
    let response: Option<ChangePasswordResponse> =
        fetch.send_json(Method::Post, CHANGE_PASSWORD_ENDPOINT, &body).await?;

    let session = fetch.session();
    if let Some(token) = response.and_then(|r| r.access) {
        match session.adopt_token(&token) {
            Ok(_) => return Ok(session.user()),
            Err(e) => tracing::warn!(error = %e, "ignoring undecodable token from password change"),
        }
    }
    session.clear_password_reset();
    Ok(session.user())
}
