//! Session store: the single source of truth for "who is logged in".
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards read [`SessionSnapshot`]s, `AuthorizedFetch` reads the token
//! and calls [`SessionStore::logout`] on 401, and the clinic scope resolver
//! subscribes to [`SessionEvent`]s to know when to recompute.
//!
//! DESIGN
//! ======
//! Token and user are always replaced together under one lock, so no reader
//! can observe a token without its decoded user or vice versa. Observers run
//! synchronously after the lock is released. `generation` increments on every
//! identity change so async callers can tell whether a response still belongs
//! to the session that issued the request.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use crate::config::ApiConfig;
use crate::fetch::error_message;
use crate::storage::{KeyValueStore, TOKEN_KEY};
use crate::token::{TokenError, User, decode_token};
use crate::transport::{HttpRequest, HttpTransport, Method, RequestBody, TransportError};

/// Authentication endpoint.
pub const LOGIN_ENDPOINT: &str = "/api/login/";
/// Message used when a failed login carries no server-provided reason.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

/// Error returned by [`SessionStore::login`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The server refused the credentials; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The server accepted the credentials but the issued token is unusable.
    #[error("received an invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    /// A 2xx response did not contain an `access` token.
    #[error("unexpected login response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Identity transitions broadcast to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Startup decode finished; `None` when no valid token was stored.
    Initialized(Option<User>),
    LoggedIn(User),
    LoggedOut,
    /// Same account, refreshed claims (e.g. after a password change).
    UserUpdated(User),
}

/// Read-only view of the session for rendering and guards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub loading: bool,
    pub generation: u64,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self { user: None, loading: true, generation: 0 }
    }
}

pub type SessionObserver = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Debug)]
struct SessionInner {
    token: Option<String>,
    user: Option<User>,
    loading: bool,
    initialized: bool,
    generation: u64,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
}

/// Cheaply cloneable handle to the shared session.
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<ApiConfig>,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn KeyValueStore>,
    inner: Arc<Mutex<SessionInner>>,
    observers: Arc<Mutex<Vec<SessionObserver>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: ApiConfig, transport: Arc<dyn HttpTransport>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api: Arc::new(api),
            transport,
            storage,
            inner: Arc::new(Mutex::new(SessionInner {
                token: None,
                user: None,
                loading: true,
                initialized: false,
                generation: 0,
            })),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    #[must_use]
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    #[must_use]
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.storage)
    }

    /// Register an observer for identity transitions.
    pub fn subscribe(&self, observer: SessionObserver) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    fn emit(&self, event: &SessionEvent) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer(event);
        }
    }

    /// Restore the session from persisted storage.
    ///
    /// Runs once per store; later calls return the current user without
    /// touching storage. A stored token that fails to decode is removed.
    pub fn initialize(&self) -> Option<User> {
        {
            let mut inner = self.lock();
            if inner.initialized {
                return inner.user.clone();
            }
            inner.initialized = true;
        }

        let restored = self.storage.get(TOKEN_KEY).and_then(|token| match decode_token(&token) {
            Ok(user) => Some((token, user)),
            Err(e) => {
                tracing::debug!(error = %e, "discarding undecodable stored token");
                self.storage.remove(TOKEN_KEY);
                None
            }
        });

        let user = {
            let mut inner = self.lock();
            let (token, user) = restored.map_or((None, None), |(t, u)| (Some(t), Some(u)));
            inner.token = token;
            inner.user.clone_from(&user);
            inner.loading = false;
            inner.generation += 1;
            user
        };

        if let Some(user) = &user {
            tracing::info!(user_id = %user.id, role = %user.role, "session restored");
        }
        self.emit(&SessionEvent::Initialized(user.clone()));
        user
    }

    /// Authenticate against the login endpoint and replace the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] with the server's `detail` (or a
    /// generic message) on a non-2xx status. On any error the existing session
    /// is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let mut request = HttpRequest::new(Method::Post, self.api.url(LOGIN_ENDPOINT));
        request
            .headers
            .push(("Content-Type".to_owned(), "application/json".to_owned()));
        request.body = RequestBody::Json(serde_json::json!({ "email": email, "password": password }));

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let message = error_message(&response.json_value(), LOGIN_FALLBACK_MESSAGE);
            tracing::info!(status = response.status, "login rejected");
            return Err(SessionError::Rejected(message));
        }

        let body: LoginResponse = response
            .json()
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;
        let user = decode_token(&body.access)?;

        {
            let mut inner = self.lock();
            inner.token = Some(body.access.clone());
            inner.user = Some(user.clone());
            inner.loading = false;
            inner.generation += 1;
        }
        self.storage.set(TOKEN_KEY, &body.access);

        tracing::info!(user_id = %user.id, role = %user.role, "logged in");
        self.emit(&SessionEvent::LoggedIn(user.clone()));
        Ok(user)
    }

    /// Clear the session and the persisted token. Safe to call repeatedly.
    pub fn logout(&self) {
        let had_session = {
            let mut inner = self.lock();
            let had_session = inner.token.is_some() || inner.user.is_some();
            inner.token = None;
            inner.user = None;
            if had_session {
                inner.generation += 1;
            }
            had_session
        };
        self.storage.remove(TOKEN_KEY);

        if had_session {
            tracing::info!("logged out");
            self.emit(&SessionEvent::LoggedOut);
        }
    }

    /// Replace the token for the current account (e.g. one reissued after a
    /// password change).
    ///
    /// # Errors
    ///
    /// Returns the decode error and leaves the session untouched when the new
    /// token is unusable.
    ///
    /// A token for a different account or role is reported as `LoggedIn`.
    pub fn adopt_token(&self, token: &str) -> Result<User, TokenError> {
        let user = decode_token(token)?;
        let identity_changed = {
            let mut inner = self.lock();
            let identity_changed = inner
                .user
                .as_ref()
                .is_none_or(|current| current.id != user.id || current.role != user.role);
            inner.token = Some(token.to_owned());
            inner.user = Some(user.clone());
            if identity_changed {
                inner.generation += 1;
            }
            identity_changed
        };
        self.storage.set(TOKEN_KEY, token);
        if identity_changed {
            tracing::debug!(user_id = %user.id, role = %user.role, "adopted token for a new identity");
            self.emit(&SessionEvent::LoggedIn(user.clone()));
        } else {
            self.emit(&SessionEvent::UserUpdated(user.clone()));
        }
        Ok(user)
    }

    /// Drop the forced password reset flag from the in-memory user.
    pub fn clear_password_reset(&self) {
        let updated = {
            let mut inner = self.lock();
            match inner.user.as_mut() {
                Some(user) if user.must_change_password => {
                    user.must_change_password = false;
                    Some(user.clone())
                }
                _ => None,
            }
        };
        if let Some(user) = updated {
            self.emit(&SessionEvent::UserUpdated(user));
        }
    }

    /// Current bearer token. Never performs I/O.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot { user: inner.user.clone(), loading: inner.loading, generation: inner.generation }
    }
}
