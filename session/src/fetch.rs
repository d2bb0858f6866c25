//! Authorized fetch: every authenticated API call goes through here.
//!
//! ERROR HANDLING
//! ==============
//! This is the single chokepoint for session-invalidating failures. A 401
//! notifies the user, clears the session, and returns
//! [`FetchError::Unauthorized`] before control returns to the caller, so no
//! caller ever sees a 401 body as data. Callers should treat `Unauthorized` as
//! already reported and skip their own error toast. Every other status is
//! handed back to the caller unchanged; there are no retries.

#[cfg(test)]
#[path = "fetch_test.rs"]
mod fetch_test;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::notify::{Notice, Notifier};
use crate::session::SessionStore;
use crate::transport::{HttpRequest, HttpResponse, Method, RequestBody, TransportError, find_header};

/// Fallback text when an error payload has nothing renderable.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failure of an authorized call.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server returned 401; the session has already been cleared.
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Non-2xx response other than 401.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// A 2xx body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Caller-supplied request options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self { method: Some(Method::Get), ..Self::default() }
    }

    #[must_use]
    pub fn delete() -> Self {
        Self { method: Some(Method::Delete), ..Self::default() }
    }

    #[must_use]
    pub fn json(method: Method, body: Value) -> Self {
        Self { method: Some(method), body: RequestBody::Json(body), ..Self::default() }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

/// Bearer-attaching request dispatcher bound to a [`SessionStore`].
#[derive(Clone)]
pub struct AuthorizedFetch {
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl AuthorizedFetch {
    #[must_use]
    pub fn new(session: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self { session, notifier }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    /// Merge credentials and defaults into the caller's options.
    ///
    /// Caller headers are never overwritten. `Authorization` is added only
    /// when a token exists; `Content-Type` defaults to JSON unless the body is
    /// a binary payload.
    #[must_use]
    pub fn build_request(&self, endpoint: &str, options: RequestOptions) -> HttpRequest {
        let mut headers = options.headers;

        if let Some(token) = self.session.token() {
            if find_header(&headers, "Authorization").is_none() {
                headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
            }
        }

        if find_header(&headers, "Content-Type").is_none() {
            match &options.body {
                RequestBody::Binary { content_type: Some(content_type), .. } => {
                    headers.push(("Content-Type".to_owned(), content_type.clone()));
                }
                RequestBody::Binary { content_type: None, .. } => {}
                RequestBody::Empty | RequestBody::Json(_) => {
                    headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
                }
            }
        }

        HttpRequest {
            method: options.method.unwrap_or(Method::Get),
            url: self.session.api().url(endpoint),
            headers,
            body: options.body,
        }
    }

    /// Send one request.
    ///
    /// # Errors
    ///
    /// [`FetchError::Unauthorized`] on 401 (after notifying and logging out),
    /// [`FetchError::Transport`] when no response arrived. Other statuses are
    /// returned as `Ok` for the caller to inspect.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<HttpResponse, FetchError> {
        let request = self.build_request(endpoint, options);
        let method = request.method;
        let response = self.session.transport().send(request).await?;

        if response.status == 401 {
            tracing::warn!(method = method.as_str(), %endpoint, "session rejected by api");
            self.notifier.notify(Notice::session_expired());
            self.session.logout();
            return Err(FetchError::Unauthorized);
        }

        tracing::debug!(method = method.as_str(), %endpoint, status = response.status, "api response");
        Ok(response)
    }

    /// Send a request and decode a 2xx JSON body as `T`.
    ///
    /// Empty 2xx bodies decode as JSON `null`, so `T = ()` or `Option<_>`
    /// works for `204 No Content`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::request`] returns, plus [`FetchError::Status`] for
    /// non-2xx responses and [`FetchError::Decode`] for mismatched bodies.
    pub async fn json<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T, FetchError> {
        let response = self.request(endpoint, options).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
                message: error_message(&response.json_value(), GENERIC_ERROR_MESSAGE),
            });
        }
        serde_json::from_value(response.json_value()).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// `GET endpoint` decoded as `T`.
    ///
    /// # Errors
    ///
    /// See [`Self::json`].
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        self.json(endpoint, RequestOptions::get()).await
    }

    /// Send `body` as JSON with `method` and decode the reply as `T`.
    ///
    /// # Errors
    ///
    /// See [`Self::json`]. Serialization failures map to [`FetchError::Decode`].
    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, FetchError> {
        let body = serde_json::to_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        self.json(endpoint, RequestOptions::json(method, body)).await
    }
}

/// Render an API error payload as a single message.
///
/// Prefers `detail`, then `message`, then field-keyed validation errors
/// (`{"email": ["already taken"]}` becomes `email: already taken`).
#[must_use]
pub fn error_message(payload: &Value, fallback: &str) -> String {
    match payload {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Object(map) => {
            for key in ["detail", "message", "error"] {
                if let Some(Value::String(s)) = map.get(key) {
                    if !s.trim().is_empty() {
                        return s.clone();
                    }
                }
            }
            let lines: Vec<String> = map
                .iter()
                .filter_map(|(field, value)| {
                    let text = flatten_messages(value);
                    if text.trim().is_empty() {
                        return None;
                    }
                    if field == "non_field_errors" {
                        Some(text)
                    } else {
                        Some(format!("{field}: {text}"))
                    }
                })
                .collect();
            if lines.is_empty() { fallback.to_owned() } else { lines.join("\n") }
        }
        Value::Array(_) => {
            let text = flatten_messages(payload);
            if text.is_empty() { fallback.to_owned() } else { text }
        }
        _ => fallback.to_owned(),
    }
}

fn flatten_messages(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_messages)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(_) | Value::Null => String::new(),
    }
}
