//! HTTP transport seam.
//!
//! The core never talks to a concrete HTTP stack. Browser builds supply a
//! `gloo-net` transport, native builds use [`ReqwestTransport`], and tests use
//! a scripted mock. Futures are not required to be `Send` so single-threaded
//! WASM clients qualify.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use serde::de::DeserializeOwned;

/// HTTP verb subset used by the dashboard API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Outbound request body.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Serialized as JSON; defaults the content type to `application/json`.
    Json(serde_json::Value),
    /// Opaque bytes such as an encoded multipart form. The caller owns the
    /// content type; no JSON default is applied.
    Binary { bytes: Vec<u8>, content_type: Option<String> },
}

/// Fully resolved request handed to a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: RequestBody::Empty }
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Serialized body bytes, if any.
    #[must_use]
    pub fn body_bytes(&self) -> Option<Vec<u8>> {
        match &self.body {
            RequestBody::Empty => None,
            RequestBody::Json(value) => Some(value.to_string().into_bytes()),
            RequestBody::Binary { bytes, .. } => Some(bytes.clone()),
        }
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Response status and raw body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossy.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Decode the body as a JSON value, treating an empty or invalid body as `Null`.
    #[must_use]
    pub fn json_value(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Failure below the HTTP layer (no status was received).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("network request failed: {0}")]
    Network(String),
    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// No transport is available in this build (e.g. server-side rendering).
    #[error("http transport unavailable in this environment")]
    Unavailable,
}

/// Sends a single request and returns whatever status the server produced.
#[async_trait::async_trait(?Send)]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(feature = "reqwest")]
pub use native::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod native {
    use std::time::Duration;

    use super::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, TransportError};
    use crate::config::ApiConfig;

    /// Native transport backed by a shared `reqwest::Client`.
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Build a client using the timeouts in `config`.
        ///
        /// # Errors
        ///
        /// Returns [`TransportError::InvalidRequest`] if the client cannot be built.
        pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .build()
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            Ok(Self { http })
        }
    }

    fn to_reqwest(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = self.http.request(to_reqwest(request.method), &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder = match request.body {
                RequestBody::Empty => builder,
                RequestBody::Json(value) => builder.body(value.to_string()),
                RequestBody::Binary { bytes, .. } => builder.body(bytes),
            };

            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            Ok(HttpResponse { status, body: body.to_vec() })
        }
    }
}
