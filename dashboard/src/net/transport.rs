//! `gloo-net` transport.
//!
//! ERROR HANDLING
//! ==============
//! Fetch failures map to `TransportError::Network`; request construction
//! failures to `InvalidRequest`. Non-2xx statuses are not errors here; the
//! authorized fetch layer interprets them.

#![allow(clippy::unused_async)]

use session::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Transport backed by the browser's `fetch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

#[cfg(feature = "csr")]
fn gloo_method(method: session::Method) -> gloo_net::http::Method {
    use gloo_net::http::Method as M;
    match method {
        session::Method::Get => M::GET,
        session::Method::Post => M::POST,
        session::Method::Put => M::PUT,
        session::Method::Patch => M::PATCH,
        session::Method::Delete => M::DELETE,
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "csr")]
        {
            let mut builder =
                gloo_net::http::RequestBuilder::new(&request.url).method(gloo_method(request.method));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let built = match request.body_bytes() {
                Some(bytes) => builder.body(js_sys::Uint8Array::from(bytes.as_slice())),
                None => builder.build(),
            }
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let response = built
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let status = response.status();
            let body = response
                .binary()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            Ok(HttpResponse::new(status, body))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = request;
            Err(TransportError::Unavailable)
        }
    }
}
