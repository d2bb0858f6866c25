//! Session, authorization and clinic-scope core for the Jamii Clinic dashboard.
//!
//! This crate owns everything the UI needs to decide *who* is signed in,
//! *which* clinic they are acting within, and *whether* a route may render.
//! It is shared by the `dashboard` (WASM) and `cli` (native) crates.
//!
//! ARCHITECTURE
//! ============
//! `SessionStore` is the single source of truth for identity. `AuthorizedFetch`
//! is the only path to authenticated endpoints and the single chokepoint for
//! 401 handling. `ClinicScopeResolver` observes the session and narrows data to
//! one clinic. `guard` is a pure function of session snapshot + route.
//!
//! Browser and native environments plug in through three seams:
//! [`transport::HttpTransport`], [`storage::KeyValueStore`] and
//! [`notify::Notifier`].
//!
//! TRUST MODEL
//! ===========
//! Token payloads are decoded without signature or expiry checks. Decoded
//! roles drive navigation and rendering only; the API server validates the
//! bearer token on every request, and an expired token surfaces as a 401.

pub mod account;
pub mod clinic;
pub mod config;
pub mod context;
pub mod fetch;
pub mod guard;
pub mod notify;
pub mod resource;
pub mod session;
pub mod storage;
pub mod token;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use clinic::{ClinicScope, ClinicScopeResolver, ClinicSummary, SelectionChange};
pub use config::ApiConfig;
pub use context::SessionContext;
pub use fetch::{AuthorizedFetch, FetchError, RequestOptions};
pub use guard::{GuardOutcome, GuardState, RouteRequirement};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use session::{SessionError, SessionEvent, SessionSnapshot, SessionStore};
pub use storage::{KeyValueStore, MemoryStore};
pub use token::{Role, TokenError, User};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, TransportError};
