//! # dashboard
//!
//! Leptos + WASM admin dashboard for Jamii Clinic.
//!
//! This crate contains pages, components, signal state, and the browser
//! implementations of the `session` seams (`gloo-net` transport,
//! `localStorage`, toast notifier). Authorization decisions live in the
//! `session` crate; this crate only renders them.
//!
//! Browser-only code sits behind the `csr` feature. Without it the crate
//! builds natively so route and state logic can be unit tested.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod routes;
pub mod state;

/// WASM entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
