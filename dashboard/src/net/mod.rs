//! Browser implementations of the `session` seams.
//!
//! Client-side (csr): real HTTP via `gloo-net`, `localStorage`, toasts.
//! Native builds get inert stand-ins so the crate still compiles and tests
//! without a browser.

pub mod notifier;
pub mod storage;
pub mod transport;
