//! Signal-backed client state.
//!
//! DESIGN
//! ======
//! The `session` crate owns the truth. These modules hold plain mirrors of
//! it that live in `RwSignal`s, updated from session events, so components
//! re-render without locking the core.

pub mod auth;
pub mod toast;
