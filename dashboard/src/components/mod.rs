//! Reusable UI components.
//!
//! ARCHITECTURE
//! ============
//! `route_guard` gates every protected screen, `shell` frames them, and the
//! smaller widgets read shared signals from context.

pub mod clinic_selector;
pub mod route_guard;
pub mod shell;
pub mod toast_stack;
