//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates authorization to
//! `components::route_guard`; pages never check roles themselves.

pub mod change_password;
pub mod home;
pub mod login;
pub mod not_found;
pub mod resource;
