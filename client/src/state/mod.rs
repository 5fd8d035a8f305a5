//! Shared client state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` is provided once at the app root; `team` is page-scoped.

pub mod auth;
pub mod team;
