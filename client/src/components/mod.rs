//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Static marketing sections plus the auth-aware navbar and team cards. Only
//! `navbar` reads shared state from context.

pub mod features;
pub mod footer;
pub mod hero;
pub mod navbar;
pub mod stats;
pub mod team_card;
