//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical unauthenticated redirect behavior.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::AuthSnapshot;

use crate::state::auth::AuthContext;

/// True once the session probe has settled with no user.
pub fn should_redirect_unauth(state: &AuthSnapshot) -> bool {
    !state.loading && state.user.is_none()
}

/// Redirect to `/login` whenever auth has loaded and no user is present.
pub fn install_unauth_redirect<F>(auth: AuthContext, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if auth.with_snapshot(should_redirect_unauth) {
            navigate("/login", NavigateOptions::default());
        }
    });
}
