//! Top navigation bar with auth-aware links.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reads the auth context for the signed-in user and primary role; the
//! sign-out action goes through the context so roles clear immediately.

#[cfg(test)]
#[path = "navbar_test.rs"]
mod navbar_test;

use leptos::prelude::*;

use crate::config::PublicConfig;
use crate::state::auth::use_auth;

/// A navbar entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    /// Hidden from anonymous visitors.
    pub requires_auth: bool,
}

pub const NAV_LINKS: &[NavLink] = &[
    NavLink { href: "/", label: "Home", requires_auth: false },
    NavLink { href: "/team", label: "Our Team", requires_auth: false },
    NavLink { href: "/portal", label: "Portal", requires_auth: true },
];

/// Links shown for the given auth state, in declaration order.
pub fn visible_links(authenticated: bool) -> impl Iterator<Item = &'static NavLink> {
    NAV_LINKS.iter().filter(move |link| authenticated || !link.requires_auth)
}

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let site_name = use_context::<PublicConfig>().unwrap_or_default().site_name;
    let menu_open = RwSignal::new(false);

    let on_sign_out = move |_| {
        menu_open.set(false);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Err(e) = auth.sign_out().await {
                log::warn!("sign out failed: {e}");
            }
        });
    };

    let links = move || {
        visible_links(auth.is_authenticated())
            .map(|link| {
                view! {
                    <a class="navbar__link" href={link.href} on:click=move |_| menu_open.set(false)>
                        {link.label}
                    </a>
                }
            })
            .collect_view()
    };

    let badge = move || {
        auth.primary_role()
            .map(|role| view! { <span class="navbar__badge">{role.label().to_owned()}</span> })
    };

    let account = move || {
        if auth.is_loading() {
            return view! { <span class="navbar__account navbar__account--pending"></span> }.into_any();
        }
        match auth.user() {
            Some(user) => view! {
                <span class="navbar__account">
                    <span class="navbar__user">{user.display_name().to_owned()}</span>
                    {badge}
                    <button class="navbar__button" on:click=on_sign_out>"Sign out"</button>
                </span>
            }
            .into_any(),
            None => view! {
                <span class="navbar__account">
                    <a class="navbar__button" href="/login">"Sign in"</a>
                </span>
            }
            .into_any(),
        }
    };

    view! {
        <header class="navbar">
            <a class="navbar__brand" href="/">{site_name}</a>
            <button
                class="navbar__toggle"
                aria-label="Toggle menu"
                aria-expanded=move || menu_open.get().to_string()
                on:click=move |_| menu_open.update(|open| *open = !*open)
            >
                "☰"
            </button>
            <nav class="navbar__menu" class:navbar__menu--open=move || menu_open.get()>
                {links}
                {account}
            </nav>
        </header>
    }
}
