//! Role-gated portal landing page.
//!
//! SYSTEM CONTEXT
//! ==============
//! The default dashboard view follows the user's primary role. Anonymous
//! visitors are sent to `/login` once the session probe has settled.

#[cfg(test)]
#[path = "portal_test.rs"]
mod portal_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::Role;

use crate::state::auth::use_auth;
use crate::util::auth::install_unauth_redirect;

/// Dashboard view chosen for a primary role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalView {
    Administration,
    BranchManagement,
    Teaching,
    Enrolments,
    SupportDesk,
    MyCourses,
    /// Signed in without any recognised role.
    NoRole,
}

impl PortalView {
    pub fn title(self) -> &'static str {
        match self {
            Self::Administration => "Administration",
            Self::BranchManagement => "Branch management",
            Self::Teaching => "Teaching",
            Self::Enrolments => "Enrolments",
            Self::SupportDesk => "Support desk",
            Self::MyCourses => "My courses",
            Self::NoRole => "No role assigned",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::Administration => "Manage branches, staff accounts and role assignments.",
            Self::BranchManagement => "Timetables, classrooms and staff for your branch.",
            Self::Teaching => "Your groups, lesson plans and homework to review.",
            Self::Enrolments => "Leads, trial lessons and new enrolments.",
            Self::SupportDesk => "Open requests from students and parents.",
            Self::MyCourses => "Your timetable, homework and progress reports.",
            Self::NoRole => "Your account has no role yet. Contact your branch to get access.",
        }
    }
}

/// Map a primary role to its view. Unknown roles get no view.
pub fn portal_view(primary: Option<&Role>) -> PortalView {
    match primary {
        Some(Role::Admin) => PortalView::Administration,
        Some(Role::BranchAdmin) => PortalView::BranchManagement,
        Some(Role::Teacher) => PortalView::Teaching,
        Some(Role::Sales) => PortalView::Enrolments,
        Some(Role::Support) => PortalView::SupportDesk,
        Some(Role::Student) => PortalView::MyCourses,
        Some(Role::Unknown(_)) | None => PortalView::NoRole,
    }
}

#[component]
pub fn PortalPage() -> impl IntoView {
    let auth = use_auth();
    install_unauth_redirect(auth, use_navigate());

    let body = move || {
        if auth.is_loading() || !auth.is_authenticated() {
            return view! { <p class="portal-page__status">"Checking your session..."</p> }.into_any();
        }
        if auth.is_roles_loading() {
            return view! { <p class="portal-page__status">"Loading your access..."</p> }.into_any();
        }
        let current = portal_view(auth.primary_role().as_ref());
        let empty = current == PortalView::NoRole;
        let roles = auth
            .roles()
            .iter()
            .filter(|role| role.is_known())
            .map(|role| view! { <li class="portal-page__role">{role.label().to_owned()}</li> })
            .collect_view();
        view! {
            <section class="portal-view" class:portal-view--empty=empty>
                <h2 class="portal-view__title">{current.title()}</h2>
                <p class="portal-view__summary">{current.summary()}</p>
                <ul class="portal-page__roles">{roles}</ul>
            </section>
        }
        .into_any()
    };

    let greeting = move || auth.user().map(|user| format!("Welcome, {}", user.display_name()));

    view! {
        <main class="portal-page">
            <h1 class="portal-page__title">{greeting}</h1>
            {body}
        </main>
    }
}
