//! Auth-session context for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps `session::SessionContext` for the Leptos tree. The core pushes every
//! snapshot into an `RwSignal`, so route guards and user-aware components
//! re-render from the signal instead of polling.
//!
//! The core is mounted only in the browser. SSR renders the initial loading
//! snapshot, which is also the first state the hydrated client sees.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::rc::Rc;

use leptos::prelude::*;
use session::{AuthSnapshot, Identity, ProviderError, Role, RoleSet, Session, SessionContext};

use crate::config::PublicConfig;
use crate::net::baas::BaasAuth;

/// Raised when a component looks up the auth context outside [`AuthProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthContextError {
    #[error("auth context used outside provider: wrap the tree in <AuthProvider>")]
    OutsideProvider,
}

/// Read surface and actions of the authentication state.
///
/// `Copy` handle; reads go through a signal and are tracked by the caller's
/// reactive scope.
#[derive(Clone, Copy)]
pub struct AuthContext {
    state: RwSignal<AuthSnapshot>,
    core: StoredValue<Option<SessionContext>, LocalStorage>,
    provider: StoredValue<Option<Rc<BaasAuth>>, LocalStorage>,
}

impl AuthContext {
    /// A context frozen at `initial`, with no provider behind it.
    pub fn detached(initial: AuthSnapshot) -> Self {
        Self { state: RwSignal::new(initial), core: StoredValue::new_local(None), provider: StoredValue::new_local(None) }
    }

    /// Build the context for this environment.
    ///
    /// In the browser this mounts the session core against the BaaS; on the
    /// server it stays at the initial loading snapshot.
    pub fn mount(config: &PublicConfig) -> Self {
        #[cfg(feature = "hydrate")]
        {
            if config.is_configured() {
                return Self::mount_browser(config);
            }
            log::warn!("BaaS is not configured; authentication disabled");
            let ctx = Self::detached(AuthSnapshot::default());
            let state = ctx.state;
            Effect::new(move |_| state.set(AuthSnapshot::anonymous()));
            ctx
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = config;
            Self::detached(AuthSnapshot::default())
        }
    }

    #[cfg(feature = "hydrate")]
    fn mount_browser(config: &PublicConfig) -> Self {
        use crate::net::baas::{BaasRoles, Endpoints};

        let state = RwSignal::new(AuthSnapshot::default());
        let endpoints = Endpoints::new(config);
        let auth = Rc::new(BaasAuth::new(endpoints.clone()));
        let core = SessionContext::mount(auth.clone(), Rc::new(BaasRoles::new(endpoints)), Rc::new(LeptosSpawner));
        let watcher = core.watch(move |snapshot| state.set(snapshot.clone()));

        let core = StoredValue::new_local(Some(core));
        let watcher = StoredValue::new_local(Some(watcher));
        on_cleanup(move || {
            watcher.try_update_value(Option::take);
            core.try_with_value(|core| {
                if let Some(core) = core {
                    core.teardown();
                }
            });
        });

        Self { state, core, provider: StoredValue::new_local(Some(auth)) }
    }

    pub fn with_snapshot<U>(&self, f: impl FnOnce(&AuthSnapshot) -> U) -> U {
        self.state.with(f)
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.get()
    }

    pub fn user(&self) -> Option<Identity> {
        self.state.with(|s| s.user.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.state.with(|s| s.session.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(AuthSnapshot::is_authenticated)
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn is_roles_loading(&self) -> bool {
        self.state.with(|s| s.roles_loading)
    }

    pub fn roles(&self) -> RoleSet {
        self.state.with(|s| s.roles.clone())
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.state.with(|s| s.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.state.with(AuthSnapshot::is_admin)
    }

    pub fn is_branch_admin(&self) -> bool {
        self.state.with(AuthSnapshot::is_branch_admin)
    }

    pub fn is_teacher(&self) -> bool {
        self.state.with(AuthSnapshot::is_teacher)
    }

    pub fn is_sales(&self) -> bool {
        self.state.with(AuthSnapshot::is_sales)
    }

    pub fn is_support(&self) -> bool {
        self.state.with(AuthSnapshot::is_support)
    }

    pub fn is_student(&self) -> bool {
        self.state.with(AuthSnapshot::is_student)
    }

    pub fn primary_role(&self) -> Option<Role> {
        self.state.with(AuthSnapshot::primary_role)
    }

    /// End the session. Roles clear locally; the session clears when the
    /// provider reports the sign-out.
    ///
    /// # Errors
    ///
    /// Returns the provider error, or `Unavailable` when no core is mounted.
    pub async fn sign_out(self) -> Result<(), ProviderError> {
        let Some(core) = self.core.try_with_value(Clone::clone).flatten() else {
            return Err(ProviderError::Unavailable("authentication is not mounted"));
        };
        core.sign_out().await
    }

    /// Password sign-in through the BaaS. The session arrives via the
    /// provider's change notification.
    ///
    /// # Errors
    ///
    /// Returns the provider error, or `Unavailable` when no provider is mounted.
    pub async fn sign_in_with_password(self, email: String, password: String) -> Result<Session, ProviderError> {
        let Some(provider) = self.provider.try_with_value(Clone::clone).flatten() else {
            return Err(ProviderError::Unavailable("authentication is not mounted"));
        };
        provider.sign_in_with_password(&email, &password).await
    }
}

#[cfg(feature = "hydrate")]
struct LeptosSpawner;

#[cfg(feature = "hydrate")]
impl session::Spawner for LeptosSpawner {
    fn spawn(&self, task: futures::future::LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }
}

/// Look up the auth context provided by an enclosing [`AuthProvider`].
///
/// # Errors
///
/// Returns [`AuthContextError::OutsideProvider`] when no provider is in scope.
pub fn try_use_auth() -> Result<AuthContext, AuthContextError> {
    use_context::<AuthContext>().ok_or(AuthContextError::OutsideProvider)
}

/// Like [`try_use_auth`], failing fast on a misconfigured tree.
///
/// # Panics
///
/// Panics when called outside an [`AuthProvider`].
pub fn use_auth() -> AuthContext {
    match try_use_auth() {
        Ok(ctx) => ctx,
        Err(e) => panic!("{e}"),
    }
}

/// Scoped provider for the authentication context.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let config = use_context::<PublicConfig>().unwrap_or_default();
    provide_context(AuthContext::mount(&config));
    children()
}
