//! The session/role context.
//!
//! ARCHITECTURE
//! ============
//! `SessionContext` mirrors the identity provider's session and resolves the
//! role set of the signed-in identity. State moves only in response to the
//! provider: the initial probe on mount, then every change notification.
//!
//!   Uninitialized --probe--> Authenticated | Anonymous
//!   Authenticated <--change notification--> Anonymous
//!
//! Entering `Authenticated` issues a role fetch for the identity. Entering
//! `Anonymous` clears roles and both loading flags in the same update.
//!
//! SCHEDULING
//! ==========
//! Work that awaits (the probe, each role fetch) goes through the injected
//! [`Spawner`], so a role fetch triggered from a change notification starts on
//! a later turn, after the provider has finished dispatching. Everything runs
//! on one thread; shared state is `Rc` + `RefCell` and no borrow is held across
//! an await point or an observer callback.
//!
//! Every role fetch carries the generation current when it was issued. Any
//! later session change, sign-out or teardown bumps the generation, and a
//! fetch that settles under an older generation is discarded.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use crate::identity::{AuthEvent, Identity, Session};
use crate::provider::{IdentityProvider, ProviderError, RoleStore, Subscription};
use crate::role::{Role, RoleRow, RoleSet};

/// Queues a task to run on a later turn of the single UI thread.
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

impl Spawner for futures::executor::LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawn_local(task) {
            tracing::error!(error = %e, "failed to queue session task");
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time view of the authentication state handed to observers.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<Identity>,
    pub session: Option<Session>,
    /// True until the first session probe settles.
    pub loading: bool,
    /// True while a role fetch for the current identity is in flight.
    pub roles_loading: bool,
    pub roles: RoleSet,
}

impl Default for AuthSnapshot {
    /// The uninitialized state: nothing known yet, probe pending.
    fn default() -> Self {
        Self { user: None, session: None, loading: true, roles_loading: false, roles: RoleSet::new() }
    }
}

impl AuthSnapshot {
    /// Settled state with no session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { loading: false, ..Self::default() }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::Admin)
    }

    #[must_use]
    pub fn is_branch_admin(&self) -> bool {
        self.has_role(&Role::BranchAdmin)
    }

    #[must_use]
    pub fn is_teacher(&self) -> bool {
        self.has_role(&Role::Teacher)
    }

    #[must_use]
    pub fn is_sales(&self) -> bool {
        self.has_role(&Role::Sales)
    }

    #[must_use]
    pub fn is_support(&self) -> bool {
        self.has_role(&Role::Support)
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.has_role(&Role::Student)
    }

    #[must_use]
    pub fn primary_role(&self) -> Option<Role> {
        self.roles.primary().cloned()
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

type Observer = Rc<dyn Fn(&AuthSnapshot)>;

struct Inner {
    provider: Rc<dyn IdentityProvider>,
    store: Rc<dyn RoleStore>,
    spawner: Rc<dyn Spawner>,
    state: RefCell<AuthSnapshot>,
    generation: Cell<u64>,
    /// Set once any change notification has arrived; the probe result is then stale.
    notified: Cell<bool>,
    /// Set by teardown; no later transition is applied.
    torn_down: Cell<bool>,
    observers: RefCell<Vec<(u64, Observer)>>,
    next_observer: Cell<u64>,
    provider_subscription: RefCell<Option<Subscription>>,
}

/// Shared handle to the authentication state of one UI instance.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct SessionContext {
    inner: Rc<Inner>,
}

impl SessionContext {
    /// Subscribe to provider notifications and queue the initial session probe.
    pub fn mount(provider: Rc<dyn IdentityProvider>, store: Rc<dyn RoleStore>, spawner: Rc<dyn Spawner>) -> Self {
        let inner = Rc::new(Inner {
            provider,
            store,
            spawner,
            state: RefCell::new(AuthSnapshot::default()),
            generation: Cell::new(0),
            notified: Cell::new(false),
            torn_down: Cell::new(false),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
            provider_subscription: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = inner.provider.on_session_change(Rc::new(move |event: AuthEvent, session: Option<&Session>| {
            if let Some(inner) = weak.upgrade() {
                handle_change(&inner, event, session.cloned());
            }
        }));
        *inner.provider_subscription.borrow_mut() = Some(subscription);

        let weak = Rc::downgrade(&inner);
        let provider = Rc::clone(&inner.provider);
        inner.spawner.spawn(Box::pin(async move {
            let result = provider.current_session().await;
            if let Some(inner) = weak.upgrade() {
                finish_probe(&inner, result);
            }
        }));

        Self { inner }
    }

    /// Register an observer called after every state change.
    pub fn watch(&self, observer: impl Fn(&AuthSnapshot) + 'static) -> Subscription {
        let id = self.inner.next_observer.get();
        self.inner.next_observer.set(id + 1);
        self.inner.observers.borrow_mut().push((id, Rc::new(observer)));
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.observers.borrow_mut().retain(|(entry, _)| *entry != id);
            }
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<Identity> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().session.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    #[must_use]
    pub fn is_roles_loading(&self) -> bool {
        self.inner.state.borrow().roles_loading
    }

    #[must_use]
    pub fn roles(&self) -> RoleSet {
        self.inner.state.borrow().roles.clone()
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.inner.state.borrow().has_role(role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin()
    }

    #[must_use]
    pub fn is_branch_admin(&self) -> bool {
        self.inner.state.borrow().is_branch_admin()
    }

    #[must_use]
    pub fn is_teacher(&self) -> bool {
        self.inner.state.borrow().is_teacher()
    }

    #[must_use]
    pub fn is_sales(&self) -> bool {
        self.inner.state.borrow().is_sales()
    }

    #[must_use]
    pub fn is_support(&self) -> bool {
        self.inner.state.borrow().is_support()
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.inner.state.borrow().is_student()
    }

    #[must_use]
    pub fn primary_role(&self) -> Option<Role> {
        self.inner.state.borrow().primary_role()
    }

    /// Ask the provider to end the session, then clear the local role set.
    ///
    /// Roles are cleared whatever the provider answers. The session itself is
    /// only cleared when the provider's change notification reports it gone.
    ///
    /// # Errors
    ///
    /// Returns the provider's error after the local roles have been cleared.
    pub async fn sign_out(&self) -> Result<(), ProviderError> {
        let provider = Rc::clone(&self.inner.provider);
        let result = provider.sign_out().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "provider sign-out failed");
        }
        bump_generation(&self.inner);
        {
            let mut state = self.inner.state.borrow_mut();
            state.roles = RoleSet::new();
            state.roles_loading = false;
        }
        notify(&self.inner);
        result
    }

    /// Release the provider subscription and reset to an empty anonymous state.
    ///
    /// In-flight work is not cancelled; its results are discarded, including a
    /// session probe that has not settled yet.
    pub fn teardown(&self) {
        self.inner.torn_down.set(true);
        let subscription = self.inner.provider_subscription.borrow_mut().take();
        drop(subscription);
        bump_generation(&self.inner);
        *self.inner.state.borrow_mut() = AuthSnapshot::anonymous();
        self.inner.observers.borrow_mut().clear();
    }

    /// Whether the provider change listener is still registered.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.provider_subscription.borrow().is_some()
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

fn bump_generation(inner: &Inner) -> u64 {
    let next = inner.generation.get() + 1;
    inner.generation.set(next);
    next
}

fn notify(inner: &Inner) {
    let snapshot = inner.state.borrow().clone();
    let observers: Vec<Observer> = inner.observers.borrow().iter().map(|(_, o)| Rc::clone(o)).collect();
    for observer in observers {
        observer(&snapshot);
    }
}

fn handle_change(inner: &Rc<Inner>, event: AuthEvent, session: Option<Session>) {
    tracing::debug!(?event, user_id = session.as_ref().map(|s| s.user.id.as_str()), "provider session change");
    if inner.torn_down.get() {
        return;
    }
    inner.notified.set(true);
    apply_session(inner, session);
}

fn finish_probe(inner: &Rc<Inner>, result: Result<Option<Session>, ProviderError>) {
    if inner.torn_down.get() {
        tracing::debug!("discarding session probe after teardown");
        return;
    }
    if inner.notified.get() {
        // A notification already described the session; only settle the flag.
        let changed = {
            let mut state = inner.state.borrow_mut();
            std::mem::replace(&mut state.loading, false)
        };
        if changed {
            notify(inner);
        }
        return;
    }
    match result {
        Ok(session) => apply_session(inner, session),
        Err(e) => {
            tracing::warn!(error = %e, "session probe failed; treating as signed out");
            apply_session(inner, None);
        }
    }
}

fn apply_session(inner: &Rc<Inner>, session: Option<Session>) {
    let generation = bump_generation(inner);
    let Some(session) = session else {
        {
            let mut state = inner.state.borrow_mut();
            state.user = None;
            state.session = None;
            state.roles = RoleSet::new();
            state.loading = false;
            state.roles_loading = false;
        }
        notify(inner);
        return;
    };

    let user_id = session.user.id.clone();
    {
        let mut state = inner.state.borrow_mut();
        let same_identity = state.user.as_ref().is_some_and(|user| user.id == user_id);
        if !same_identity {
            state.roles = RoleSet::new();
        }
        state.user = Some(session.user.clone());
        state.session = Some(session);
        state.loading = false;
        state.roles_loading = true;
    }
    notify(inner);
    schedule_role_fetch(inner, user_id, generation);
}

fn schedule_role_fetch(inner: &Rc<Inner>, user_id: String, generation: u64) {
    let weak = Rc::downgrade(inner);
    let store = Rc::clone(&inner.store);
    inner.spawner.spawn(Box::pin(async move {
        let result = store.roles_for(&user_id).await;
        if let Some(inner) = weak.upgrade() {
            finish_role_fetch(&inner, &user_id, generation, result);
        }
    }));
}

fn finish_role_fetch(inner: &Inner, user_id: &str, generation: u64, result: Result<Vec<RoleRow>, ProviderError>) {
    if inner.generation.get() != generation {
        tracing::debug!(user_id, generation, current = inner.generation.get(), "discarding stale role fetch");
        return;
    }
    let roles = match result {
        Ok(rows) => {
            let roles = RoleSet::from_rows(&rows);
            for unknown in roles.unknown() {
                tracing::warn!(user_id, role = %unknown, "unrecognized role in role store");
            }
            roles
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "role fetch failed; continuing without roles");
            RoleSet::new()
        }
    };
    {
        let mut state = inner.state.borrow_mut();
        state.roles = roles;
        state.roles_loading = false;
        state.loading = false;
    }
    notify(inner);
}
