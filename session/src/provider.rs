//! Seams to the external identity provider and role store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session context treats both collaborators as black boxes. The client
//! crate implements them over the BaaS REST API; tests implement them with
//! in-memory fakes. Everything runs on one thread, so the traits are `?Send`.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use async_trait::async_trait;

use crate::identity::{AuthEvent, Session};
use crate::role::RoleRow;

/// Errors reported by identity-provider and role-store calls.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request could not be sent or completed.
    #[error("request failed: {0}")]
    Request(String),
    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
    /// Persisted session storage could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),
    /// The operation is not available in this environment (e.g. during SSR).
    #[error("not available: {0}")]
    Unavailable(&'static str),
}

/// Callback invoked on every provider session change.
pub type SessionListener = Rc<dyn Fn(AuthEvent, Option<&Session>)>;

/// External identity provider client.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Probe the provider for the current session.
    async fn current_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Ask the provider to terminate the current session.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Register a change listener. Dropping the handle unsubscribes.
    fn on_session_change(&self, listener: SessionListener) -> Subscription;
}

/// Queryable role table keyed by user id.
#[async_trait(?Send)]
pub trait RoleStore {
    /// All role rows for `user_id`, in no particular order.
    async fn roles_for(&self, user_id: &str) -> Result<Vec<RoleRow>, ProviderError>;
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle for a registered callback. Releases the callback when dropped.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A handle with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Release the callback now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}

// =============================================================================
// LISTENER REGISTRY
// =============================================================================

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, SessionListener)>,
}

/// Session-change fan-out shared by provider implementations.
///
/// Dispatch iterates over a snapshot of the registered listeners, so a
/// listener may subscribe or unsubscribe while an event is being delivered.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let id = {
            let mut registry = self.inner.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, listener));
            id
        };
        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        let listeners: Vec<SessionListener> =
            self.inner.borrow().listeners.iter().map(|(_, listener)| Rc::clone(listener)).collect();
        tracing::debug!(?event, listeners = listeners.len(), has_session = session.is_some(), "session change");
        for listener in listeners {
            listener(event, session);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
