//! Session and role resolution for the academy site.
//!
//! This crate owns the authentication state shared by the Leptos client and
//! the SSR server. It mirrors the session held by the external identity
//! provider, resolves the role assignments of the signed-in identity from the
//! role store, and publishes snapshots to subscribers.
//!
//! It is target-independent: no browser or HTTP code lives here. The client
//! crate supplies concrete [`IdentityProvider`] / [`RoleStore`] implementations
//! and a [`Spawner`] backed by the Leptos task queue.

pub mod context;
pub mod identity;
pub mod provider;
pub mod role;

pub use context::{AuthSnapshot, SessionContext, Spawner};
pub use identity::{AuthEvent, Identity, Session};
pub use provider::{IdentityProvider, ListenerRegistry, ProviderError, RoleStore, SessionListener, Subscription};
pub use role::{PRIORITY, Role, RoleRow, RoleSet};
