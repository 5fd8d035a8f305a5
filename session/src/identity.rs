//! Identity-provider records mirrored by the session context.
//!
//! These types mirror the BaaS auth payloads so a persisted session can be
//! round-tripped through browser storage unchanged.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use serde::{Deserialize, Serialize};

/// An authenticated user record owned by the identity provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user id (UUID string).
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form profile metadata (display name, avatar, ...).
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl Identity {
    /// Best available display name: `full_name` metadata, then email, then id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_metadata
            .get("full_name")
            .and_then(serde_json::Value::as_str)
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A live association between an [`Identity`] and this UI instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry in seconds since the Unix epoch.
    pub expires_at: i64,
    pub user: Identity,
}

impl Session {
    /// Whether the access token has passed its expiry at `now_secs`.
    ///
    /// Only the provider client consults this; the session context never
    /// decides validity on its own.
    #[must_use]
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at <= now_secs
    }
}

/// Kind of change reported by the identity provider's notification channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}
