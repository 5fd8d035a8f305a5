//! BaaS wire DTOs for the auth and REST endpoints.
//!
//! DESIGN
//! ======
//! Shapes follow the BaaS JSON responses field for field. Conversion into the
//! `session` crate's domain types happens here so the rest of the client never
//! sees raw token payloads.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub use session::{Identity, RoleRow, Session};

/// Response of the password and refresh-token grants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    /// Absolute expiry in seconds since the Unix epoch, when the server sends it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}

impl TokenResponse {
    /// Convert into a persisted [`Session`], deriving `expires_at` when absent.
    #[must_use]
    pub fn into_session(self, now_secs: i64) -> Session {
        let expires_at = self.expires_at.unwrap_or(now_secs.saturating_add(self.expires_in));
        Session { access_token: self.access_token, refresh_token: self.refresh_token, expires_at, user: self.user }
    }
}

/// Error payload returned by the BaaS. Auth and REST endpoints use different keys.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Most specific human-readable message present, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

/// A row of the `team_members` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    /// Job title shown under the name.
    pub position: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

impl TeamMember {
    /// Up to two uppercase initials for the avatar fallback.
    #[must_use]
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Accept ids sent either as strings (UUID) or integers (serial keys).
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
        _ => Err(D::Error::custom("expected string or integer id")),
    }
}
