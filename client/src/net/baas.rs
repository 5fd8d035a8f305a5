//! BaaS client: identity provider, role store, and table queries.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, session persisted in
//! `localStorage`.
//! Server-side (SSR): no session and no I/O; queries report `Unavailable`.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `ProviderError` instead of panicking. The session
//! context decides how each failure degrades (role fetch errors become an
//! empty role set); pages render the message.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "baas_test.rs"]
mod baas_test;

use async_trait::async_trait;
use session::{IdentityProvider, ListenerRegistry, ProviderError, RoleRow, RoleStore, Session, SessionListener, Subscription};

use super::types::{ErrorBody, TeamMember};
use crate::config::PublicConfig;

#[cfg(feature = "hydrate")]
use session::AuthEvent;

/// `localStorage` key holding the serialized [`Session`].
pub const STORAGE_KEY: &str = "academy.auth.session";

// =============================================================================
// ENDPOINTS
// =============================================================================

/// URL builder for one BaaS project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    anon_key: String,
}

impl Endpoints {
    #[must_use]
    pub fn new(config: &PublicConfig) -> Self {
        Self { base_url: config.baas_url.clone(), anon_key: config.baas_anon_key.clone() }
    }

    #[must_use]
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    #[must_use]
    pub fn password_grant(&self) -> String {
        format!("{}/auth/v1/token?grant_type=password", self.base_url)
    }

    #[must_use]
    pub fn refresh_grant(&self) -> String {
        format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url)
    }

    #[must_use]
    pub fn logout(&self) -> String {
        format!("{}/auth/v1/logout", self.base_url)
    }

    /// Role rows for one user; the filter value is percent-encoded.
    #[must_use]
    pub fn user_roles(&self, user_id: &str) -> String {
        format!("{}/rest/v1/user_roles?select=role&user_id=eq.{}", self.base_url, urlencoding::encode(user_id))
    }

    #[must_use]
    pub fn team_members(&self) -> String {
        format!("{}/rest/v1/team_members?select=*&order=display_order.asc", self.base_url)
    }
}

/// Build the error for a non-success response from its status and raw body.
#[must_use]
pub fn status_error(status: u16, body: &str) -> ProviderError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message().map_or_else(|| body.trim().to_owned(), str::to_owned);
    ProviderError::Status { status, message }
}

/// Parse a persisted session. Corrupt entries read as absent.
#[must_use]
pub fn decode_stored_session(raw: Option<&str>) -> Option<Session> {
    serde_json::from_str(raw?).ok()
}

// =============================================================================
// HTTP + STORAGE (browser only)
// =============================================================================

#[cfg(feature = "hydrate")]
mod browser {
    use gloo_net::http::{Request, RequestBuilder, Response};
    use serde::de::DeserializeOwned;
    use session::{ProviderError, Session};

    use super::{STORAGE_KEY, decode_stored_session, status_error};

    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn now_secs() -> i64 {
        (js_sys::Date::now() / 1000.0) as i64
    }

    fn storage() -> Result<web_sys::Storage, ProviderError> {
        web_sys::window()
            .ok_or(ProviderError::Storage("no window".to_owned()))?
            .local_storage()
            .map_err(|_| ProviderError::Storage("localStorage access denied".to_owned()))?
            .ok_or(ProviderError::Storage("localStorage unavailable".to_owned()))
    }

    pub(super) fn load_session() -> Result<Option<Session>, ProviderError> {
        let raw = storage()?
            .get_item(STORAGE_KEY)
            .map_err(|_| ProviderError::Storage("read failed".to_owned()))?;
        let session = decode_stored_session(raw.as_deref());
        if raw.is_some() && session.is_none() {
            log::warn!("discarding unreadable persisted session");
            clear_session();
        }
        Ok(session)
    }

    pub(super) fn store_session(session: &Session) -> Result<(), ProviderError> {
        let raw = serde_json::to_string(session).map_err(|e| ProviderError::Storage(e.to_string()))?;
        storage()?
            .set_item(STORAGE_KEY, &raw)
            .map_err(|_| ProviderError::Storage("write failed".to_owned()))
    }

    pub(super) fn clear_session() {
        if let Ok(storage) = storage() {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }

    fn with_auth(builder: RequestBuilder, anon_key: &str, bearer: &str) -> RequestBuilder {
        builder.header("apikey", anon_key).header("Authorization", &format!("Bearer {bearer}"))
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ProviderError> {
        if !resp.ok() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        resp.json::<T>().await.map_err(|e| ProviderError::Decode(e.to_string()))
    }

    pub(super) async fn get_json<T: DeserializeOwned>(url: &str, anon_key: &str, bearer: &str) -> Result<T, ProviderError> {
        let resp = with_auth(Request::get(url), anon_key, bearer)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        read_json(resp).await
    }

    pub(super) async fn post_json<T: DeserializeOwned>(
        url: &str,
        anon_key: &str,
        bearer: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let resp = with_auth(Request::post(url), anon_key, bearer)
            .json(body)
            .map_err(|e| ProviderError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        read_json(resp).await
    }

    pub(super) async fn post_empty(url: &str, anon_key: &str, bearer: &str) -> Result<(), ProviderError> {
        let resp = with_auth(Request::post(url), anon_key, bearer)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        if resp.ok() {
            return Ok(());
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

// =============================================================================
// IDENTITY PROVIDER
// =============================================================================

/// Identity provider backed by the BaaS auth endpoints.
pub struct BaasAuth {
    endpoints: Endpoints,
    listeners: ListenerRegistry,
}

impl BaasAuth {
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints, listeners: ListenerRegistry::new() }
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Sign in with email and password, persist the session and notify listeners.
    ///
    /// # Errors
    ///
    /// Returns the BaaS error (e.g. invalid credentials), a storage error, or
    /// `Unavailable` outside the browser.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        #[cfg(feature = "hydrate")]
        {
            let payload = serde_json::json!({ "email": email, "password": password });
            let token: super::types::TokenResponse = browser::post_json(
                &self.endpoints.password_grant(),
                self.endpoints.anon_key(),
                self.endpoints.anon_key(),
                &payload,
            )
            .await?;
            let session = token.into_session(browser::now_secs());
            browser::store_session(&session)?;
            log::info!("signed in as {}", session.user.id);
            self.listeners.emit(AuthEvent::SignedIn, Some(&session));
            Ok(session)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password);
            Err(ProviderError::Unavailable("sign-in requires a browser"))
        }
    }

    #[cfg(feature = "hydrate")]
    async fn refresh(&self, session: &Session) -> Result<Session, ProviderError> {
        let payload = serde_json::json!({ "refresh_token": session.refresh_token });
        let token: super::types::TokenResponse = browser::post_json(
            &self.endpoints.refresh_grant(),
            self.endpoints.anon_key(),
            self.endpoints.anon_key(),
            &payload,
        )
        .await?;
        Ok(token.into_session(browser::now_secs()))
    }
}

#[async_trait(?Send)]
impl IdentityProvider for BaasAuth {
    async fn current_session(&self) -> Result<Option<Session>, ProviderError> {
        #[cfg(feature = "hydrate")]
        {
            let Some(session) = browser::load_session()? else {
                return Ok(None);
            };
            if !session.is_expired_at(browser::now_secs()) {
                return Ok(Some(session));
            }
            match self.refresh(&session).await {
                Ok(fresh) => {
                    browser::store_session(&fresh)?;
                    self.listeners.emit(AuthEvent::TokenRefreshed, Some(&fresh));
                    Ok(Some(fresh))
                }
                Err(e) => {
                    log::warn!("session refresh failed, signing out locally: {e}");
                    browser::clear_session();
                    Ok(None)
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Ok(None)
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        #[cfg(feature = "hydrate")]
        {
            let stored = browser::load_session().ok().flatten();
            let result = match stored {
                Some(session) => {
                    browser::post_empty(&self.endpoints.logout(), self.endpoints.anon_key(), &session.access_token).await
                }
                None => Ok(()),
            };
            browser::clear_session();
            self.listeners.emit(AuthEvent::SignedOut, None);
            result
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(ProviderError::Unavailable("sign-out requires a browser"))
        }
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

// =============================================================================
// ROLE STORE + TABLES
// =============================================================================

/// Role store backed by the `user_roles` table.
pub struct BaasRoles {
    endpoints: Endpoints,
}

impl BaasRoles {
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait(?Send)]
impl RoleStore for BaasRoles {
    async fn roles_for(&self, user_id: &str) -> Result<Vec<RoleRow>, ProviderError> {
        #[cfg(feature = "hydrate")]
        {
            // Row-level security on the table keys off the user's access token.
            let bearer = browser::load_session()
                .ok()
                .flatten()
                .map_or_else(|| self.endpoints.anon_key().to_owned(), |s| s.access_token);
            browser::get_json(&self.endpoints.user_roles(user_id), self.endpoints.anon_key(), &bearer).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = user_id;
            Err(ProviderError::Unavailable("role store requires a browser"))
        }
    }
}

/// Fetch the public team listing, ordered for display.
///
/// # Errors
///
/// Returns the request/decoding error, or `Unavailable` outside the browser.
pub async fn fetch_team_members(endpoints: &Endpoints) -> Result<Vec<TeamMember>, ProviderError> {
    #[cfg(feature = "hydrate")]
    {
        browser::get_json(&endpoints.team_members(), endpoints.anon_key(), endpoints.anon_key()).await
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = endpoints;
        Err(ProviderError::Unavailable("team listing requires a browser"))
    }
}
