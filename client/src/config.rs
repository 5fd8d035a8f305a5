//! Browser-visible site configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server builds [`PublicConfig`] from its environment, provides it as
//! Leptos context during SSR, and renders it into `<meta>` tags in the shell.
//! The hydrated client reads the same values back from the document.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

pub const META_BAAS_URL: &str = "academy:baas-url";
pub const META_BAAS_ANON_KEY: &str = "academy:baas-anon-key";
pub const META_SITE_NAME: &str = "academy:site-name";

pub const DEFAULT_SITE_NAME: &str = "Northbridge Academy";

/// Settings safe to expose to the browser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    /// BaaS project URL without a trailing slash.
    pub baas_url: String,
    /// Public (anon) API key sent with every BaaS request.
    pub baas_anon_key: String,
    pub site_name: String,
}

impl Default for PublicConfig {
    fn default() -> Self {
        Self { baas_url: String::new(), baas_anon_key: String::new(), site_name: DEFAULT_SITE_NAME.to_owned() }
    }
}

impl PublicConfig {
    #[must_use]
    pub fn new(baas_url: &str, baas_anon_key: &str, site_name: &str) -> Self {
        Self {
            baas_url: normalize_base_url(baas_url),
            baas_anon_key: baas_anon_key.trim().to_owned(),
            site_name: site_name.trim().to_owned(),
        }
    }

    /// Whether BaaS calls can be attempted at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.baas_url.is_empty() && !self.baas_anon_key.is_empty()
    }

    /// Read the configuration rendered into the shell's `<meta>` tags.
    ///
    /// Falls back to defaults outside the browser or when a tag is missing.
    #[must_use]
    pub fn from_document() -> Self {
        #[cfg(feature = "hydrate")]
        {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return Self::default();
            };
            let read = |name: &str| {
                document
                    .query_selector(&format!("meta[name=\"{name}\"]"))
                    .ok()
                    .flatten()
                    .and_then(|el| el.get_attribute("content"))
                    .unwrap_or_default()
            };
            let site_name = read(META_SITE_NAME);
            Self::new(
                &read(META_BAAS_URL),
                &read(META_BAAS_ANON_KEY),
                if site_name.is_empty() { DEFAULT_SITE_NAME } else { &site_name },
            )
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Self::default()
        }
    }
}

/// Trim whitespace and trailing slashes from a base URL.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}
