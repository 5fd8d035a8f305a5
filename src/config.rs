//! Server configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use client::config::{DEFAULT_SITE_NAME, PublicConfig};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable {var}")]
    Missing { var: &'static str },

    /// `PORT` is not a valid TCP port.
    #[error("invalid PORT value {value:?}")]
    InvalidPort { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Settings rendered into the page for the browser.
    pub public: PublicConfig,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Required:
    /// - `BAAS_URL`: project URL, trailing `/` trimmed
    /// - `BAAS_ANON_KEY`: public API key
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `SITE_NAME`: default "Northbridge Academy"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Same as [`ServerConfig::from_env`], reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };
        let baas_url = required(&lookup, "BAAS_URL")?;
        let baas_anon_key = required(&lookup, "BAAS_ANON_KEY")?;
        let site_name = lookup("SITE_NAME").unwrap_or_else(|| DEFAULT_SITE_NAME.to_owned());

        Ok(Self { port, public: PublicConfig::new(&baas_url, &baas_anon_key, &site_name) })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String, ConfigError> {
    lookup(var).ok_or(ConfigError::Missing { var })
}

/// Read an env var, treating blank values as unset.
pub(crate) fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
