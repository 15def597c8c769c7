//! Account credentials and environment-driven client configuration.

use std::fmt;

use thiserror::Error;

/// Base URL of the public Ping.fm API.
pub const DEFAULT_BASE_URL: &str = "http://api.ping.fm/v1";

pub const API_KEY_VAR: &str = "PINGFM_API_KEY";
pub const APP_KEY_VAR: &str = "PINGFM_USER_APP_KEY";
pub const BASE_URL_VAR: &str = "PINGFM_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Developer API key plus the user's application key.
///
/// Fixed at construction. `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    app_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_key: app_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .finish()
    }
}

/// Everything needed to construct a `PingClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: String,
}

impl Config {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads `PINGFM_API_KEY`, `PINGFM_USER_APP_KEY` and, optionally,
    /// `PINGFM_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let credentials = Credentials::new(required(API_KEY_VAR)?, required(APP_KEY_VAR)?);
        let base_url = lookup(BASE_URL_VAR)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            credentials,
            base_url,
        })
    }
}
