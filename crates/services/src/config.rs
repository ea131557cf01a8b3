use std::env;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Where the API lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `base_url` is not an http(s) URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let parsed =
            Url::parse(&base_url).map_err(|_| ConfigError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }
        Ok(Self { base_url })
    }

    /// Read `QUEST_API_BASE_URL`, defaulting to a local server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the variable holds an invalid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            env::var("QUEST_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        Self::new(base_url)
    }
}
