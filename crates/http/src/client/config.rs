//! Client configuration

use super::error::ClientError;
use super::session::SessionSignal;
use super::storage::TokenStore;
use super::{ApiClient, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of the environment variables read by [`ClientConfig`]
pub const ENV_PREFIX: &str = "CAREERPATH";

/// Base URL used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// API client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every API path is appended to
    pub api_base_url: String,

    /// OAuth client identifier for Google sign-in
    #[serde(default)]
    pub google_client_id: Option<String>,

    /// Request timeout in seconds, refresh calls included
    pub timeout_secs: u64,

    /// File the tokens are persisted in; memory only when unset
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            google_client_id: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let settings = Self::with_defaults()?
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration with defaults and environment variables
    ///
    /// `CAREERPATH_API_BASE_URL`, `CAREERPATH_GOOGLE_CLIENT_ID`,
    /// `CAREERPATH_TIMEOUT_SECS` and `CAREERPATH_TOKEN_FILE` are recognised.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        let settings = Self::with_defaults()?
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn with_defaults()
    -> Result<config::ConfigBuilder<config::builder::DefaultState>, ClientError> {
        let defaults = Self::default();
        Ok(config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?)
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Token store described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the token file exists but cannot be read
    pub fn token_store(&self) -> Result<TokenStore, ClientError> {
        match &self.token_file {
            Some(path) => TokenStore::open_file(path),
            None => Ok(TokenStore::in_memory()),
        }
    }

    /// Build a client from this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the token store cannot be opened or the base URL
    /// is invalid
    pub fn build_client(&self, session: SessionSignal) -> Result<ApiClient, ClientError> {
        if self.timeout_secs == 0 {
            return Err(ClientError::Configuration(
                "timeout_secs must be greater than zero".into(),
            ));
        }

        ApiClient::builder()
            .base_url(&self.api_base_url)
            .timeout(self.timeout())
            .token_store(self.token_store()?)
            .session_signal(session)
            .build()
    }
}
