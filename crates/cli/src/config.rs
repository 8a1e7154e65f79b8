//! CLI configuration utilities

use anyhow::{Context, Result};
use careerpath_http::ClientConfig;
use std::path::Path;
use tracing::debug;

use crate::state_dir::StateDir;

/// Command-line values that take precedence over file and environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Load the client configuration
///
/// An explicit `config_file` must exist. Otherwise the state directory's
/// `config.json` is used when present, and the environment alone when not.
/// Tokens persist under the state directory unless a token file is configured.
pub fn load_config(
    config_file: Option<&Path>,
    state_dir: &StateDir,
    overrides: Overrides,
) -> Result<ClientConfig> {
    let default_path = state_dir.config_path();
    let mut config = match config_file {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None if default_path.exists() => {
            debug!("Loading configuration from {}", default_path.display());
            ClientConfig::from_file(&default_path).with_context(|| {
                format!("Failed to load configuration from {}", default_path.display())
            })?
        }
        None => ClientConfig::from_env().context("Failed to read configuration from environment")?,
    };

    if let Some(url) = overrides.api_url {
        config.api_base_url = url;
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.timeout_secs = timeout;
    }
    if config.token_file.is_none() {
        config.token_file = Some(state_dir.token_path());
    }

    Ok(config)
}

/// Save configuration to JSON file
pub fn save_config<P: AsRef<Path>>(config: &ClientConfig, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    save_config(&ClientConfig::default(), path)
}
