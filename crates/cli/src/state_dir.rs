//! Platform-specific state directory management

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::warn;

/// Environment variable that relocates all CLI state
pub const STATE_DIR_ENV: &str = "CAREERPATH_STATE_DIR";

/// Manages the directories the CLI keeps its configuration, tokens and logs in
#[derive(Debug)]
pub struct StateDir {
    project_dirs: Option<ProjectDirs>,
    override_dir: Option<PathBuf>,
}

impl StateDir {
    /// Platform directories, unless `CAREERPATH_STATE_DIR` points elsewhere
    pub fn new() -> Self {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Self::with_override(dir);
        }

        let project_dirs = ProjectDirs::from("ai", "CareerPath", "careerpath");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    /// Keep everything under a single directory
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// Resolve from the `--data-dir` flag, falling back to the defaults
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        data_dir.map_or_else(Self::new, Self::with_override)
    }

    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./config"),
            |dirs| dirs.config_dir().to_path_buf(),
        )
    }

    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        self.project_dirs.as_ref().map_or_else(
            || PathBuf::from("./data"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    /// Configuration file read when `--config` is not given
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join("config.json")
    }

    /// File the session tokens persist in between invocations
    pub fn token_path(&self) -> PathBuf {
        self.data_dir().join("tokens.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("cli.log")
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}
