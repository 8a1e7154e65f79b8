//! Token storage
//!
//! The [`TokenStore`] is the single source of truth for the access and refresh
//! tokens. It sits on top of a synchronous key-value backend so the tokens can
//! outlive the process when a [`FileStorage`] is used.

use super::error::ClientError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Storage key of the access token
pub const ACCESS_KEY: &str = "cpai_access";

/// Storage key of the refresh token
pub const REFRESH_KEY: &str = "cpai_refresh";

/// Synchronous string key-value storage
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str);

    /// Remove `key` if present
    fn remove_item(&self, key: &str);
}

/// In-memory storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Storage persisted as a JSON object file
///
/// The file is read once when opened. Every mutation rewrites it; write
/// failures are logged and the in-memory view stays authoritative.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, starting empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let items = if path.exists() {
            debug!("Loading token storage from: {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &HashMap<String, String>) {
        if let Err(e) = write_items(&self.path, items) {
            warn!(
                "Failed to write token storage to {}: {e}",
                self.path.display()
            );
        }
    }
}

fn write_items(path: &Path, items: &HashMap<String, String>) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(items)?;
    std::fs::write(path, content)?;

    // Tokens are credentials: owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        self.persist(&items);
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.remove(key).is_some() {
            self.persist(&items);
        }
    }
}

/// Access and refresh token holder shared by every clone of the client
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    /// Create a store over the given backend
    pub fn new(backend: impl KeyValueStorage + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Create a store that keeps tokens in memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Create a store persisted in a JSON file
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        Ok(Self::new(FileStorage::open(path)?))
    }

    /// Current access token
    pub fn access(&self) -> Option<String> {
        self.read(ACCESS_KEY)
    }

    /// Replace the access token; `None` or an empty value removes it
    pub fn set_access(&self, token: Option<&str>) {
        self.write(ACCESS_KEY, token);
    }

    /// Current refresh token
    pub fn refresh(&self) -> Option<String> {
        self.read(REFRESH_KEY)
    }

    /// Replace the refresh token; `None` or an empty value removes it
    pub fn set_refresh(&self, token: Option<&str>) {
        self.write(REFRESH_KEY, token);
    }

    /// Replace both tokens at once
    pub fn set_tokens(&self, access: Option<&str>, refresh: Option<&str>) {
        self.set_access(access);
        self.set_refresh(refresh);
    }

    /// Forget both tokens
    pub fn clear(&self) {
        self.backend.remove_item(ACCESS_KEY);
        self.backend.remove_item(REFRESH_KEY);
    }

    fn read(&self, key: &str) -> Option<String> {
        self.backend.get_item(key).filter(|value| !value.is_empty())
    }

    fn write(&self, key: &str, token: Option<&str>) {
        match token {
            Some(value) if !value.is_empty() => self.backend.set_item(key, value),
            _ => self.backend.remove_item(key),
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_access", &self.access().is_some())
            .field("has_refresh", &self.refresh().is_some())
            .finish()
    }
}
