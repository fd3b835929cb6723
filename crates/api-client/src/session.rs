//! Session token storage
//!
//! Tokens live in a small key-value store under the keys `token`, `access`
//! and `refresh`. The store is a trait object so tests and front ends can
//! pick in-memory or file-backed persistence.

use crate::error::{ApiError, ApiResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Primary bearer token key
pub const TOKEN_KEY: &str = "token";
/// Fallback bearer token key
pub const ACCESS_KEY: &str = "access";
/// Refresh token key
pub const REFRESH_KEY: &str = "refresh";

/// All keys owned by the session
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, ACCESS_KEY, REFRESH_KEY];

/// Key-value persistence for session state
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> ApiResult<()>;

    /// Delete a value (no-op when missing)
    fn remove(&self, key: &str) -> ApiResult<()>;
}

/// Volatile store, one per process or per test
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ApiResult<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object file
///
/// The file is read on every access and rewritten on every change, so two
/// processes sharing the file see each other's logins.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    /// Use the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<config dir>/rentacar/session.json`
    pub fn default_path() -> ApiResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("rentacar").join("session.json"))
            .ok_or_else(|| ApiError::session("no configuration directory on this platform"))
    }

    /// Backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Map::new(),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Ignoring unreadable session file");
                Map::new()
            }
        }
    }

    fn write(&self, map: &Map<String, Value>) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::session(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let content = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, content).map_err(|e| {
            ApiError::session(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read()
            .get(key)
            .and_then(Value::as_str)
            .map(String::from)
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read();
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&map)
    }

    fn remove(&self, key: &str) -> ApiResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write(&map)
    }
}

/// Typed view of the session keys over a [`SessionStore`]
#[derive(Clone)]
pub struct SessionTokens {
    store: Arc<dyn SessionStore>,
}

impl SessionTokens {
    /// Wrap a store
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// In-memory session, handy for tests
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Bearer token: `token`, else `access`
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.store
            .get(TOKEN_KEY)
            .or_else(|| self.store.get(ACCESS_KEY))
            .filter(|t| !t.is_empty())
    }

    /// Whether a bearer token is stored
    #[must_use]
    pub fn has_bearer(&self) -> bool {
        self.bearer().is_some()
    }

    /// Stored refresh token
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_KEY).filter(|t| !t.is_empty())
    }

    /// Persist whichever session keys are string fields of `data`
    ///
    /// Returns how many keys were written.
    pub fn save(&self, data: &Value) -> ApiResult<usize> {
        let mut written = 0;
        for key in SESSION_KEYS {
            if let Some(value) = data.get(key).and_then(Value::as_str) {
                self.store.set(key, value)?;
                written += 1;
            }
        }
        debug!(written, "Session tokens saved");
        Ok(written)
    }

    /// Remove all session keys
    pub fn clear(&self) -> ApiResult<()> {
        for key in SESSION_KEYS {
            self.store.remove(key)?;
        }
        debug!("Session tokens cleared");
        Ok(())
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("has_bearer", &self.has_bearer())
            .finish()
    }
}
