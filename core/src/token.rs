//! Client-side storage for the auth token.
//!
//! The request chain only reads the token; callers store it after login
//! and clear it on logout.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key the token is persisted under.
pub const TOKEN_STORAGE_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set_token(&self, token: &str) -> Result<(), ApiError> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Persists the token in a small JSON object on disk, next to whatever
/// other keys the file already holds.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file is an empty store.
    fn load(&self) -> Map<String, Value> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                _ => {
                    log::warn!("ignoring corrupt token file {}", self.path.display());
                    Map::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("could not read token file {}: {e}", self.path.display());
                Map::new()
            }
        }
    }

    fn save(&self, map: Map<String, Value>) -> Result<(), ApiError> {
        let raw = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| ApiError::Storage(e.to_string()))
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.load()
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set_token(&self, token: &str) -> Result<(), ApiError> {
        let mut map = self.load();
        map.insert(TOKEN_STORAGE_KEY.to_string(), Value::from(token));
        self.save(map)
    }

    fn clear(&self) -> Result<(), ApiError> {
        let mut map = self.load();
        if map.remove(TOKEN_STORAGE_KEY).is_some() {
            self.save(map)?;
        }
        Ok(())
    }
}
