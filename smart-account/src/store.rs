//! Key/value persistence for the session owner key and session descriptor.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{lock, AaError};

pub const SESSION_OWNER_KEY: &str = "sessionOwnerKey";
pub const SESSION_DATA_KEY: &str = "smartSessionData";

pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, AaError>;
    fn save(&self, key: &str, value: &str) -> Result<(), AaError>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn load(&self, key: &str) -> Result<Option<String>, AaError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AaError> {
        (**self).save(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, AaError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AaError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<cache dir>/vortex/aa-session.json`.
    pub fn default_path() -> PathBuf {
        let cache = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        cache.join("vortex").join("aa-session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, AaError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, AaError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), AaError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        tracing::debug!(path = %self.path.display(), key, "saved session store entry");
        Ok(())
    }
}
