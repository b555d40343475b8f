//! Whole-collection JSON snapshots keyed by logical collection name.
//!
//! Every mutating operation rewrites the complete collection. There is a
//! single writer, so replace-on-write never races.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::AppError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error_convert::{IoErrorExt, JsonErrorExt};

pub const CASES_KEY: &str = "cases";
pub const MEDIATIONS_KEY: &str = "mediations";
pub const DEADLINE_TEMPLATES_KEY: &str = "deadlineTemplates";

/// Raw snapshot storage.
pub trait Storage: Send + Sync {
    /// Returns `None` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    fn write(&self, key: &str, contents: &str) -> Result<(), AppError>;
}

/// Load a collection, or its default when the key has never been written.
pub fn load_collection<T>(storage: &dyn Storage, key: &str) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    match storage.read(key)? {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(JsonErrorExt::into_app_error)
        }
        _ => Ok(T::default()),
    }
}

/// Serialize and store a complete collection.
pub fn save_collection<T>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value).map_err(JsonErrorExt::into_app_error)?;
    storage.write(key, &json)?;
    tracing::debug!(key, bytes = json.len(), "snapshot saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::internal("Storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::internal("Storage lock poisoned"))?;
        entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// One `<key>.json` file per collection under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Open (and create if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(IoErrorExt::into_app_error)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into_app_error()),
        }
    }

    fn write(&self, key: &str, contents: &str) -> Result<(), AppError> {
        // Write beside the target and rename so a crash never leaves a torn file.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, contents).map_err(IoErrorExt::into_app_error)?;
        std::fs::rename(&tmp, &path).map_err(IoErrorExt::into_app_error)?;
        Ok(())
    }
}
