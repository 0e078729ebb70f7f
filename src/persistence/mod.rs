//! Backup Persistence
//! Opportunistic auto-backup of the interchange document into a string key/value store

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::model::Document;
use crate::serialization::{load_document, to_json_string};


/// Key the backup snapshot lives under
pub const BACKUP_KEY: &str = "fsm";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage is unavailable")]
    Unavailable,
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String key -> string value store with get/set
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-process store, mainly for tests and headless sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for DirectoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        fs::write(path, value)?;
        Ok(())
    }
}

/// Snapshot the document; failures are logged and reported as `false`
pub fn save_backup(store: &mut dyn KeyValueStore, document: &Document) -> bool {
    let json = match to_json_string(document) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not serialize backup: {}", e);
            return false;
        }
    };
    match store.set_item(BACKUP_KEY, &json) {
        Ok(()) => true,
        Err(e) => {
            debug!("Backup not saved: {}", e);
            false
        }
    }
}

/// Restore the last snapshot, if any. The document is only touched when a
/// snapshot exists; an unparsable snapshot leaves it cleared.
pub fn restore_backup(store: &dyn KeyValueStore, document: &mut Document) -> bool {
    let json = match store.get_item(BACKUP_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return false,
        Err(e) => {
            debug!("No backup available: {}", e);
            return false;
        }
    };
    match load_document(document, &json) {
        Ok(_) => true,
        Err(e) => {
            warn!("Discarding unreadable backup: {}", e);
            false
        }
    }
}
