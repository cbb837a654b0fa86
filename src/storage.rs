use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::InputParameters;

pub const STORAGE_KEY: &str = "sr_calc";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize parameters: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

pub trait ParameterStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn save(&self, snapshot: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ParameterStore for FileStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, snapshot: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let staging = self.staging_path();
        fs::write(&staging, snapshot).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParameterStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(STORAGE_KEY).cloned())
    }

    fn save(&self, snapshot: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(STORAGE_KEY.to_string(), snapshot.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(STORAGE_KEY);
        Ok(())
    }
}

pub fn load_or_default(store: &dyn ParameterStore) -> InputParameters {
    let raw = match store.load() {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no stored snapshot; using defaults");
            return InputParameters::default();
        }
        Err(error) => {
            warn!(%error, "stored snapshot unreadable; using defaults");
            return InputParameters::default();
        }
    };

    match serde_json::from_str::<InputParameters>(&raw) {
        Ok(params) => params,
        Err(error) => {
            warn!(%error, "stored snapshot malformed; using defaults");
            InputParameters::default()
        }
    }
}

pub fn save_params(
    store: &dyn ParameterStore,
    params: &InputParameters,
) -> Result<(), StorageError> {
    let snapshot = serde_json::to_string(params)?;
    store.save(&snapshot)?;
    info!(bytes = snapshot.len(), "saved parameter snapshot");
    Ok(())
}

pub fn reset_params(store: &dyn ParameterStore) -> Result<InputParameters, StorageError> {
    store.clear()?;
    info!("cleared parameter snapshot");
    Ok(InputParameters::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, View};

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let params = InputParameters::default()
            .with_field(Field::MonthlyRent, 2_400.0)
            .with_view(View::Rental);

        save_params(&store, &params).expect("save");
        assert_eq!(load_or_default(&store), params);
    }

    #[test]
    fn missing_snapshot_loads_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_or_default(&store), InputParameters::default());
    }

    #[test]
    fn malformed_snapshot_loads_defaults() {
        let store = MemoryStore::new();
        store.save("{not json").expect("save raw");
        assert_eq!(load_or_default(&store), InputParameters::default());

        store.save(r#"{"sharedArea":"big"}"#).expect("save raw");
        assert_eq!(load_or_default(&store), InputParameters::default());
    }

    #[test]
    fn reset_clears_and_returns_defaults() {
        let store = MemoryStore::new();
        let params = InputParameters::default().with_field(Field::PurchasePrice, 1.0);
        save_params(&store, &params).expect("save");

        let restored = reset_params(&store).expect("reset");
        assert_eq!(restored, InputParameters::default());
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.path().ends_with("sr_calc.json"));
        assert_eq!(store.load().expect("load"), None);

        let params = InputParameters::default().with_field(Field::CarryMonths, 7.0);
        save_params(&store, &params).expect("save");
        assert!(store.path().exists());
        assert_eq!(load_or_default(&store), params);

        store.clear().expect("clear");
        assert!(!store.path().exists());
        store.clear().expect("clearing twice is fine");
    }

    #[test]
    fn file_store_overwrite_replaces_whole_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        let first = InputParameters::default().with_field(Field::MonthlyRent, 1_000.0);
        save_params(&store, &first).expect("first save");
        let second = InputParameters::default()
            .with_field(Field::MonthlyRent, 2_750.0)
            .with_view(View::Rental);
        save_params(&store, &second).expect("second save");

        assert_eq!(load_or_default(&store), second);
        assert!(!store.staging_path().exists());
        let entries: Vec<_> = fs::read_dir(dir.path()).expect("read dir").collect();
        assert_eq!(entries.len(), 1);
    }
}
