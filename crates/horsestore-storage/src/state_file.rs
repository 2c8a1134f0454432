//! State file - JSON snapshot of a contract's storage on disk

use crate::{ContractStorage, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Current on-disk format version
pub const STATE_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateSnapshot {
    version: u32,
    slots: ContractStorage,
}

/// JSON file holding one contract's slots between host invocations.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Path is validated to prevent directory traversal.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(StorageError::InvalidPath(path.display().to_string()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load storage; a missing file is an empty storage.
    pub fn load(&self) -> Result<ContractStorage, StorageError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no state file, starting empty");
            return Ok(ContractStorage::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let snapshot: StateSnapshot = serde_json::from_str(&content)
            .map_err(|e| StorageError::Deserialization(e.to_string()))?;
        if snapshot.version != STATE_FILE_VERSION {
            return Err(StorageError::UnsupportedVersion(snapshot.version));
        }

        tracing::info!(
            path = %self.path.display(),
            slots = snapshot.slots.len(),
            "loaded contract state"
        );
        Ok(snapshot.slots)
    }

    /// Persist storage, replacing the file atomically.
    pub fn save(&self, storage: &ContractStorage) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = StateSnapshot {
            version: STATE_FILE_VERSION,
            slots: storage.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), slots = storage.len(), "saved contract state");
        Ok(())
    }
}
