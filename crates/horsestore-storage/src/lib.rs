//! Horsestore Storage - Persistent contract slots with per-call journaling.
//!
//! Storage is a map from word-sized keys to word-sized values, defaulting to
//! zero. Writes made during a call go through a [`StorageTransaction`] and only
//! reach the underlying [`ContractStorage`] when the call commits.

pub mod error;
pub mod journal;
pub mod state_file;

use horsestore_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use error::StorageError;
pub use journal::StorageTransaction;
pub use state_file::StateFile;

/// Word-addressed slot access used by contract code.
pub trait SlotStore {
    /// Read a slot; unset slots read as zero.
    fn sload(&self, key: &U256) -> U256;

    /// Overwrite a slot unconditionally.
    fn sstore(&mut self, key: U256, value: U256);
}

/// Durable slot map of one contract instance.
///
/// Zero-valued slots are not stored, so two storages with the same observable
/// contents compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractStorage {
    slots: BTreeMap<U256, U256>,
}

impl ContractStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get slot value
    pub fn get(&self, key: &U256) -> U256 {
        self.slots.get(key).copied().unwrap_or(U256::ZERO)
    }

    /// Set slot value; writing zero clears the slot
    pub fn set(&mut self, key: U256, value: U256) {
        if value.is_zero() {
            self.slots.remove(&key);
        } else {
            self.slots.insert(key, value);
        }
    }

    /// Number of non-zero slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Non-zero slots in key order
    pub fn iter(&self) -> impl Iterator<Item = (&U256, &U256)> {
        self.slots.iter()
    }

    /// Open a journal over this storage for the duration of one call.
    pub fn begin(&mut self) -> StorageTransaction<'_> {
        StorageTransaction::new(self)
    }
}

impl SlotStore for ContractStorage {
    fn sload(&self, key: &U256) -> U256 {
        self.get(key)
    }

    fn sstore(&mut self, key: U256, value: U256) {
        self.set(key, value);
    }
}

impl FromIterator<(U256, U256)> for ContractStorage {
    fn from_iter<I: IntoIterator<Item = (U256, U256)>>(iter: I) -> Self {
        let mut storage = Self::new();
        for (key, value) in iter {
            storage.set(key, value);
        }
        storage
    }
}
