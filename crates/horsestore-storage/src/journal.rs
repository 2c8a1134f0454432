//! Per-call write journal.
//!
//! A [`StorageTransaction`] buffers every `sstore` of a call. Reads see the
//! buffered writes first. Nothing reaches the base storage until
//! [`StorageTransaction::commit`]; dropping the transaction discards the
//! buffer, which is how a reverted call leaves storage untouched.

use crate::{ContractStorage, SlotStore};
use horsestore_types::U256;
use std::collections::BTreeMap;

/// Pending writes of one call over a borrowed [`ContractStorage`].
#[derive(Debug)]
pub struct StorageTransaction<'a> {
    base: &'a mut ContractStorage,
    pending: BTreeMap<U256, U256>,
}

impl<'a> StorageTransaction<'a> {
    pub(crate) fn new(base: &'a mut ContractStorage) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    /// Number of distinct slots written so far
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Apply all buffered writes to the base storage.
    ///
    /// Returns the number of slots written.
    pub fn commit(self) -> usize {
        let writes = self.pending.len();
        for (key, value) in self.pending {
            self.base.set(key, value);
        }
        tracing::debug!(writes, "storage transaction committed");
        writes
    }

    /// Discard all buffered writes.
    pub fn rollback(self) {
        tracing::debug!(discarded = self.pending.len(), "storage transaction rolled back");
    }
}

impl SlotStore for StorageTransaction<'_> {
    fn sload(&self, key: &U256) -> U256 {
        match self.pending.get(key) {
            Some(value) => *value,
            None => self.base.get(key),
        }
    }

    fn sstore(&mut self, key: U256, value: U256) {
        self.pending.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reads_see_pending_writes() {
        let mut storage = ContractStorage::new();
        storage.set(U256::ZERO, U256::from(1u64));

        let mut tx = storage.begin();
        assert_eq!(tx.sload(&U256::ZERO), U256::from(1u64));
        tx.sstore(U256::ZERO, U256::from(2u64));
        assert_eq!(tx.sload(&U256::ZERO), U256::from(2u64));
        assert_eq!(tx.pending_writes(), 1);
    }

    #[test]
    fn test_commit_applies_writes() {
        let mut storage = ContractStorage::new();
        let mut tx = storage.begin();
        tx.sstore(U256::ZERO, U256::from(42u64));
        tx.sstore(U256::ZERO, U256::from(43u64));
        assert_eq!(tx.commit(), 1);
        assert_eq!(storage.get(&U256::ZERO), U256::from(43u64));
    }

    #[test]
    fn test_rollback_discards_writes() {
        let mut storage = ContractStorage::new();
        storage.set(U256::ZERO, U256::from(9u64));
        let before = storage.clone();

        let mut tx = storage.begin();
        tx.sstore(U256::ZERO, U256::from(10u64));
        tx.sstore(U256::ONE, U256::from(11u64));
        tx.rollback();

        assert_eq!(storage, before);
    }

    #[test]
    fn test_drop_without_commit_discards_writes() {
        let mut storage = ContractStorage::new();
        {
            let mut tx = storage.begin();
            tx.sstore(U256::ZERO, U256::from(5u64));
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn test_commit_of_zero_clears_slot() {
        let mut storage = ContractStorage::new();
        storage.set(U256::ZERO, U256::from(5u64));
        let mut tx = storage.begin();
        tx.sstore(U256::ZERO, U256::ZERO);
        tx.commit();
        assert!(storage.is_empty());
    }

    fn slot() -> impl Strategy<Value = U256> {
        (0u64..4).prop_map(U256::from)
    }

    fn writes() -> impl Strategy<Value = Vec<(U256, U256)>> {
        prop::collection::vec((slot(), (0u64..3).prop_map(U256::from)), 0..12)
    }

    proptest! {
        #[test]
        fn prop_rollback_restores_prior_state(prior in writes(), call in writes()) {
            let mut storage = ContractStorage::new();
            for (key, value) in prior {
                storage.set(key, value);
            }
            let before = storage.clone();

            let mut tx = storage.begin();
            for (key, value) in call {
                tx.sstore(key, value);
            }
            tx.rollback();

            prop_assert_eq!(storage, before);
        }

        #[test]
        fn prop_commit_matches_direct_writes(prior in writes(), call in writes()) {
            let mut storage = ContractStorage::new();
            for (key, value) in prior {
                storage.set(key, value);
            }
            let mut expected = storage.clone();
            for (key, value) in &call {
                expected.set(*key, *value);
            }

            let mut tx = storage.begin();
            for (key, value) in call {
                tx.sstore(key, value);
            }
            tx.commit();

            prop_assert_eq!(storage, expected);
        }
    }
}
