//! Call host for a contract instance.
//!
//! A [`ContractInstance`] owns the contract's persistent storage and runs
//! calls against it one at a time. Each call executes inside a storage
//! transaction that is committed only when the call succeeds.

use bytes::Bytes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use horsestore_storage::ContractStorage;
use horsestore_types::U256;

use crate::config::VmConfig;
use crate::contract::{Contract, Halt};
use crate::dispatch::Selector;
use crate::error::VmError;

/// Inputs of one call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Value transferred with the call
    pub value: U256,
    /// Call input: selector followed by arguments
    pub input: Bytes,
}

impl CallContext {
    pub fn new(input: impl Into<Bytes>) -> Self {
        Self {
            value: U256::ZERO,
            input: input.into(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Selector prefix of the input, if there is one.
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_input(&self.input).ok()
    }
}

/// Outcome of a call as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Success, no output
    Stop,
    /// Success with output
    Return(Bytes),
    /// Abort; no storage change is visible
    Revert(VmError),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, ExecutionResult::Revert(_))
    }

    /// Output bytes; empty for `Stop` and `Revert`.
    pub fn output(&self) -> &[u8] {
        match self {
            ExecutionResult::Return(data) => data,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&VmError> {
        match self {
            ExecutionResult::Revert(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Result<Halt, VmError>> for ExecutionResult {
    fn from(result: Result<Halt, VmError>) -> Self {
        match result {
            Ok(Halt::Stop) => ExecutionResult::Stop,
            Ok(Halt::Return(data)) => ExecutionResult::Return(data),
            Err(err) => ExecutionResult::Revert(err),
        }
    }
}

/// Caller-facing call outcome: `{ ok, data }`.
///
/// Aborts carry no data and no reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutput {
    pub ok: bool,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl From<ExecutionResult> for CallOutput {
    fn from(result: ExecutionResult) -> Self {
        match result {
            ExecutionResult::Stop => CallOutput { ok: true, data: Vec::new() },
            ExecutionResult::Return(data) => CallOutput { ok: true, data: data.to_vec() },
            ExecutionResult::Revert(_) => CallOutput { ok: false, data: Vec::new() },
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

/// A deployed contract together with its storage.
///
/// Calls are serialized: each holds the storage lock from start to finish,
/// so no two calls interleave and a caller only ever observes committed
/// state.
pub struct ContractInstance<C: Contract> {
    contract: C,
    storage: Mutex<ContractStorage>,
    config: VmConfig,
}

impl<C: Contract> ContractInstance<C> {
    pub fn new(contract: C, config: VmConfig) -> Self {
        Self::with_storage(contract, ContractStorage::new(), config)
    }

    /// Resume an instance from previously saved storage.
    pub fn with_storage(contract: C, storage: ContractStorage, config: VmConfig) -> Self {
        Self {
            contract,
            storage: Mutex::new(storage),
            config,
        }
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Run one call. Storage writes are kept only if the call succeeds.
    pub fn call(&self, ctx: &CallContext) -> ExecutionResult {
        let mut storage = self.storage.lock();
        let mut tx = storage.begin();

        let result = self.contract.execute(ctx, &mut tx, &self.config);

        match &result {
            Ok(_) => {
                let writes = tx.commit();
                tracing::info!(
                    contract = self.contract.name(),
                    selector = ?ctx.selector(),
                    writes,
                    "call committed"
                );
            }
            Err(err) => {
                tx.rollback();
                if err.is_fatal() {
                    tracing::warn!(contract = self.contract.name(), error = %err, "call aborted");
                } else {
                    tracing::debug!(contract = self.contract.name(), error = %err, "call reverted");
                }
            }
        }

        result.into()
    }

    /// Convenience wrapper around [`call`](Self::call).
    pub fn transact(&self, value: U256, input: impl Into<Bytes>) -> CallOutput {
        let ctx = CallContext::new(input).with_value(value);
        self.call(&ctx).into()
    }

    /// Copy of the committed storage.
    pub fn storage_snapshot(&self) -> ContractStorage {
        self.storage.lock().clone()
    }

    /// Replace the committed storage wholesale.
    pub fn restore(&self, storage: ContractStorage) {
        *self.storage.lock() = storage;
    }

    pub fn slot(&self, key: &U256) -> U256 {
        self.storage.lock().get(key)
    }
}
