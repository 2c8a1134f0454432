//! The horse-store operations as structured handlers.
//!
//! Each handler runs after the value guard and selector dispatch, against a
//! fresh frame whose memory already holds the free memory pointer.

use bytes::Bytes;
use horsestore_types::{U256, WORD_BYTES};

use crate::contract::Halt;
use crate::dispatch::{DispatchTable, Selector};
use crate::error::VmError;
use crate::frame::CallFrame;

/// Entry point of a native operation.
pub type Handler = fn(&mut CallFrame<'_>) -> Result<Halt, VmError>;

/// The one storage slot the contract uses.
pub const HORSE_SLOT: U256 = U256::ZERO;

/// Operations exposed by the horse-store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    UpdateHorseNumber,
    ReadNumberOfHorses,
}

impl Operation {
    /// Dispatch order.
    pub const ALL: [Operation; 2] = [Operation::UpdateHorseNumber, Operation::ReadNumberOfHorses];

    pub fn selector(&self) -> Selector {
        match self {
            Operation::UpdateHorseNumber => Selector(0xcdfead2e),
            Operation::ReadNumberOfHorses => Selector(0xe026c017),
        }
    }

    /// Human-readable signature the selector was derived from.
    pub fn signature(&self) -> &'static str {
        match self {
            Operation::UpdateHorseNumber => "updateHorseNumber(uint256)",
            Operation::ReadNumberOfHorses => "readNumberOfHorses()",
        }
    }

    pub fn handler(&self) -> Handler {
        match self {
            Operation::UpdateHorseNumber => update_horse_number,
            Operation::ReadNumberOfHorses => read_number_of_horses,
        }
    }

    pub fn from_selector(selector: Selector) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.selector() == selector)
    }

    /// Call input for this operation: selector followed by 32-byte words.
    pub fn encode_call(&self, args: &[U256]) -> Vec<u8> {
        let mut input = Vec::with_capacity(Selector::LEN + args.len() * WORD_BYTES);
        input.extend_from_slice(&self.selector().to_be_bytes());
        for arg in args {
            input.extend_from_slice(&arg.to_be_bytes());
        }
        input
    }
}

/// Store the word argument in the horse slot.
pub fn update_horse_number(frame: &mut CallFrame<'_>) -> Result<Halt, VmError> {
    let available = frame.input().len().saturating_sub(Selector::LEN);
    if available < WORD_BYTES {
        return Err(VmError::ArgumentTooShort {
            expected: WORD_BYTES,
            actual: available,
        });
    }

    let value = frame.calldata_word(Selector::LEN);
    tracing::debug!(value = %value, "updateHorseNumber");
    frame.storage.sstore(HORSE_SLOT, value);
    Ok(Halt::Stop)
}

/// Return the horse slot as one 32-byte word.
pub fn read_number_of_horses(frame: &mut CallFrame<'_>) -> Result<Halt, VmError> {
    let value = frame.storage.sload(&HORSE_SLOT);
    tracing::debug!(value = %value, "readNumberOfHorses");

    let offset = frame.memory.allocate(WORD_BYTES)?;
    frame.memory.store_word(offset, &value)?;
    let data = frame.memory.read(offset, WORD_BYTES)?;
    Ok(Halt::Return(Bytes::from(data)))
}

/// Dispatch table with every [`Operation`] registered.
pub fn horse_store_table() -> Result<DispatchTable<Handler>, VmError> {
    let mut table = DispatchTable::new();
    for op in Operation::ALL {
        table.register(op.selector(), op.signature(), op.handler())?;
    }
    Ok(table)
}

/// Input for `updateHorseNumber(value)`.
pub fn encode_update(value: &U256) -> Vec<u8> {
    Operation::UpdateHorseNumber.encode_call(std::slice::from_ref(value))
}

/// Input for `readNumberOfHorses()`.
pub fn encode_read() -> Vec<u8> {
    Operation::ReadNumberOfHorses.encode_call(&[])
}

/// Decode a single returned word. `None` unless `data` is exactly 32 bytes.
pub fn decode_word(data: &[u8]) -> Option<U256> {
    let bytes: [u8; WORD_BYTES] = data.try_into().ok()?;
    Some(U256::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use crate::runtime::CallContext;
    use horsestore_storage::{ContractStorage, SlotStore};

    #[test]
    fn test_selectors_are_distinct() {
        let table = horse_store_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve(Selector(0xcdfead2e)).map(|e| e.name),
            Some("updateHorseNumber(uint256)")
        );
        assert_eq!(
            Operation::from_selector(Selector(0xe026c017)),
            Some(Operation::ReadNumberOfHorses)
        );
        assert_eq!(Operation::from_selector(Selector(0)), None);
    }

    #[test]
    fn test_encode_update() {
        let input = encode_update(&U256::from(42u64));
        assert_eq!(input.len(), 36);
        assert_eq!(&input[..4], &[0xcd, 0xfe, 0xad, 0x2e]);
        assert_eq!(input[35], 42);
        assert_eq!(encode_read(), vec![0xe0, 0x26, 0xc0, 0x17]);
    }

    #[test]
    fn test_update_writes_slot_zero() {
        let ctx = CallContext::new(encode_update(&U256::from(7u64)));
        let mut storage = ContractStorage::new();
        let mut frame = CallFrame::new(&ctx, &mut storage, &VmConfig::default());
        assert_eq!(update_horse_number(&mut frame), Ok(Halt::Stop));
        assert_eq!(storage.sload(&HORSE_SLOT), U256::from(7u64));
    }

    #[test]
    fn test_update_requires_full_argument() {
        let mut input = encode_update(&U256::ONE);
        input.truncate(35);
        let ctx = CallContext::new(input);
        let mut storage = ContractStorage::new();
        let mut frame = CallFrame::new(&ctx, &mut storage, &VmConfig::default());
        assert_eq!(
            update_horse_number(&mut frame),
            Err(VmError::ArgumentTooShort { expected: 32, actual: 31 })
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn test_read_returns_word_and_bumps_free_pointer() {
        let ctx = CallContext::new(encode_read());
        let mut storage = ContractStorage::new();
        storage.set(HORSE_SLOT, U256::from(99u64));
        let mut frame = CallFrame::new(&ctx, &mut storage, &VmConfig::default());
        frame.memory.init_free_pointer().unwrap();

        let halt = read_number_of_horses(&mut frame).unwrap();
        let Halt::Return(data) = halt else {
            panic!("expected return");
        };
        assert_eq!(decode_word(&data), Some(U256::from(99u64)));
        assert_eq!(frame.memory.len(), 0xa0);
    }

    #[test]
    fn test_decode_word_rejects_wrong_length() {
        assert_eq!(decode_word(&[0u8; 31]), None);
        assert_eq!(decode_word(&[0u8; 32]), Some(U256::ZERO));
    }
}
