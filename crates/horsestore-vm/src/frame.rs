//! Call-scoped execution state.

use horsestore_storage::SlotStore;
use horsestore_types::{U256, WORD_BYTES};

use crate::config::VmConfig;
use crate::memory::Memory;
use crate::runtime::CallContext;
use crate::stack::Stack;

/// Stack, memory and live storage of one call.
///
/// Stack and memory start empty and are discarded when the call ends.
pub struct CallFrame<'a> {
    pub ctx: &'a CallContext,
    pub stack: Stack,
    pub memory: Memory,
    pub storage: &'a mut dyn SlotStore,
}

impl<'a> CallFrame<'a> {
    pub fn new(ctx: &'a CallContext, storage: &'a mut dyn SlotStore, config: &VmConfig) -> Self {
        Self {
            ctx,
            stack: Stack::new(config.max_stack_depth),
            memory: Memory::new(config.max_memory_bytes),
            storage,
        }
    }

    pub fn input(&self) -> &[u8] {
        &self.ctx.input
    }

    /// 32 bytes of call input starting at `offset`, zero-padded past the end.
    pub fn calldata_word(&self, offset: usize) -> U256 {
        let input = self.input();
        let mut word = [0u8; WORD_BYTES];
        if offset < input.len() {
            let end = input.len().min(offset.saturating_add(WORD_BYTES));
            word[..end - offset].copy_from_slice(&input[offset..end]);
        }
        U256::from_be_bytes(word)
    }

    /// Like [`calldata_word`](Self::calldata_word) for a word-sized offset.
    pub fn calldata_word_at(&self, offset: &U256) -> U256 {
        match offset.to_usize() {
            Some(offset) => self.calldata_word(offset),
            None => U256::ZERO,
        }
    }
}
