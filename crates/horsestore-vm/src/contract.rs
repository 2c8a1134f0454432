//! Contract backends.
//!
//! [`NativeContract`] runs structured handlers picked from a dispatch table.
//! [`BytecodeContract`] interprets compiled runtime code instruction by
//! instruction. Both produce the same outcome and storage writes for every
//! call.

use std::fmt;

use bytes::Bytes;
use horsestore_storage::SlotStore;
use horsestore_types::U256;

use crate::analysis::JumpTable;
use crate::config::VmConfig;
use crate::dispatch::{DispatchTable, Selector};
use crate::error::VmError;
use crate::frame::CallFrame;
use crate::handlers::{horse_store_table, Handler};
use crate::interpreter::Interpreter;
use crate::runtime::CallContext;
use crate::MAX_CODE_SIZE;

/// Successful termination of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// Success without output
    Stop,
    /// Success with output bytes
    Return(Bytes),
}

/// Something that can execute a call against storage.
pub trait Contract: Send + Sync {
    fn name(&self) -> &str;

    /// Execute one call. Storage writes go straight to `storage`; the caller
    /// is responsible for discarding them on error.
    fn execute(
        &self,
        ctx: &CallContext,
        storage: &mut dyn SlotStore,
        config: &VmConfig,
    ) -> Result<Halt, VmError>;
}

impl<C: Contract + ?Sized> Contract for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(
        &self,
        ctx: &CallContext,
        storage: &mut dyn SlotStore,
        config: &VmConfig,
    ) -> Result<Halt, VmError> {
        (**self).execute(ctx, storage, config)
    }
}

/// Compiled horse-store runtime program, trailing metadata included.
pub const HORSE_STORE_RUNTIME: &[u8] = &[
    0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x60, 0x0e, 0x57, 0x5f, 0x80, 0xfd, 0x5b, 0x50,
    0x60, 0x04, 0x36, 0x10, 0x60, 0x30, 0x57, 0x5f, 0x35, 0x60, 0xe0, 0x1c, 0x80, 0x63, 0xcd, 0xfe,
    0xad, 0x2e, 0x14, 0x60, 0x34, 0x57, 0x80, 0x63, 0xe0, 0x26, 0xc0, 0x17, 0x14, 0x60, 0x45, 0x57,
    0x5b, 0x5f, 0x80, 0xfd, 0x5b, 0x60, 0x43, 0x60, 0x3f, 0x36, 0x60, 0x04, 0x60, 0x59, 0x56, 0x5b,
    0x5f, 0x55, 0x56, 0x5b, 0x00, 0x5b, 0x5f, 0x54, 0x60, 0x40, 0x51, 0x90, 0x81, 0x52, 0x60, 0x20,
    0x01, 0x60, 0x40, 0x51, 0x80, 0x91, 0x03, 0x90, 0xf3, 0x5b, 0x5f, 0x60, 0x20, 0x82, 0x84, 0x03,
    0x12, 0x15, 0x60, 0x68, 0x57, 0x5f, 0x80, 0xfd, 0x5b, 0x50, 0x35, 0x91, 0x90, 0x50, 0x56, 0xfe,
    0xa2, 0x64, 0x69, 0x70, 0x66, 0x73, 0x58, 0x22, 0x12, 0x20, 0x51, 0x75, 0xaa, 0xf8, 0x55, 0xaa,
    0x11, 0xcb, 0x07, 0xe2, 0xf9, 0x2a, 0xf0, 0x7a, 0x31, 0xc0, 0xb0, 0xb8, 0x70, 0x09, 0xa9, 0xa5,
    0x6a, 0x8d, 0x97, 0xdf, 0x3b, 0x8e, 0x39, 0xc7, 0x35, 0x3c, 0x64, 0x73, 0x6f, 0x6c, 0x63, 0x43,
    0x00, 0x08, 0x14, 0x00, 0x33,
];

/// Interprets runtime bytecode.
#[derive(Debug, Clone)]
pub struct BytecodeContract {
    name: String,
    code: Bytes,
    jumpdests: JumpTable,
}

impl BytecodeContract {
    pub fn new(name: impl Into<String>, code: impl Into<Bytes>) -> Result<Self, VmError> {
        let code = code.into();
        if code.len() > MAX_CODE_SIZE {
            return Err(VmError::CodeSizeExceeded {
                size: code.len(),
                limit: MAX_CODE_SIZE,
            });
        }
        let jumpdests = JumpTable::analyze(&code);
        Ok(Self {
            name: name.into(),
            code,
            jumpdests,
        })
    }

    pub fn horse_store() -> Self {
        Self {
            name: "HorseStore".to_string(),
            code: Bytes::from_static(HORSE_STORE_RUNTIME),
            jumpdests: JumpTable::analyze(HORSE_STORE_RUNTIME),
        }
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn jumpdests(&self) -> &JumpTable {
        &self.jumpdests
    }
}

impl Contract for BytecodeContract {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        ctx: &CallContext,
        storage: &mut dyn SlotStore,
        config: &VmConfig,
    ) -> Result<Halt, VmError> {
        let frame = CallFrame::new(ctx, storage, config);
        Interpreter::new(&self.code, &self.jumpdests, frame, config).run()
    }
}

/// Structured dispatch over native handlers.
#[derive(Clone)]
pub struct NativeContract {
    name: String,
    table: DispatchTable<Handler>,
}

impl NativeContract {
    pub fn new(name: impl Into<String>, table: DispatchTable<Handler>) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    pub fn horse_store() -> Result<Self, VmError> {
        Ok(Self::new("HorseStore", horse_store_table()?))
    }

    pub fn table(&self) -> &DispatchTable<Handler> {
        &self.table
    }
}

impl fmt::Debug for NativeContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selectors: Vec<String> = self
            .table
            .entries()
            .iter()
            .map(|e| format!("{} {}", e.selector, e.name))
            .collect();
        f.debug_struct("NativeContract")
            .field("name", &self.name)
            .field("selectors", &selectors)
            .finish()
    }
}

impl Contract for NativeContract {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        ctx: &CallContext,
        storage: &mut dyn SlotStore,
        config: &VmConfig,
    ) -> Result<Halt, VmError> {
        // Same prologue as the compiled program: free pointer first.
        let mut frame = CallFrame::new(ctx, storage, config);
        frame.memory.init_free_pointer()?;

        if ctx.value != U256::ZERO {
            return Err(VmError::ValueNotZero { value: ctx.value });
        }

        let selector = Selector::from_input(&ctx.input)?;
        let entry = self
            .table
            .resolve(selector)
            .ok_or(VmError::UnknownSelector(selector))?;
        tracing::debug!(selector = %selector, handler = entry.name, "dispatch");

        (entry.handler)(&mut frame)
    }
}
