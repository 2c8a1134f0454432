//! Horsestore VM - stack-machine execution for a two-operation storage contract.
//!
//! This crate provides:
//! - Word stack and linear memory primitives
//! - A bytecode interpreter for the opcode subset the contract uses
//! - Selector dispatch with a native (structured) contract backend
//! - A host that serializes calls and commits or rolls back storage per call

pub mod error;
pub mod config;
pub mod stack;
pub mod memory;
pub mod opcode;
pub mod analysis;
pub mod frame;
pub mod interpreter;
pub mod disasm;
pub mod dispatch;
pub mod handlers;
pub mod contract;
pub mod runtime;

pub use error::VmError;
pub use config::VmConfig;
pub use stack::Stack;
pub use memory::Memory;
pub use opcode::Opcode;
pub use analysis::JumpTable;
pub use frame::CallFrame;
pub use interpreter::Interpreter;
pub use dispatch::{DispatchEntry, DispatchTable, Selector};
pub use handlers::{Handler, Operation};
pub use contract::{BytecodeContract, Contract, Halt, NativeContract, HORSE_STORE_RUNTIME};
pub use runtime::{CallContext, CallOutput, ContractInstance, ExecutionResult};

/// VM version constant
pub const VM_VERSION: u32 = 1;

/// Maximum stack size (1024 items)
pub const MAX_STACK_SIZE: usize = 1024;

/// Maximum contract code size (24 KB)
pub const MAX_CODE_SIZE: usize = 24 * 1024;

/// Default linear memory cap per call (1 MB)
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 1024 * 1024;

/// Default instruction budget per call
pub const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Smallest stack depth the horse-store runtime completes every call with
pub const MIN_STACK_DEPTH: usize = 16;

/// Smallest memory cap the horse-store runtime completes every call with
/// (free pointer at 0x40, returned word at 0x80..0xa0)
pub const MIN_MEMORY_BYTES: usize = 0xa0;

/// Smallest instruction budget the horse-store runtime completes every call with
pub const MIN_STEPS: u64 = 64;
