use horsestore_types::U256;
use thiserror::Error;

use crate::dispatch::Selector;

/// Reasons a call aborts.
///
/// Every variant is surfaced to the caller the same way: the call fails,
/// produces no output and leaves storage untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmError {
    #[error("Call value must be zero, got {value}")]
    ValueNotZero { value: U256 },

    #[error("Call input too short for a selector: {len} bytes")]
    SelectorTooShort { len: usize },

    #[error("Unknown selector: {0}")]
    UnknownSelector(Selector),

    #[error("Argument too short: expected {expected} bytes, got {actual}")]
    ArgumentTooShort { expected: usize, actual: usize },

    #[error("Stack underflow: required {required}, available {available}")]
    StackUnderflow { required: usize, available: usize },

    #[error("Stack overflow: limit {limit}")]
    StackOverflow { limit: usize },

    #[error("Invalid jump target: {target:x}")]
    InvalidJumpTarget { target: U256 },

    #[error("Invalid opcode 0x{opcode:02x} at pc {pc}")]
    InvalidOpcode { opcode: u8, pc: usize },

    #[error("Execution ran past end of code at pc {pc}")]
    UnexpectedEndOfCode { pc: usize },

    #[error("Memory limit exceeded: {size} > {limit}")]
    MemoryLimitExceeded { size: usize, limit: usize },

    #[error("Step limit exceeded: {limit}")]
    StepLimitExceeded { limit: u64 },

    #[error("Code size exceeded: {size} > {limit}")]
    CodeSizeExceeded { size: usize, limit: usize },

    #[error("Duplicate selector in dispatch table: {0}")]
    DuplicateSelector(Selector),

    #[error("Execution reverted (data: 0x{})", hex::encode(.data))]
    Reverted { data: Vec<u8> },

    #[error("Invalid VM config: {0}")]
    InvalidConfig(String),
}

impl VmError {
    /// Interpreter-integrity violations: a malformed program or a broken
    /// handler, as opposed to a caller-induced abort.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VmError::StackUnderflow { .. }
                | VmError::StackOverflow { .. }
                | VmError::InvalidJumpTarget { .. }
                | VmError::InvalidOpcode { .. }
                | VmError::UnexpectedEndOfCode { .. }
                | VmError::MemoryLimitExceeded { .. }
                | VmError::StepLimitExceeded { .. }
        )
    }
}
