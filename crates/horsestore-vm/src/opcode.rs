//! Instruction set.
//!
//! Only the instructions the horse-store runtime program executes are
//! decoded. Every other byte is an invalid opcode when reached.

use std::fmt;

/// Raw opcode bytes.
pub mod op {
    pub const STOP: u8 = 0x00;
    pub const ADD: u8 = 0x01;
    pub const SUB: u8 = 0x03;
    pub const LT: u8 = 0x10;
    pub const GT: u8 = 0x11;
    pub const SLT: u8 = 0x12;
    pub const EQ: u8 = 0x14;
    pub const ISZERO: u8 = 0x15;
    pub const SHR: u8 = 0x1c;
    pub const CALLVALUE: u8 = 0x34;
    pub const CALLDATALOAD: u8 = 0x35;
    pub const CALLDATASIZE: u8 = 0x36;
    pub const POP: u8 = 0x50;
    pub const MLOAD: u8 = 0x51;
    pub const MSTORE: u8 = 0x52;
    pub const SLOAD: u8 = 0x54;
    pub const SSTORE: u8 = 0x55;
    pub const JUMP: u8 = 0x56;
    pub const JUMPI: u8 = 0x57;
    pub const JUMPDEST: u8 = 0x5b;
    pub const PUSH0: u8 = 0x5f;
    pub const PUSH1: u8 = 0x60;
    pub const PUSH2: u8 = 0x61;
    pub const PUSH4: u8 = 0x63;
    pub const PUSH32: u8 = 0x7f;
    pub const DUP1: u8 = 0x80;
    pub const DUP16: u8 = 0x8f;
    pub const SWAP1: u8 = 0x90;
    pub const SWAP16: u8 = 0x9f;
    pub const RETURN: u8 = 0xf3;
    pub const REVERT: u8 = 0xfd;
    pub const INVALID: u8 = 0xfe;
}

/// A decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Stop,
    Add,
    Sub,
    Lt,
    Gt,
    Slt,
    Eq,
    IsZero,
    Shr,
    CallValue,
    CallDataLoad,
    CallDataSize,
    Pop,
    MLoad,
    MStore,
    SLoad,
    SStore,
    Jump,
    JumpI,
    JumpDest,
    /// PUSH0..PUSH32; the payload is the immediate width in bytes
    Push(u8),
    /// DUP1..DUP16
    Dup(u8),
    /// SWAP1..SWAP16
    Swap(u8),
    Return,
    Revert,
    Invalid,
}

impl Opcode {
    pub fn decode(byte: u8) -> Option<Self> {
        let opcode = match byte {
            op::STOP => Opcode::Stop,
            op::ADD => Opcode::Add,
            op::SUB => Opcode::Sub,
            op::LT => Opcode::Lt,
            op::GT => Opcode::Gt,
            op::SLT => Opcode::Slt,
            op::EQ => Opcode::Eq,
            op::ISZERO => Opcode::IsZero,
            op::SHR => Opcode::Shr,
            op::CALLVALUE => Opcode::CallValue,
            op::CALLDATALOAD => Opcode::CallDataLoad,
            op::CALLDATASIZE => Opcode::CallDataSize,
            op::POP => Opcode::Pop,
            op::MLOAD => Opcode::MLoad,
            op::MSTORE => Opcode::MStore,
            op::SLOAD => Opcode::SLoad,
            op::SSTORE => Opcode::SStore,
            op::JUMP => Opcode::Jump,
            op::JUMPI => Opcode::JumpI,
            op::JUMPDEST => Opcode::JumpDest,
            op::PUSH0..=op::PUSH32 => Opcode::Push(byte - op::PUSH0),
            op::DUP1..=op::DUP16 => Opcode::Dup(byte - op::DUP1 + 1),
            op::SWAP1..=op::SWAP16 => Opcode::Swap(byte - op::SWAP1 + 1),
            op::RETURN => Opcode::Return,
            op::REVERT => Opcode::Revert,
            op::INVALID => Opcode::Invalid,
            _ => return None,
        };
        Some(opcode)
    }

    pub fn byte(&self) -> u8 {
        match *self {
            Opcode::Stop => op::STOP,
            Opcode::Add => op::ADD,
            Opcode::Sub => op::SUB,
            Opcode::Lt => op::LT,
            Opcode::Gt => op::GT,
            Opcode::Slt => op::SLT,
            Opcode::Eq => op::EQ,
            Opcode::IsZero => op::ISZERO,
            Opcode::Shr => op::SHR,
            Opcode::CallValue => op::CALLVALUE,
            Opcode::CallDataLoad => op::CALLDATALOAD,
            Opcode::CallDataSize => op::CALLDATASIZE,
            Opcode::Pop => op::POP,
            Opcode::MLoad => op::MLOAD,
            Opcode::MStore => op::MSTORE,
            Opcode::SLoad => op::SLOAD,
            Opcode::SStore => op::SSTORE,
            Opcode::Jump => op::JUMP,
            Opcode::JumpI => op::JUMPI,
            Opcode::JumpDest => op::JUMPDEST,
            Opcode::Push(n) => op::PUSH0 + n,
            Opcode::Dup(n) => op::DUP1 + n - 1,
            Opcode::Swap(n) => op::SWAP1 + n - 1,
            Opcode::Return => op::RETURN,
            Opcode::Revert => op::REVERT,
            Opcode::Invalid => op::INVALID,
        }
    }

    /// Items that must be on the stack before execution.
    pub fn stack_inputs(&self) -> usize {
        match *self {
            Opcode::Stop
            | Opcode::CallValue
            | Opcode::CallDataSize
            | Opcode::JumpDest
            | Opcode::Push(_)
            | Opcode::Invalid => 0,
            Opcode::IsZero
            | Opcode::CallDataLoad
            | Opcode::Pop
            | Opcode::MLoad
            | Opcode::SLoad
            | Opcode::Jump => 1,
            Opcode::Add
            | Opcode::Sub
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Slt
            | Opcode::Eq
            | Opcode::Shr
            | Opcode::MStore
            | Opcode::SStore
            | Opcode::JumpI
            | Opcode::Return
            | Opcode::Revert => 2,
            Opcode::Dup(n) => n as usize,
            Opcode::Swap(n) => n as usize + 1,
        }
    }

    /// Items on the stack after execution, in place of the inputs.
    pub fn stack_outputs(&self) -> usize {
        match *self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Slt
            | Opcode::Eq
            | Opcode::IsZero
            | Opcode::Shr
            | Opcode::CallValue
            | Opcode::CallDataLoad
            | Opcode::CallDataSize
            | Opcode::MLoad
            | Opcode::SLoad
            | Opcode::Push(_) => 1,
            Opcode::Dup(n) => n as usize + 1,
            Opcode::Swap(n) => n as usize + 1,
            _ => 0,
        }
    }

    /// Bytes of inline data following the opcode.
    pub fn immediate_len(&self) -> usize {
        match *self {
            Opcode::Push(n) => n as usize,
            _ => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Opcode::Push(n) => write!(f, "PUSH{}", n),
            Opcode::Dup(n) => write!(f, "DUP{}", n),
            Opcode::Swap(n) => write!(f, "SWAP{}", n),
            other => {
                let name = match other {
                    Opcode::Stop => "STOP",
                    Opcode::Add => "ADD",
                    Opcode::Sub => "SUB",
                    Opcode::Lt => "LT",
                    Opcode::Gt => "GT",
                    Opcode::Slt => "SLT",
                    Opcode::Eq => "EQ",
                    Opcode::IsZero => "ISZERO",
                    Opcode::Shr => "SHR",
                    Opcode::CallValue => "CALLVALUE",
                    Opcode::CallDataLoad => "CALLDATALOAD",
                    Opcode::CallDataSize => "CALLDATASIZE",
                    Opcode::Pop => "POP",
                    Opcode::MLoad => "MLOAD",
                    Opcode::MStore => "MSTORE",
                    Opcode::SLoad => "SLOAD",
                    Opcode::SStore => "SSTORE",
                    Opcode::Jump => "JUMP",
                    Opcode::JumpI => "JUMPI",
                    Opcode::JumpDest => "JUMPDEST",
                    Opcode::Return => "RETURN",
                    Opcode::Revert => "REVERT",
                    _ => "INVALID",
                };
                f.write_str(name)
            }
        }
    }
}
