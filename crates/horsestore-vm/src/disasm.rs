//! Instruction listing.

use std::fmt;

use crate::opcode::{op, Opcode};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub pc: usize,
    pub byte: u8,
    pub opcode: Option<Opcode>,
    /// PUSH immediate, zero-padded when the code ends early
    pub immediate: Vec<u8>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}  ", self.pc)?;
        match self.opcode {
            Some(opcode) if self.immediate.is_empty() => write!(f, "{}", opcode),
            Some(opcode) => write!(f, "{} 0x{}", opcode, hex::encode(&self.immediate)),
            None => write!(f, "UNKNOWN(0x{:02x})", self.byte),
        }
    }
}

/// Decode the whole byte sequence, including any trailing data.
pub fn disassemble(code: &[u8]) -> Vec<Instruction> {
    let mut out = Vec::new();
    let mut pc = 0;

    while pc < code.len() {
        let byte = code[pc];
        let opcode = Opcode::decode(byte);
        let width = opcode.map(|o| o.immediate_len()).unwrap_or(0);

        let start = (pc + 1).min(code.len());
        let end = (pc + 1 + width).min(code.len());
        let mut immediate = code[start..end].to_vec();
        immediate.resize(width, 0);

        out.push(Instruction {
            pc,
            byte,
            opcode,
            immediate,
        });
        pc += 1 + width;
    }

    out
}

/// Decode up to and including the first `INVALID`, which separates a
/// compiled program from its metadata.
pub fn disassemble_program(code: &[u8]) -> Vec<Instruction> {
    let mut out = disassemble(code);
    if let Some(pos) = out.iter().position(|i| i.byte == op::INVALID) {
        out.truncate(pos + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HORSE_STORE_RUNTIME;

    #[test]
    fn test_listing_format() {
        let listing = disassemble(&[op::PUSH1, 0x80, op::PUSH0, op::MSTORE, 0xa2]);
        let lines: Vec<String> = listing.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "0x0000  PUSH1 0x80",
                "0x0002  PUSH0",
                "0x0003  MSTORE",
                "0x0004  UNKNOWN(0xa2)",
            ]
        );
    }

    #[test]
    fn test_truncated_push_is_padded() {
        let listing = disassemble(&[op::PUSH2, 0xab]);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].immediate, vec![0xab, 0x00]);
    }

    #[test]
    fn test_horse_store_program_ends_at_invalid() {
        let program = disassemble_program(HORSE_STORE_RUNTIME);
        let last = program.last().unwrap();
        assert_eq!(last.pc, 0x6f);
        assert_eq!(last.opcode, Some(Opcode::Invalid));
        assert!(program.iter().all(|i| i.opcode.is_some()));
        assert!(disassemble(HORSE_STORE_RUNTIME).len() > program.len());
    }

    #[test]
    fn test_horse_store_dispatch_prologue() {
        let program = disassemble_program(HORSE_STORE_RUNTIME);
        let selector_push = program
            .iter()
            .find(|i| i.opcode == Some(Opcode::Push(4)))
            .unwrap();
        assert_eq!(selector_push.immediate, vec![0xcd, 0xfe, 0xad, 0x2e]);
    }
}
