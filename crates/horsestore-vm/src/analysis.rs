//! Static jump-destination analysis.

use crate::opcode::op;

/// Offsets in a program that may be jumped to.
///
/// An offset qualifies when it holds `JUMPDEST` and is an instruction
/// boundary, i.e. not inside the immediate bytes of a PUSH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    valid: Vec<bool>,
}

impl JumpTable {
    pub fn analyze(code: &[u8]) -> Self {
        let mut valid = vec![false; code.len()];
        let mut pc = 0;

        while pc < code.len() {
            let byte = code[pc];
            if byte == op::JUMPDEST {
                valid[pc] = true;
            }
            pc += 1;
            if (op::PUSH1..=op::PUSH32).contains(&byte) {
                pc += (byte - op::PUSH0) as usize;
            }
        }

        Self { valid }
    }

    pub fn is_valid(&self, pc: usize) -> bool {
        self.valid.get(pc).copied().unwrap_or(false)
    }

    /// All valid destinations in ascending order
    pub fn destinations(&self) -> Vec<usize> {
        self.valid
            .iter()
            .enumerate()
            .filter_map(|(pc, &ok)| ok.then_some(pc))
            .collect()
    }
}
