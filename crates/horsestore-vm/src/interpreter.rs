//! Bytecode interpreter loop.
//!
//! Fetches, decodes and executes one instruction at a time against a
//! [`CallFrame`]. Each instruction's stack precondition is checked before it
//! runs; control only moves through `JUMP`/`JUMPI` to analyzed destinations,
//! and running off the end of the code is an abort, not an implicit stop.

use bytes::Bytes;
use horsestore_types::U256;

use crate::analysis::JumpTable;
use crate::config::VmConfig;
use crate::contract::Halt;
use crate::error::VmError;
use crate::frame::CallFrame;
use crate::opcode::Opcode;

/// Executes a program over a call frame.
pub struct Interpreter<'a> {
    code: &'a [u8],
    jumpdests: &'a JumpTable,
    frame: CallFrame<'a>,
    pc: usize,
    steps: u64,
    max_steps: u64,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        code: &'a [u8],
        jumpdests: &'a JumpTable,
        frame: CallFrame<'a>,
        config: &VmConfig,
    ) -> Self {
        Self {
            code,
            jumpdests,
            frame,
            pc: 0,
            steps: 0,
            max_steps: config.max_steps,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn frame(&self) -> &CallFrame<'a> {
        &self.frame
    }

    /// Run until the program halts or aborts.
    pub fn run(mut self) -> Result<Halt, VmError> {
        loop {
            if let Some(halt) = self.step()? {
                tracing::debug!(steps = self.steps, pc = self.pc, "program halted");
                return Ok(halt);
            }
        }
    }

    /// Execute one instruction. Returns `Some` once the program halts.
    pub fn step(&mut self) -> Result<Option<Halt>, VmError> {
        if self.steps >= self.max_steps {
            return Err(VmError::StepLimitExceeded { limit: self.max_steps });
        }

        let pc = self.pc;
        let byte = *self
            .code
            .get(pc)
            .ok_or(VmError::UnexpectedEndOfCode { pc })?;
        let opcode = Opcode::decode(byte).ok_or(VmError::InvalidOpcode { opcode: byte, pc })?;

        let inputs = opcode.stack_inputs();
        let outputs = opcode.stack_outputs();
        self.frame.stack.require(inputs)?;
        if outputs > inputs {
            self.frame.stack.reserve(outputs - inputs)?;
        }

        tracing::trace!(pc, op = %opcode, depth = self.frame.stack.len(), "step");
        self.steps += 1;

        let mut next = pc + 1 + opcode.immediate_len();
        let stack = &mut self.frame.stack;

        match opcode {
            Opcode::Stop => return Ok(Some(Halt::Stop)),
            Opcode::Add => {
                let [a, b] = stack.pop_n()?;
                stack.push(a.wrapping_add(&b))?;
            }
            Opcode::Sub => {
                let [a, b] = stack.pop_n()?;
                stack.push(a.wrapping_sub(&b))?;
            }
            Opcode::Lt => {
                let [a, b] = stack.pop_n()?;
                stack.push(U256::from_bool(a < b))?;
            }
            Opcode::Gt => {
                let [a, b] = stack.pop_n()?;
                stack.push(U256::from_bool(a > b))?;
            }
            Opcode::Slt => {
                let [a, b] = stack.pop_n()?;
                stack.push(U256::from_bool(a.slt(&b)))?;
            }
            Opcode::Eq => {
                let [a, b] = stack.pop_n()?;
                stack.push(U256::from_bool(a == b))?;
            }
            Opcode::IsZero => {
                let [a] = stack.pop_n()?;
                stack.push(U256::from_bool(a.is_zero()))?;
            }
            Opcode::Shr => {
                let [shift, value] = stack.pop_n()?;
                stack.push(value.shr_word(&shift))?;
            }
            Opcode::CallValue => {
                stack.push(self.frame.ctx.value)?;
            }
            Opcode::CallDataLoad => {
                let [offset] = stack.pop_n()?;
                let word = self.frame.calldata_word_at(&offset);
                self.frame.stack.push(word)?;
            }
            Opcode::CallDataSize => {
                stack.push(U256::from(self.frame.ctx.input.len()))?;
            }
            Opcode::Pop => {
                stack.pop()?;
            }
            Opcode::MLoad => {
                let [offset] = stack.pop_n()?;
                let offset = self.frame.memory.offset_of(&offset)?;
                let word = self.frame.memory.load_word(offset)?;
                self.frame.stack.push(word)?;
            }
            Opcode::MStore => {
                let [offset, value] = stack.pop_n()?;
                let offset = self.frame.memory.offset_of(&offset)?;
                self.frame.memory.store_word(offset, &value)?;
            }
            Opcode::SLoad => {
                let [key] = stack.pop_n()?;
                let value = self.frame.storage.sload(&key);
                self.frame.stack.push(value)?;
            }
            Opcode::SStore => {
                let [key, value] = stack.pop_n()?;
                tracing::debug!(key = %key, value = %value, "sstore");
                self.frame.storage.sstore(key, value);
            }
            Opcode::Jump => {
                let [dest] = stack.pop_n()?;
                next = self.jump_target(&dest)?;
            }
            Opcode::JumpI => {
                let [dest, cond] = stack.pop_n()?;
                if !cond.is_zero() {
                    next = self.jump_target(&dest)?;
                }
            }
            Opcode::JumpDest => {}
            Opcode::Push(0) => {
                stack.push(U256::ZERO)?;
            }
            Opcode::Push(n) => {
                let start = pc + 1;
                let end = start + n as usize;
                let immediate = self
                    .code
                    .get(start..end)
                    .ok_or(VmError::UnexpectedEndOfCode { pc: self.code.len() })?;
                let value = U256::from_be_slice(immediate)
                    .map_err(|_| VmError::InvalidOpcode { opcode: byte, pc })?;
                self.frame.stack.push(value)?;
            }
            Opcode::Dup(n) => {
                stack.dup(n as usize)?;
            }
            Opcode::Swap(n) => {
                stack.swap(n as usize)?;
            }
            Opcode::Return => {
                let data = self.pop_memory_range()?;
                return Ok(Some(Halt::Return(Bytes::from(data))));
            }
            Opcode::Revert => {
                let data = self.pop_memory_range()?;
                tracing::debug!(pc, len = data.len(), "program reverted");
                return Err(VmError::Reverted { data });
            }
            Opcode::Invalid => {
                return Err(VmError::InvalidOpcode { opcode: byte, pc });
            }
        }

        self.pc = next;
        Ok(None)
    }

    fn jump_target(&self, dest: &U256) -> Result<usize, VmError> {
        match dest.to_usize() {
            Some(target) if self.jumpdests.is_valid(target) => Ok(target),
            _ => Err(VmError::InvalidJumpTarget { target: *dest }),
        }
    }

    /// Pop `(offset, size)` and copy that memory range out.
    fn pop_memory_range(&mut self) -> Result<Vec<u8>, VmError> {
        let [offset, size] = self.frame.stack.pop_n()?;
        if size.is_zero() {
            return Ok(Vec::new());
        }
        let offset = self.frame.memory.offset_of(&offset)?;
        let size = self.frame.memory.offset_of(&size)?;
        self.frame.memory.read(offset, size)
    }
}
