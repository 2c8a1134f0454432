//! Linear scratch memory.
//!
//! Memory starts empty and grows in 32-byte words whenever an access touches
//! bytes past its current end. New bytes are zero.

use horsestore_types::{U256, WORD_BYTES};

use crate::error::VmError;

/// Offset of the word holding the free memory pointer
pub const FREE_MEMORY_POINTER: usize = 0x40;

/// First byte handed out by the free memory pointer
pub const INITIAL_FREE_MEMORY: usize = 0x80;

/// Byte-addressable growable buffer, call-scoped.
#[derive(Debug, Clone)]
pub struct Memory {
    data: Vec<u8>,
    limit: usize,
}

impl Memory {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Convert a word operand to a byte offset or length.
    pub fn offset_of(&self, word: &U256) -> Result<usize, VmError> {
        word.to_usize().ok_or(VmError::MemoryLimitExceeded {
            size: usize::MAX,
            limit: self.limit,
        })
    }

    /// Grow (zero-filled, word-aligned) so that `[offset, offset + len)` is addressable.
    pub fn expand(&mut self, offset: usize, len: usize) -> Result<(), VmError> {
        if len == 0 {
            return Ok(());
        }
        let too_big = VmError::MemoryLimitExceeded {
            size: usize::MAX,
            limit: self.limit,
        };
        let end = offset.checked_add(len).ok_or(too_big.clone())?;
        let rounded = end
            .checked_add(WORD_BYTES - 1)
            .ok_or(too_big)?
            / WORD_BYTES
            * WORD_BYTES;

        if rounded > self.limit {
            return Err(VmError::MemoryLimitExceeded {
                size: rounded,
                limit: self.limit,
            });
        }
        if rounded > self.data.len() {
            self.data.resize(rounded, 0);
        }
        Ok(())
    }

    pub fn load_word(&mut self, offset: usize) -> Result<U256, VmError> {
        self.expand(offset, WORD_BYTES)?;
        let mut word = [0u8; WORD_BYTES];
        word.copy_from_slice(&self.data[offset..offset + WORD_BYTES]);
        Ok(U256::from_be_bytes(word))
    }

    pub fn store_word(&mut self, offset: usize, value: &U256) -> Result<(), VmError> {
        self.expand(offset, WORD_BYTES)?;
        self.data[offset..offset + WORD_BYTES].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Copy out `len` bytes; a zero-length read never grows memory.
    pub fn read(&mut self, offset: usize, len: usize) -> Result<Vec<u8>, VmError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        self.expand(offset, len)?;
        Ok(self.data[offset..offset + len].to_vec())
    }

    /// Seed the free memory pointer the way compiled contracts do on entry.
    pub fn init_free_pointer(&mut self) -> Result<(), VmError> {
        self.store_word(FREE_MEMORY_POINTER, &U256::from(INITIAL_FREE_MEMORY))
    }

    /// Reserve `size` bytes at the free memory pointer and bump it past them.
    ///
    /// Returns the offset of the reserved region.
    pub fn allocate(&mut self, size: usize) -> Result<usize, VmError> {
        let pointer = self.load_word(FREE_MEMORY_POINTER)?;
        let offset = self.offset_of(&pointer)?;
        let next = offset.checked_add(size).ok_or(VmError::MemoryLimitExceeded {
            size: usize::MAX,
            limit: self.limit,
        })?;
        self.expand(offset, size)?;
        self.store_word(FREE_MEMORY_POINTER, &U256::from(next))?;
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let memory = Memory::new(1024);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_store_expands_word_aligned() {
        let mut memory = Memory::new(1024);
        memory.store_word(1, &U256::from(0xffu64)).unwrap();
        assert_eq!(memory.len(), 64);
        assert_eq!(memory.as_slice()[32], 0xff);
        assert_eq!(memory.as_slice()[0], 0);
    }

    #[test]
    fn test_load_untouched_reads_zero() {
        let mut memory = Memory::new(1024);
        assert_eq!(memory.load_word(0x40).unwrap(), U256::ZERO);
        assert_eq!(memory.len(), 0x60);
    }

    #[test]
    fn test_store_then_load() {
        let mut memory = Memory::new(1024);
        memory.store_word(0x80, &U256::MAX).unwrap();
        assert_eq!(memory.load_word(0x80).unwrap(), U256::MAX);
        assert_eq!(memory.read(0x80, 32).unwrap(), vec![0xff; 32]);
    }

    #[test]
    fn test_zero_length_read_does_not_expand() {
        let mut memory = Memory::new(64);
        assert!(memory.read(10_000, 0).unwrap().is_empty());
        assert!(memory.is_empty());
    }

    #[test]
    fn test_limit_enforced() {
        let mut memory = Memory::new(64);
        assert!(memory.store_word(32, &U256::ONE).is_ok());
        assert_eq!(
            memory.store_word(33, &U256::ONE),
            Err(VmError::MemoryLimitExceeded { size: 96, limit: 64 })
        );
        assert!(memory.read(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_offset_of_rejects_huge_words() {
        let memory = Memory::new(64);
        assert!(memory.offset_of(&U256::MAX).is_err());
        assert_eq!(memory.offset_of(&U256::from(5u64)).unwrap(), 5);
    }

    #[test]
    fn test_allocate_bumps_free_pointer() {
        let mut memory = Memory::new(1024);
        memory.init_free_pointer().unwrap();
        let first = memory.allocate(32).unwrap();
        let second = memory.allocate(32).unwrap();
        assert_eq!(first, INITIAL_FREE_MEMORY);
        assert_eq!(second, INITIAL_FREE_MEMORY + 32);
        assert_eq!(
            memory.load_word(FREE_MEMORY_POINTER).unwrap(),
            U256::from(INITIAL_FREE_MEMORY + 64)
        );
        assert_eq!(memory.len(), INITIAL_FREE_MEMORY + 64);
    }
}
