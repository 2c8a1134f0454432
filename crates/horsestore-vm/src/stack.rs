//! Bounded word stack.

use horsestore_types::U256;

use crate::error::VmError;

/// Last-in-first-out stack of words with a fixed depth limit.
///
/// Positions are counted from the top: `peek(0)` is the top item.
#[derive(Debug, Clone)]
pub struct Stack {
    data: Vec<U256>,
    limit: usize,
}

impl Stack {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::with_capacity(limit.min(64)),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Items bottom to top
    pub fn as_slice(&self) -> &[U256] {
        &self.data
    }

    /// Fail unless at least `n` items are present.
    pub fn require(&self, n: usize) -> Result<(), VmError> {
        if self.data.len() < n {
            return Err(VmError::StackUnderflow {
                required: n,
                available: self.data.len(),
            });
        }
        Ok(())
    }

    /// Fail unless `n` more items fit.
    pub fn reserve(&self, n: usize) -> Result<(), VmError> {
        if self.data.len() + n > self.limit {
            return Err(VmError::StackOverflow { limit: self.limit });
        }
        Ok(())
    }

    pub fn push(&mut self, value: U256) -> Result<(), VmError> {
        self.reserve(1)?;
        self.data.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<U256, VmError> {
        self.data.pop().ok_or(VmError::StackUnderflow {
            required: 1,
            available: 0,
        })
    }

    /// Pop `N` items, top first.
    pub fn pop_n<const N: usize>(&mut self) -> Result<[U256; N], VmError> {
        self.require(N)?;
        let mut out = [U256::ZERO; N];
        for slot in out.iter_mut() {
            *slot = self.pop()?;
        }
        Ok(out)
    }

    pub fn peek(&self, depth: usize) -> Result<&U256, VmError> {
        self.require(depth + 1)?;
        Ok(&self.data[self.data.len() - 1 - depth])
    }

    /// Copy the `n`-th item (1 = top) onto the top. `n` must be at least 1.
    pub fn dup(&mut self, n: usize) -> Result<(), VmError> {
        let depth = n.checked_sub(1).ok_or_else(|| self.no_operand())?;
        let value = *self.peek(depth)?;
        self.push(value)
    }

    /// Exchange the top with the item `n` positions below it. `n` must be at
    /// least 1.
    pub fn swap(&mut self, n: usize) -> Result<(), VmError> {
        if n == 0 {
            return Err(self.no_operand());
        }
        self.require(n + 1)?;
        let top = self.data.len() - 1;
        self.data.swap(top, top - n);
        Ok(())
    }

    fn no_operand(&self) -> VmError {
        VmError::StackUnderflow {
            required: 0,
            available: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_push_pop_lifo() {
        let mut stack = Stack::new(8);
        stack.push(word(1)).unwrap();
        stack.push(word(2)).unwrap();
        assert_eq!(stack.pop().unwrap(), word(2));
        assert_eq!(stack.pop().unwrap(), word(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut stack = Stack::new(8);
        assert_eq!(
            stack.pop(),
            Err(VmError::StackUnderflow { required: 1, available: 0 })
        );
    }

    #[test]
    fn test_push_past_limit_overflows() {
        let mut stack = Stack::new(2);
        stack.push(word(1)).unwrap();
        stack.push(word(2)).unwrap();
        assert_eq!(stack.push(word(3)), Err(VmError::StackOverflow { limit: 2 }));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_pop_n_is_top_first() {
        let mut stack = Stack::new(8);
        for v in 1..=3 {
            stack.push(word(v)).unwrap();
        }
        let [a, b] = stack.pop_n::<2>().unwrap();
        assert_eq!((a, b), (word(3), word(2)));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_n_underflow_leaves_stack_intact() {
        let mut stack = Stack::new(8);
        stack.push(word(1)).unwrap();
        assert!(stack.pop_n::<2>().is_err());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_dup() {
        let mut stack = Stack::new(8);
        stack.push(word(10)).unwrap();
        stack.push(word(20)).unwrap();
        stack.dup(2).unwrap();
        assert_eq!(stack.as_slice(), &[word(10), word(20), word(10)]);
        assert!(stack.dup(4).is_err());
    }

    #[test]
    fn test_dup_and_swap_reject_zero() {
        let mut stack = Stack::new(8);
        stack.push(word(10)).unwrap();
        stack.push(word(20)).unwrap();
        assert_eq!(
            stack.dup(0),
            Err(VmError::StackUnderflow { required: 0, available: 2 })
        );
        assert!(stack.swap(0).is_err());
        assert_eq!(stack.as_slice(), &[word(10), word(20)]);
    }

    #[test]
    fn test_swap() {
        let mut stack = Stack::new(8);
        for v in [1, 2, 3] {
            stack.push(word(v)).unwrap();
        }
        stack.swap(2).unwrap();
        assert_eq!(stack.as_slice(), &[word(3), word(2), word(1)]);
        stack.swap(1).unwrap();
        assert_eq!(stack.as_slice(), &[word(3), word(1), word(2)]);
        assert!(stack.swap(3).is_err());
    }

    #[test]
    fn test_dup_at_limit_overflows() {
        let mut stack = Stack::new(1);
        stack.push(word(1)).unwrap();
        assert_eq!(stack.dup(1), Err(VmError::StackOverflow { limit: 1 }));
    }
}
