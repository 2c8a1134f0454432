//! Selector decoding and the dispatch registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VmError;

/// 4-byte operation tag taken big-endian from the front of call input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selector(pub u32);

impl Selector {
    pub const LEN: usize = 4;

    /// Decode the selector prefix of `input`.
    pub fn from_input(input: &[u8]) -> Result<Self, VmError> {
        match input.get(..Self::LEN) {
            Some(prefix) => {
                let mut bytes = [0u8; Self::LEN];
                bytes.copy_from_slice(prefix);
                Ok(Selector(u32::from_be_bytes(bytes)))
            }
            None => Err(VmError::SelectorTooShort { len: input.len() }),
        }
    }

    pub fn to_be_bytes(self) -> [u8; Self::LEN] {
        self.0.to_be_bytes()
    }
}

impl From<u32> for Selector {
    fn from(value: u32) -> Self {
        Selector(value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// One row of a [`DispatchTable`].
#[derive(Debug, Clone)]
pub struct DispatchEntry<H> {
    pub selector: Selector,
    pub name: &'static str,
    pub handler: H,
}

/// Ordered `(selector, handler)` registry.
///
/// Selectors are unique within a table; lookup returns the first entry in
/// registration order whose selector matches.
#[derive(Debug, Clone)]
pub struct DispatchTable<H> {
    entries: Vec<DispatchEntry<H>>,
}

impl<H> DispatchTable<H> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry. Fails if the selector is already taken.
    pub fn register(
        &mut self,
        selector: Selector,
        name: &'static str,
        handler: H,
    ) -> Result<(), VmError> {
        if self.entries.iter().any(|e| e.selector == selector) {
            return Err(VmError::DuplicateSelector(selector));
        }
        self.entries.push(DispatchEntry {
            selector,
            name,
            handler,
        });
        Ok(())
    }

    pub fn resolve(&self, selector: Selector) -> Option<&DispatchEntry<H>> {
        self.entries.iter().find(|e| e.selector == selector)
    }

    pub fn entries(&self) -> &[DispatchEntry<H>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> Default for DispatchTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_input() {
        let input = [0xcd, 0xfe, 0xad, 0x2e, 0x00, 0x01];
        assert_eq!(Selector::from_input(&input).unwrap(), Selector(0xcdfead2e));
        assert_eq!(
            Selector::from_input(&input[..3]),
            Err(VmError::SelectorTooShort { len: 3 })
        );
        assert_eq!(
            Selector::from_input(&[]),
            Err(VmError::SelectorTooShort { len: 0 })
        );
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector(0xe026c017).to_string(), "0xe026c017");
        assert_eq!(Selector(1).to_string(), "0x00000001");
        assert_eq!(Selector(0xe026c017).to_be_bytes(), [0xe0, 0x26, 0xc0, 0x17]);
    }

    #[test]
    fn test_register_and_resolve() {
        let mut table = DispatchTable::new();
        table.register(Selector(1), "one", 10u32).unwrap();
        table.register(Selector(2), "two", 20u32).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(Selector(2)).map(|e| e.handler), Some(20));
        assert_eq!(table.resolve(Selector(2)).map(|e| e.name), Some("two"));
        assert!(table.resolve(Selector(3)).is_none());
    }

    #[test]
    fn test_duplicate_selector_rejected() {
        let mut table = DispatchTable::new();
        table.register(Selector(7), "first", ()).unwrap();
        assert_eq!(
            table.register(Selector(7), "second", ()),
            Err(VmError::DuplicateSelector(Selector(7)))
        );
        assert_eq!(table.entries()[0].name, "first");
    }
}
