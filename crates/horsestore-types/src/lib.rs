//! Horsestore Types - Core value types for the horsestore stack machine.
//!
//! This crate provides:
//! - U256 (256-bit unsigned word with wrapping arithmetic)
//! - Type-level errors shared by the storage and VM crates

pub mod u256;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use u256::U256;
pub use error::TypesError;

/// Width of a machine word in bytes.
pub const WORD_BYTES: usize = 32;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{TypesError, U256, WORD_BYTES};
}
