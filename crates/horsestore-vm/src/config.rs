//! Execution limits.

use serde::{Deserialize, Serialize};

use crate::error::VmError;
use crate::{
    DEFAULT_MAX_MEMORY_BYTES, DEFAULT_MAX_STEPS, MAX_STACK_SIZE, MIN_MEMORY_BYTES, MIN_STACK_DEPTH,
    MIN_STEPS,
};

/// Per-call resource limits.
///
/// There is no gas; `max_steps` bounds the number of executed instructions
/// so that a looping program still terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Maximum stack depth
    pub max_stack_depth: usize,
    /// Maximum linear memory size in bytes
    pub max_memory_bytes: usize,
    /// Maximum executed instructions
    pub max_steps: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: MAX_STACK_SIZE,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl VmConfig {
    /// Set stack depth limit.
    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    /// Set memory limit.
    pub fn with_max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    /// Set instruction budget.
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    /// Validate configuration.
    ///
    /// Limits below what the horse-store runtime needs are rejected, so that
    /// both backends complete the same calls under any accepted config.
    pub fn validate(&self) -> Result<(), VmError> {
        if self.max_stack_depth < MIN_STACK_DEPTH || self.max_stack_depth > MAX_STACK_SIZE {
            return Err(VmError::InvalidConfig(format!(
                "max_stack_depth must be between {} and {}",
                MIN_STACK_DEPTH, MAX_STACK_SIZE
            )));
        }
        if self.max_memory_bytes < MIN_MEMORY_BYTES {
            return Err(VmError::InvalidConfig(format!(
                "max_memory_bytes must be at least {}",
                MIN_MEMORY_BYTES
            )));
        }
        if self.max_steps < MIN_STEPS {
            return Err(VmError::InvalidConfig(format!(
                "max_steps must be at least {}",
                MIN_STEPS
            )));
        }
        Ok(())
    }

    /// The smallest config [`validate`](Self::validate) accepts.
    pub fn minimal() -> Self {
        Self {
            max_stack_depth: MIN_STACK_DEPTH,
            max_memory_bytes: MIN_MEMORY_BYTES,
            max_steps: MIN_STEPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VmConfig::default();
        assert_eq!(config.max_stack_depth, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(VmConfig::default().with_max_steps(0).validate().is_err());
        assert!(VmConfig::default().with_max_stack_depth(0).validate().is_err());
        assert!(VmConfig::default().with_max_memory_bytes(0).validate().is_err());
    }

    #[test]
    fn test_limits_below_runtime_needs_rejected() {
        assert!(VmConfig::minimal().validate().is_ok());
        assert!(VmConfig::minimal().with_max_memory_bytes(MIN_MEMORY_BYTES - 1).validate().is_err());
        assert!(VmConfig::minimal().with_max_memory_bytes(32).validate().is_err());
        assert!(VmConfig::minimal().with_max_stack_depth(MIN_STACK_DEPTH - 1).validate().is_err());
        assert!(VmConfig::minimal().with_max_steps(MIN_STEPS - 1).validate().is_err());
        assert!(VmConfig::default().with_max_stack_depth(MAX_STACK_SIZE + 1).validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: VmConfig = toml::from_str("max_steps = 50").unwrap();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.max_stack_depth, MAX_STACK_SIZE);
    }
}
