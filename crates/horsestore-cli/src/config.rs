//! CLI configuration management.
//!
//! Handles the state file location, backend selection, logging and VM limits.

use clap::ValueEnum;
use horsestore_vm::VmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Which contract implementation serves calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Structured handlers behind a selector table
    Native,
    /// The compiled runtime program, interpreted
    Bytecode,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Native => f.write_str("native"),
            Backend::Bytecode => f.write_str("bytecode"),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Contract storage snapshot
    pub state_file: PathBuf,
    /// Backend used for calls
    pub backend: Backend,
    /// Log filter (e.g. "warn", "horsestore_vm=trace")
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Execution limits
    pub vm: VmConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_file: Self::home_dir().join("state.json"),
            backend: Backend::Native,
            log_level: "warn".to_string(),
            log_json: false,
            vm: VmConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        check_path(path)?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        check_path(path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_path(&self.state_file)?;
        self.vm.validate()?;
        Ok(())
    }

    /// Default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".horsestore")
    }
}

/// Reject paths that climb out of their directory.
pub fn check_path(path: &Path) -> anyhow::Result<()> {
    if path.components().any(|c| c == Component::ParentDir) {
        anyhow::bail!("Invalid path '{}': directory traversal detected", path.display());
    }
    Ok(())
}
