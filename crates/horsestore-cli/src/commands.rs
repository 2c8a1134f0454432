//! CLI command implementations.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use horsestore_storage::StateFile;
use horsestore_types::U256;
use horsestore_vm::disasm::{disassemble, disassemble_program};
use horsestore_vm::handlers::{decode_word, encode_read, encode_update, horse_store_table};
use horsestore_vm::{
    BytecodeContract, CallContext, CallOutput, Contract, ContractInstance, ExecutionResult,
    NativeContract, HORSE_STORE_RUNTIME,
};

use crate::config::{Backend, CliConfig};
use crate::output::*;

/// Main CLI.
#[derive(Parser, Debug)]
#[command(name = "horsestore")]
#[command(about = "Run calls against the horse-store contract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Config file (default: ~/.horsestore/config.toml)
    #[arg(short, long, global = true, env = "HORSESTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Storage state file
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Contract backend
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Log filter, e.g. "debug" or "horsestore_vm=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolve the effective configuration: file, then flag overrides.
    pub fn resolve_config(&self) -> anyhow::Result<(PathBuf, CliConfig)> {
        let path = self.config.clone().unwrap_or_else(CliConfig::default_path);
        let mut config = CliConfig::load(&path)?;

        if let Some(state) = &self.state {
            config.state_file = state.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.validate()?;
        Ok((path, config))
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a number of horses (decimal or 0x-hex)
    Write {
        value: String,
    },

    /// Print the stored number of horses
    Read,

    /// Send raw call input
    Call {
        /// Call input as hex
        #[arg(short, long)]
        data: String,
        /// Value to transfer with the call
        #[arg(short, long, default_value = "0")]
        value: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Disassemble the runtime program
    Disasm {
        /// Include the metadata after INVALID
        #[arg(short, long)]
        all: bool,
    },

    /// List the dispatch table
    Selectors,

    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config commands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// A contract instance bound to its state file.
pub struct Session {
    instance: ContractInstance<Box<dyn Contract>>,
    state: StateFile,
}

impl Session {
    pub fn open(config: &CliConfig) -> anyhow::Result<Self> {
        let contract: Box<dyn Contract> = match config.backend {
            Backend::Native => Box::new(NativeContract::horse_store()?),
            Backend::Bytecode => Box::new(BytecodeContract::horse_store()),
        };
        let state = StateFile::new(&config.state_file)?;
        let storage = state.load()?;
        tracing::debug!(backend = %config.backend, slots = storage.len(), "session opened");

        Ok(Self {
            instance: ContractInstance::with_storage(contract, storage, config.vm),
            state,
        })
    }

    /// Run a call and persist storage if it succeeded.
    pub fn call(&self, ctx: &CallContext) -> anyhow::Result<ExecutionResult> {
        let result = self.instance.call(ctx);
        if result.is_success() {
            self.state.save(&self.instance.storage_snapshot())?;
        }
        Ok(result)
    }

    pub fn instance(&self) -> &ContractInstance<Box<dyn Contract>> {
        &self.instance
    }
}

/// Execute a CLI command.
pub fn execute(cmd: Commands, config_path: PathBuf, config: CliConfig) -> anyhow::Result<()> {
    match cmd {
        Commands::Write { value } => execute_write(&value, &config),
        Commands::Read => execute_read(&config),
        Commands::Call { data, value, json } => execute_call(&data, &value, json, &config),
        Commands::Disasm { all } => execute_disasm(all),
        Commands::Selectors => execute_selectors(),
        Commands::Config(cmd) => execute_config(cmd, &config_path, &config),
    }
}

fn execute_write(value: &str, config: &CliConfig) -> anyhow::Result<()> {
    let value = parse_word(value)?;
    let session = Session::open(config)?;

    match session.call(&CallContext::new(encode_update(&value)))? {
        ExecutionResult::Revert(err) => anyhow::bail!("write aborted: {}", err),
        _ => {
            print_success(&format!("Stored {}", format_word(&value)));
            Ok(())
        }
    }
}

fn execute_read(config: &CliConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;

    match session.call(&CallContext::new(encode_read()))? {
        ExecutionResult::Revert(err) => anyhow::bail!("read aborted: {}", err),
        result => {
            let value = decode_word(result.output())
                .ok_or_else(|| anyhow::anyhow!("unexpected return data: {}", format_bytes(result.output())))?;
            println!("{}", format_word(&value).bright_green());
            Ok(())
        }
    }
}

fn execute_call(data: &str, value: &str, json: bool, config: &CliConfig) -> anyhow::Result<()> {
    let input = parse_hex(data)?;
    let value = parse_word(value)?;
    let session = Session::open(config)?;

    let result = session.call(&CallContext::new(input).with_value(value))?;
    if json {
        print_call_json(&CallOutput::from(result))
    } else {
        print_call_result(&result);
        Ok(())
    }
}

fn execute_disasm(all: bool) -> anyhow::Result<()> {
    let listing = if all {
        disassemble(HORSE_STORE_RUNTIME)
    } else {
        disassemble_program(HORSE_STORE_RUNTIME)
    };
    print_info(&format!(
        "{} instructions, {} bytes",
        listing.len(),
        HORSE_STORE_RUNTIME.len()
    ));
    print_listing(&listing);
    Ok(())
}

fn execute_selectors() -> anyhow::Result<()> {
    let table = horse_store_table()?;
    let rows: Vec<(String, String)> = table
        .entries()
        .iter()
        .map(|e| (e.selector.to_string(), e.name.to_string()))
        .collect();
    print_selector_table(&rows);
    Ok(())
}

fn execute_config(cmd: ConfigCommands, path: &Path, config: &CliConfig) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("{}", "Horsestore Configuration".bold());
            println!("{}", "=".repeat(50));
            println!("Config file:  {}", path.display());
            println!("State file:   {}", config.state_file.display().to_string().bright_cyan());
            println!("Backend:      {}", config.backend.to_string().bright_green());
            println!("Log level:    {}", config.log_level);
            println!("Log JSON:     {}", config.log_json);
            println!("Stack depth:  {}", config.vm.max_stack_depth);
            println!("Memory bytes: {}", config.vm.max_memory_bytes);
            println!("Max steps:    {}", config.vm.max_steps.to_string().bright_yellow());
        }

        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            CliConfig::default().save(path)?;
            print_success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}

/// Parse a word from decimal or 0x-prefixed hex.
pub fn parse_word(s: &str) -> anyhow::Result<U256> {
    s.trim()
        .parse::<U256>()
        .map_err(|e| anyhow::anyhow!("Invalid value '{}': {}", s, e))
}

/// Parse call input hex, with or without 0x.
pub fn parse_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| anyhow::anyhow!("Invalid hex input: {}", e))
}
