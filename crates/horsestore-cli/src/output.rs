//! Output formatting utilities.
//!
//! Pretty printing for CLI commands.

use colored::Colorize;
use horsestore_types::U256;
use horsestore_vm::disasm::Instruction;
use horsestore_vm::{CallOutput, ExecutionResult};
use tabled::{Table, Tabled};

/// Format a word as decimal with its hex form alongside.
pub fn format_word(value: &U256) -> String {
    format!("{} ({:x})", value, value)
}

/// Format bytes as 0x-prefixed hex.
pub fn format_bytes(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Print success message.
pub fn print_success(msg: &str) {
    println!("{}", format!("✓ {}", msg).green());
}

/// Print error message.
pub fn print_error(msg: &str) {
    eprintln!("{}", format!("✗ {}", msg).red());
}

/// Print info message.
pub fn print_info(msg: &str) {
    println!("{}", format!("ℹ {}", msg).blue());
}

/// Print the outcome of a raw call.
pub fn print_call_result(result: &ExecutionResult) {
    match result {
        ExecutionResult::Stop => print_success("ok (no output)"),
        ExecutionResult::Return(data) => {
            print_success("ok");
            println!("data: {}", format_bytes(data).bright_cyan());
        }
        ExecutionResult::Revert(err) => print_error(&format!("aborted: {}", err)),
    }
}

/// Print a call outcome as a JSON object.
pub fn print_call_json(output: &CallOutput) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

/// Print dispatch table rows.
pub fn print_selector_table(rows: &[(String, String)]) {
    #[derive(Tabled)]
    struct SelectorRow {
        selector: String,
        signature: String,
    }

    let rows: Vec<SelectorRow> = rows
        .iter()
        .map(|(selector, signature)| SelectorRow {
            selector: selector.clone(),
            signature: signature.clone(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Print an instruction listing, highlighting jump destinations.
pub fn print_listing(listing: &[Instruction]) {
    for instruction in listing {
        let line = instruction.to_string();
        if instruction.opcode.is_none() {
            println!("{}", line.dimmed());
        } else if instruction.byte == horsestore_vm::opcode::op::JUMPDEST {
            println!("{}", line.bright_yellow());
        } else {
            println!("{}", line);
        }
    }
}
