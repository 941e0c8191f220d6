//! Shell completion generation for shellext
//!
//! This module generates static completion scripts for bash, zsh, fish
//! and PowerShell.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::Write;

use crate::cli::CliArgs;
use crate::error::{Result, UsageError};

/// Binary name completions are registered under
const BIN_NAME: &str = "shellext";

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish, powershell)
/// * `out` - Destination for the script
///
/// # Returns
/// * `Result<()>` - Success or error
pub fn generate_completion(shell_name: &str, out: &mut dyn Write) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    let mut cmd = CliArgs::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" | "pwsh" => Ok(Shell::PowerShell),
        _ => Err(UsageError::InvalidFormat {
            kind: "shell (bash, zsh, fish, powershell)",
            value: shell_name.to_string(),
        }
        .into()),
    }
}
