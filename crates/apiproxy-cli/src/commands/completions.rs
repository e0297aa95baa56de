//! Shell completion generation command.

use anyhow::Result;
use apiproxy_core::cli::ExitCode;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io;

/// Writes the completion script for `shell` to stdout.
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    tracing::info!("Generating {shell} completions");
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}
