//! Call command implementation.
//!
//! Invokes one callable of a running server's proxy module.

use super::common::{connect, parse_arg};
use anyhow::Result;
use apiproxy_client::InvokeError;
use apiproxy_core::cli::{ExitCode, OutputFormat};
use std::path::Path;

/// Maps a failed call to an exit code.
#[must_use]
pub fn exit_code_for(error: &InvokeError) -> ExitCode {
    if error.is_local() {
        return ExitCode::INVALID_INPUT;
    }
    match error.dispatch_error() {
        Some(e) if e.is_network_error() => ExitCode::SERVER_ERROR,
        _ => ExitCode::ERROR,
    }
}

/// Runs the call command.
///
/// Each argument is parsed as JSON when possible and passed as a string
/// otherwise.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded. Failures of the call
/// itself are printed and reported through the exit code.
pub async fn run(
    url: &str,
    token_dir: Option<&Path>,
    name: &str,
    args: &[String],
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let module = connect(url, token_dir).await?;
    let args = args.iter().map(|raw| parse_arg(raw)).collect();

    match module.invoke(name, args).await {
        Ok(payload) => {
            println!("{}", crate::formatters::format_payload(&payload, output_format)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            if let Some(api) = e.dispatch_error().and_then(|d| d.api_error()) {
                println!("{}", crate::formatters::format_output(api, output_format)?);
            }
            Ok(exit_code_for(&e))
        }
    }
}
