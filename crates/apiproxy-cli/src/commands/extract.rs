//! Extract command implementation.
//!
//! Prints the callable metadata recovered from a module file.

use anyhow::{Context, Result};
use apiproxy_core::cli::{ExitCode, OutputFormat};
use apiproxy_extractor::extract;
use std::path::Path;
use tracing::warn;

/// Runs the extract command.
///
/// Exits with [`ExitCode::INVALID_INPUT`] when nothing could be extracted
/// and the source had problems.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn run(file: &Path, output_format: OutputFormat) -> Result<ExitCode> {
    let source = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let extraction = extract(&source);
    for issue in &extraction.issues {
        warn!("{issue}");
    }

    println!(
        "{}",
        crate::formatters::format_output(&extraction.metadata, output_format)?
    );

    if extraction.metadata.is_empty() && !extraction.issues.is_empty() {
        return Ok(ExitCode::INVALID_INPUT);
    }
    Ok(ExitCode::SUCCESS)
}
