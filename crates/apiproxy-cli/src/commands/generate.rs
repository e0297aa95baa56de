//! Generate command implementation.
//!
//! Introspects the demo server's route table and writes `apiProxy.js` plus
//! its manifest, without starting the server. Unlike start-up generation it
//! ignores the deployment environment.

use anyhow::{Context, Result};
use apiproxy_codegen::{ProxyGenerator, write_artifacts};
use apiproxy_core::cli::{ExitCode, OutputFormat};
use apiproxy_introspector::Introspector;
use apiproxy_server::ApiRegistry;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Result of a generation run.
#[derive(Debug, Serialize)]
struct GenerationResult {
    /// Callables in the written module
    callables: Vec<String>,
    /// Written files
    files: Vec<String>,
    /// Whether protected routes were marked as requiring auth
    auth: bool,
}

/// Runs the generate command.
///
/// # Errors
///
/// Returns an error if the route table cannot be described or the output
/// directory cannot be written.
pub async fn run(output: &Path, use_auth: bool, output_format: OutputFormat) -> Result<ExitCode> {
    info!(output = %output.display(), use_auth, "generating API proxy");

    let surface = Introspector::new(use_auth)
        .describe(&ApiRegistry::demo())
        .context("failed to describe routes")?;
    let code = ProxyGenerator::new()?.generate(&surface)?;
    let files = write_artifacts(&code, output)
        .with_context(|| format!("failed to write artifacts to {}", output.display()))?;

    let result = GenerationResult {
        callables: surface.names().map(ToString::to_string).collect(),
        files: files.iter().map(|p| p.display().to_string()).collect(),
        auth: use_auth,
    };
    println!("{}", crate::formatters::format_output(&result, output_format)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generate_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let code = run(dir.path(), true, OutputFormat::Text).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(dir.path().join("apiProxy.js").exists());
        assert!(dir.path().join("apiProxy.manifest.json").exists());
    }
}
