//! Verify command implementation.
//!
//! Checks that a module file and its manifest describe the same callables.

use anyhow::{Context, Result};
use apiproxy_codegen::MANIFEST_FILE_NAME;
use apiproxy_core::ProxyManifest;
use apiproxy_core::cli::{ExitCode, OutputFormat};
use apiproxy_extractor::{extract, verify_round_trip};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct VerifyReport {
    module: String,
    manifest: String,
    callables: usize,
    issues: Vec<String>,
    mismatches: Vec<String>,
}

impl VerifyReport {
    fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.mismatches.is_empty()
    }
}

/// The manifest path used when none is given: next to the module.
#[must_use]
pub fn default_manifest_path(module: &Path) -> PathBuf {
    module.with_file_name(MANIFEST_FILE_NAME)
}

/// Runs the verify command.
///
/// Exits with [`ExitCode::MISMATCH`] if the two disagree or the module has
/// extraction issues.
///
/// # Errors
///
/// Returns an error if either file cannot be read or the manifest is not
/// valid JSON.
pub async fn run(
    module: &Path,
    manifest: Option<&Path>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let manifest_path = manifest.map_or_else(|| default_manifest_path(module), Path::to_path_buf);

    let source = tokio::fs::read_to_string(module)
        .await
        .with_context(|| format!("failed to read {}", module.display()))?;
    let manifest_json = tokio::fs::read_to_string(&manifest_path)
        .await
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let parsed = ProxyManifest::from_json(&manifest_json)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

    let extraction = extract(&source);
    let report = VerifyReport {
        module: module.display().to_string(),
        manifest: manifest_path.display().to_string(),
        callables: extraction.metadata.len(),
        issues: extraction.issues.iter().map(ToString::to_string).collect(),
        mismatches: verify_round_trip(&extraction.metadata, &parsed)
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    if output_format == OutputFormat::Pretty {
        print_pretty(&report);
    } else {
        println!("{}", crate::formatters::format_output(&report, output_format)?);
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::MISMATCH
    })
}

fn print_pretty(report: &VerifyReport) {
    if report.is_clean() {
        println!(
            "{} {} callables match {}",
            "✓".green(),
            report.callables,
            report.manifest
        );
        return;
    }
    for line in report.issues.iter().chain(&report.mismatches) {
        println!("{} {line}", "✗".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_generated_artifacts_verify() {
        let dir = TempDir::new().unwrap();
        super::super::generate::run(dir.path(), false, OutputFormat::Text)
            .await
            .unwrap();

        let code = run(&dir.path().join("apiProxy.js"), None, OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_edited_module_is_a_mismatch() {
        let dir = TempDir::new().unwrap();
        super::super::generate::run(dir.path(), false, OutputFormat::Text)
            .await
            .unwrap();
        let module = dir.path().join("apiProxy.js");
        let source = std::fs::read_to_string(&module).unwrap();
        std::fs::write(&module, source.replace("reversemsg:", "reverseMessage:")).unwrap();

        let code = run(&module, None, OutputFormat::Json).await.unwrap();
        assert_eq!(code, ExitCode::MISMATCH);
    }

    #[test]
    fn test_default_manifest_path() {
        assert_eq!(
            default_manifest_path(Path::new("public/ajax/apiProxy.js")),
            PathBuf::from("public/ajax/apiProxy.manifest.json")
        );
    }
}
