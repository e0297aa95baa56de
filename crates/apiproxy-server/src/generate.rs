//! Start-up generation of the API proxy artifacts.

use apiproxy_codegen::{GenerationGate, ProxyGenerator, write_artifacts};
use apiproxy_core::{ProxyConfig, Result};
use apiproxy_introspector::{Introspector, RouteSource};
use std::path::PathBuf;

/// What start-up generation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Generation did not run.
    Skipped(GenerationGate),
    /// Artifacts were written.
    Written {
        /// Number of callables in the module
        callables: usize,
        /// Paths of the written files
        files: Vec<PathBuf>,
    },
}

/// Regenerates the proxy module and manifest from `source`, unless the
/// configuration disables it.
///
/// # Errors
///
/// Returns an error if the route table cannot be described (for example
/// two routes derive the same callable name), rendering fails, or the
/// output directory is not writable. Callers log it and keep serving.
pub fn generate_proxy<S: RouteSource + ?Sized>(
    config: &ProxyConfig,
    source: &S,
) -> Result<GenerationOutcome> {
    let gate = GenerationGate::decide(config);
    if !gate.should_run() {
        tracing::info!(gate = %gate, "API proxy generation skipped");
        return Ok(GenerationOutcome::Skipped(gate));
    }

    let surface = Introspector::new(config.use_auth).describe(source)?;
    let code = ProxyGenerator::new()?.generate(&surface)?;
    let files = write_artifacts(&code, &config.output_dir)?;

    Ok(GenerationOutcome::Written {
        callables: code.callable_count(),
        files,
    })
}
