//! Artifact persistence and the start-up generation gate.

use crate::types::GeneratedCode;
use apiproxy_core::{Error, ProxyConfig, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether start-up generation should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationGate {
    /// Generate and write artifacts.
    Run,
    /// Skipped because the deployment environment is production.
    SkipProduction,
    /// Skipped because `APIPROXY_SKIP_GENERATE` is set.
    SkipRequested,
}

impl GenerationGate {
    /// Decides from the server configuration. Production wins over the
    /// skip flag when both apply.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_codegen::GenerationGate;
    /// use apiproxy_core::{DeploymentEnv, ProxyConfig};
    ///
    /// let config = ProxyConfig {
    ///     environment: DeploymentEnv::Production,
    ///     ..ProxyConfig::default()
    /// };
    /// assert_eq!(GenerationGate::decide(&config), GenerationGate::SkipProduction);
    /// ```
    #[must_use]
    pub const fn decide(config: &ProxyConfig) -> Self {
        if config.environment.is_production() {
            Self::SkipProduction
        } else if config.skip_generate {
            Self::SkipRequested
        } else {
            Self::Run
        }
    }

    /// Returns `true` if generation should run.
    #[must_use]
    pub const fn should_run(&self) -> bool {
        matches!(self, Self::Run)
    }
}

impl fmt::Display for GenerationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Run => "run",
            Self::SkipProduction => "skipped (production)",
            Self::SkipRequested => "skipped (APIPROXY_SKIP_GENERATE)",
        })
    }
}

/// Writes the module and manifest into `output_dir`.
///
/// Parent directories are created. Each file is written to a temporary
/// sibling and renamed into place, so readers never see a partial file.
/// Returns the written paths.
///
/// # Errors
///
/// Returns [`Error::Io`] if a directory or file cannot be written, and
/// [`Error::SerializationError`] if the manifest cannot be serialized.
///
/// # Examples
///
/// ```
/// use apiproxy_codegen::{ProxyGenerator, write_artifacts};
/// use apiproxy_introspector::ApiSurface;
///
/// let dir = tempfile::tempdir().unwrap();
/// let code = ProxyGenerator::new().unwrap().generate(&ApiSurface::default()).unwrap();
///
/// let written = write_artifacts(&code, dir.path()).unwrap();
/// assert_eq!(written.len(), 2);
/// assert!(dir.path().join("apiProxy.js").exists());
/// ```
pub fn write_artifacts(code: &GeneratedCode, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();

    fs::create_dir_all(output_dir).map_err(|e| Error::Io {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::new();
    for file in code.files()? {
        let path = output_dir.join(file.path());
        write_file_atomic(&path, file.content())?;
        tracing::debug!(path = %path.display(), bytes = file.content().len(), "wrote artifact");
        written.push(path);
    }

    tracing::info!(
        dir = %output_dir.display(),
        callables = code.callable_count(),
        "API proxy artifacts written"
    );
    Ok(written)
}

fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content).map_err(|e| Error::Io {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
