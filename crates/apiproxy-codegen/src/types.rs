//! Types for code generation.
//!
//! # Examples
//!
//! ```
//! use apiproxy_codegen::GeneratedFile;
//!
//! let file = GeneratedFile {
//!     path: "apiProxy.js".to_string(),
//!     content: "export const apiProxy = {};".to_string(),
//! };
//! assert_eq!(file.path(), "apiProxy.js");
//! ```

use crate::generator::{MANIFEST_FILE_NAME, MODULE_FILE_NAME};
use apiproxy_core::{ProxyManifest, Result};
use serde::{Deserialize, Serialize};

/// Result of one generation pass.
///
/// `source` is deterministic for a given surface; only the manifest carries
/// a timestamp.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    /// The JavaScript module text.
    pub source: String,
    /// The sidecar manifest.
    pub manifest: ProxyManifest,
}

impl GeneratedCode {
    /// Number of callables in the module.
    #[must_use]
    pub fn callable_count(&self) -> usize {
        self.manifest.entries.len()
    }

    /// Renders both artifacts as files relative to the output directory.
    ///
    /// # Errors
    ///
    /// Returns error if the manifest cannot be serialized.
    pub fn files(&self) -> Result<Vec<GeneratedFile>> {
        Ok(vec![
            GeneratedFile {
                path: MODULE_FILE_NAME.to_string(),
                content: self.source.clone(),
            },
            GeneratedFile {
                path: MANIFEST_FILE_NAME.to_string(),
                content: self.manifest.to_json_pretty()?,
            },
        ])
    }
}

/// A single generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the output directory
    pub path: String,
    /// File content
    pub content: String,
}

impl GeneratedFile {
    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Template context for the whole module.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ModuleContext {
    pub callable_count: usize,
    pub callables: Vec<CallableContext>,
}

/// Template context for one callable.
///
/// Exactly one of the `is_*`/`no_param` flags is set. Every field is always
/// serialized because the engine runs in strict mode.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CallableContext {
    pub name: String,
    pub doc_lines: Vec<String>,
    pub param_list: String,
    pub param: String,
    pub method_literal: String,
    pub path_literal: String,
    pub path_template: String,
    pub is_query: bool,
    pub is_path: bool,
    pub is_body: bool,
    pub no_param: bool,
    pub issues_token: bool,
}
