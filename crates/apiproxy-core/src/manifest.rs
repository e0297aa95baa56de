//! Sidecar manifest written next to the generated module.
//!
//! The manifest lists every emitted callable together with its full route
//! descriptor. Rust consumers build their executable proxy from it, while the
//! JavaScript source remains the self-describing artifact for the extractor.

use crate::{CallableName, Error, Result, RouteDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// One emitted callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Callable name inside the exported aggregate.
    pub name: CallableName,
    /// Route the callable dispatches to.
    #[serde(flatten)]
    pub route: RouteDescriptor,
}

impl ManifestEntry {
    /// Creates a new entry.
    #[must_use]
    pub const fn new(name: CallableName, route: RouteDescriptor) -> Self {
        Self { name, route }
    }
}

/// The full manifest.
///
/// # Examples
///
/// ```
/// use apiproxy_core::{CallableName, HttpMethod, ManifestEntry, ProxyManifest, RouteDescriptor};
///
/// let entry = ManifestEntry::new(
///     CallableName::new("fetch").unwrap(),
///     RouteDescriptor::new(HttpMethod::Get, "/api/todos/fetch"),
/// );
/// let manifest = ProxyManifest::new(vec![entry]);
///
/// let json = manifest.to_json_pretty().unwrap();
/// let parsed = ProxyManifest::from_json(&json).unwrap();
/// assert_eq!(parsed.entries.len(), 1);
/// assert!(parsed.get("fetch").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyManifest {
    /// Format version.
    pub version: u32,
    /// When the artifact set was produced.
    pub generated_at: DateTime<Utc>,
    /// Callables in emission order.
    pub entries: Vec<ManifestEntry>,
}

impl ProxyManifest {
    /// Creates a manifest stamped with the current time.
    #[must_use]
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            generated_at: Utc::now(),
            entries,
        }
    }

    /// Looks up an entry by callable name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name.as_str() == name)
    }

    /// Callable names in emission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::SerializationError {
            message: "failed to serialize manifest".to_string(),
            source: Some(e),
        })
    }

    /// Parses a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] for malformed input and
    /// [`Error::ValidationError`] for an unsupported version.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self =
            serde_json::from_str(json).map_err(|e| Error::SerializationError {
                message: "failed to parse manifest".to_string(),
                source: Some(e),
            })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(Error::ValidationError {
                field: "version".to_string(),
                reason: format!(
                    "unsupported manifest version {} (expected {MANIFEST_VERSION})",
                    manifest.version
                ),
            });
        }
        Ok(manifest)
    }
}
