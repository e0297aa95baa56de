//! Consistency check between re-extracted metadata and the manifest.

use apiproxy_core::{ProxyManifest, ProxyMetadata};
use std::collections::HashSet;
use std::fmt;

/// One disagreement between the module source and its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// In the manifest, absent from the source.
    Missing {
        /// Callable name
        name: String,
    },
    /// In the source, absent from the manifest.
    Unexpected {
        /// Callable name
        name: String,
    },
    /// Present in both with different parameter lists.
    Params {
        /// Callable name
        name: String,
        /// Parameters the manifest implies
        expected: Vec<String>,
        /// Parameters found in the source
        found: Vec<String>,
    },
    /// Same callables, different order.
    Order {
        /// Manifest order
        expected: Vec<String>,
        /// Source order
        found: Vec<String>,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { name } => write!(f, "'{name}' is in the manifest but not the source"),
            Self::Unexpected { name } => {
                write!(f, "'{name}' is in the source but not the manifest")
            }
            Self::Params {
                name,
                expected,
                found,
            } => write!(
                f,
                "'{name}' takes ({}) in the source, manifest says ({})",
                found.join(", "),
                expected.join(", ")
            ),
            Self::Order { expected, found } => write!(
                f,
                "callable order differs: source [{}], manifest [{}]",
                found.join(", "),
                expected.join(", ")
            ),
        }
    }
}

/// Compares extracted metadata with the manifest written alongside it.
///
/// Returns every mismatch; an empty vector means the two agree on callable
/// names, parameter lists and order.
///
/// # Examples
///
/// ```
/// use apiproxy_core::{CallableName, HttpMethod, ManifestEntry, ProxyManifest, ProxyMetadata,
///     ProxyMethodDescriptor, RouteDescriptor};
/// use apiproxy_extractor::{Mismatch, verify_round_trip};
///
/// let manifest = ProxyManifest::new(vec![ManifestEntry::new(
///     CallableName::new("fetch").unwrap(),
///     RouteDescriptor::new(HttpMethod::Get, "/api/todos/fetch"),
/// )]);
///
/// let mut metadata = ProxyMetadata::new();
/// assert_eq!(
///     verify_round_trip(&metadata, &manifest),
///     vec![Mismatch::Missing { name: "fetch".into() }]
/// );
///
/// metadata.insert(ProxyMethodDescriptor::new("fetch", "", vec![]));
/// assert!(verify_round_trip(&metadata, &manifest).is_empty());
/// ```
#[must_use]
pub fn verify_round_trip(metadata: &ProxyMetadata, manifest: &ProxyManifest) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for entry in &manifest.entries {
        let name = entry.name.as_str();
        match metadata.get(name) {
            None => mismatches.push(Mismatch::Missing {
                name: name.to_string(),
            }),
            Some(found) => {
                let expected = entry.route.param_names();
                if found.params != expected {
                    mismatches.push(Mismatch::Params {
                        name: name.to_string(),
                        expected,
                        found: found.params.clone(),
                    });
                }
            }
        }
    }

    let in_manifest: HashSet<&str> = manifest.names().collect();
    mismatches.extend(
        metadata
            .names()
            .filter(|name| !in_manifest.contains(name))
            .map(|name| Mismatch::Unexpected {
                name: name.to_string(),
            }),
    );

    if mismatches.is_empty() {
        let expected: Vec<String> = manifest.names().map(ToString::to_string).collect();
        let found: Vec<String> = metadata.names().map(ToString::to_string).collect();
        if expected != found {
            mismatches.push(Mismatch::Order { expected, found });
        }
    }

    if !mismatches.is_empty() {
        tracing::warn!(count = mismatches.len(), "proxy source and manifest disagree");
    }
    mismatches
}
