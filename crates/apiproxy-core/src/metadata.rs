//! Callable metadata recovered from generated source text.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// One callable found in the generated module.
///
/// `params` is empty for routes without input and `[param.name]` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyMethodDescriptor {
    /// Callable name (the key inside the exported aggregate).
    pub name: String,
    /// Documentation text with comment decoration removed.
    pub jsdoc: String,
    /// Ordered parameter names.
    pub params: Vec<String>,
}

impl ProxyMethodDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, jsdoc: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            jsdoc: jsdoc.into(),
            params,
        }
    }

    /// Returns `true` if the callable takes no arguments.
    #[must_use]
    pub fn is_nullary(&self) -> bool {
        self.params.is_empty()
    }
}

/// Ordered mapping from callable name to [`ProxyMethodDescriptor`].
///
/// Iteration follows source encounter order. Serializes as a JSON object
/// whose keys appear in that same order.
///
/// # Examples
///
/// ```
/// use apiproxy_core::{ProxyMetadata, ProxyMethodDescriptor};
///
/// let mut metadata = ProxyMetadata::new();
/// metadata.insert(ProxyMethodDescriptor::new("login", "", vec!["credentials".into()]));
/// metadata.insert(ProxyMethodDescriptor::new("fetch", "", vec![]));
///
/// let names: Vec<_> = metadata.names().collect();
/// assert_eq!(names, vec!["login", "fetch"]);
/// assert!(metadata.get("fetch").unwrap().is_nullary());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMetadata {
    methods: Vec<ProxyMethodDescriptor>,
    index: HashMap<String, usize>,
}

impl ProxyMetadata {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor.
    ///
    /// A descriptor whose name is already present replaces the earlier one in
    /// place, keeping the original position. Returns the replaced descriptor.
    pub fn insert(&mut self, descriptor: ProxyMethodDescriptor) -> Option<ProxyMethodDescriptor> {
        if let Some(&slot) = self.index.get(&descriptor.name) {
            return Some(std::mem::replace(&mut self.methods[slot], descriptor));
        }
        self.index
            .insert(descriptor.name.clone(), self.methods.len());
        self.methods.push(descriptor);
        None
    }

    /// Looks up a descriptor by callable name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProxyMethodDescriptor> {
        self.index.get(name).map(|&i| &self.methods[i])
    }

    /// Returns `true` if a callable with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates descriptors in encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProxyMethodDescriptor> {
        self.methods.iter()
    }

    /// Iterates callable names in encounter order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }

    /// Number of callables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if no callables were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProxyMetadata {
    type Item = &'a ProxyMethodDescriptor;
    type IntoIter = std::slice::Iter<'a, ProxyMethodDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.methods.iter()
    }
}

impl FromIterator<ProxyMethodDescriptor> for ProxyMetadata {
    fn from_iter<I: IntoIterator<Item = ProxyMethodDescriptor>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for descriptor in iter {
            metadata.insert(descriptor);
        }
        metadata
    }
}

impl Serialize for ProxyMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.methods.len()))?;
        for method in &self.methods {
            map.serialize_entry(&method.name, method)?;
        }
        map.end()
    }
}
