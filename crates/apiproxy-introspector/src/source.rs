//! Route enumeration seam.

use apiproxy_core::{FieldDoc, HttpMethod, ParamType, RouteDoc, RouteParam};
use serde::{Deserialize, Serialize};

/// One route as registered on the server, before name derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template with `:name` parameter segments.
    pub path: String,
    /// Declared input, if any. A single `:name` segment is inferred when
    /// this is `None`.
    pub param: Option<RouteParam>,
    /// Whether the route sits behind the auth middleware when auth is on.
    pub protected: bool,
    /// Whether the response carries a session token.
    pub issues_token: bool,
    /// Documentation for the generated doc block.
    pub doc: RouteDoc,
}

impl RouteEntry {
    /// Creates an entry for an arbitrary method.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            param: None,
            protected: false,
            issues_token: false,
            doc: RouteDoc::default(),
        }
    }

    /// Creates a `GET` entry.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a `POST` entry.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a `PUT` entry.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a `DELETE` entry.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Declares a JSON body parameter.
    #[must_use]
    pub fn body(mut self, name: impl Into<String>) -> Self {
        self.param = Some(RouteParam::new(name, ParamType::Body));
        self
    }

    /// Declares a query-string parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>) -> Self {
        self.param = Some(RouteParam::new(name, ParamType::Query));
        self
    }

    /// Declares a path parameter explicitly.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>) -> Self {
        self.param = Some(RouteParam::new(name, ParamType::Path));
        self
    }

    /// Marks the route as protected.
    #[must_use]
    pub const fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    /// Marks the route as the token-issuing route.
    #[must_use]
    pub const fn issues_token(mut self) -> Self {
        self.issues_token = true;
        self
    }

    /// Sets the doc summary.
    #[must_use]
    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.doc.summary = Some(text.into());
        self
    }

    /// Adds a field doc for the structured parameter.
    #[must_use]
    pub fn field(mut self, field: FieldDoc) -> Self {
        self.doc.fields.push(field);
        self
    }
}

/// Anything that can enumerate its registered routes.
///
/// Implemented by the server's route registry and by plain route lists.
pub trait RouteSource {
    /// Returns the registered routes in registration order.
    fn routes(&self) -> Vec<RouteEntry>;
}

impl RouteSource for [RouteEntry] {
    fn routes(&self) -> Vec<RouteEntry> {
        self.to_vec()
    }
}

impl RouteSource for Vec<RouteEntry> {
    fn routes(&self) -> Vec<RouteEntry> {
        self.clone()
    }
}

impl<T: RouteSource + ?Sized> RouteSource for &T {
    fn routes(&self) -> Vec<RouteEntry> {
        (**self).routes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let entry = RouteEntry::post("/api/login")
            .body("credentials")
            .issues_token()
            .summary("Log in");

        assert_eq!(entry.method, HttpMethod::Post);
        assert_eq!(
            entry.param,
            Some(RouteParam::new("credentials", ParamType::Body))
        );
        assert!(entry.issues_token);
        assert!(!entry.protected);
        assert_eq!(entry.doc.summary.as_deref(), Some("Log in"));
    }

    #[test]
    fn test_slice_source_preserves_order() {
        let routes = [RouteEntry::get("/a"), RouteEntry::get("/b")];
        let listed = routes.as_slice().routes();
        assert_eq!(listed[0].path, "/a");
        assert_eq!(listed[1].path, "/b");
    }
}
