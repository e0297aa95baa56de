//! Route descriptor types.
//!
//! A [`RouteDescriptor`] is the machine-readable description of one
//! registered endpoint. It is built once from the live route table and flows
//! unchanged into the generated module and the sidecar manifest.
//!
//! # Examples
//!
//! ```
//! use apiproxy_core::{HttpMethod, ParamType, RouteDescriptor, RouteParam};
//!
//! let route = RouteDescriptor::new(HttpMethod::Get, "/api/echomsg/:msg")
//!     .with_param(RouteParam::new("msg", ParamType::Path));
//!
//! assert_eq!(route.param_names(), vec!["msg".to_string()]);
//! assert_eq!(route.path_segments_params(), vec!["msg"]);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP method of a registered route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the upper-case wire name of the method.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_core::HttpMethod;
    ///
    /// assert_eq!(HttpMethod::Post.as_str(), "POST");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(Error::InvalidArgument(format!(
                "unsupported HTTP method '{other}'"
            ))),
        }
    }
}

/// Where the single logical input of a route travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamType {
    /// Sent as a query-string entry.
    Query,
    /// Sent as the JSON request body.
    Body,
    /// Substituted into a `:name` path segment.
    Path,
}

impl ParamType {
    /// Returns the upper-case name used in manifests and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Body => "BODY",
            Self::Path => "PATH",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single logical input of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteParam {
    /// Parameter name as it appears in the generated callable.
    pub name: String,
    /// How the parameter is transported.
    pub kind: ParamType,
}

impl RouteParam {
    /// Creates a new route parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Documentation for one field of a structured parameter.
///
/// Rendered as `@param {type} param.field - description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDoc {
    /// Field name, without the parameter prefix.
    pub name: String,
    /// JSDoc type expression, e.g. `string` or `boolean`.
    #[serde(rename = "type")]
    pub type_expr: String,
    /// Whether the field may be omitted.
    #[serde(default)]
    pub optional: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl FieldDoc {
    /// Creates a required field doc.
    #[must_use]
    pub fn required(
        name: impl Into<String>,
        type_expr: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_expr: type_expr.into(),
            optional: false,
            description: description.into(),
        }
    }

    /// Creates an optional field doc.
    #[must_use]
    pub fn optional(
        name: impl Into<String>,
        type_expr: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            optional: true,
            ..Self::required(name, type_expr, description)
        }
    }
}

/// Human documentation attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDoc {
    /// One-line summary shown at the top of the doc block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Field-level documentation for a structured parameter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDoc>,
}

impl RouteDoc {
    /// Creates a doc with only a summary.
    #[must_use]
    pub fn summary(text: impl Into<String>) -> Self {
        Self {
            summary: Some(text.into()),
            fields: Vec::new(),
        }
    }

    /// Adds a field doc.
    #[must_use]
    pub fn field(mut self, field: FieldDoc) -> Self {
        self.fields.push(field);
        self
    }
}

/// Descriptor of one registered endpoint.
///
/// Immutable once built; never persisted except through the generated
/// artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template; parameters are written `:name`.
    pub path: String,
    /// The single logical input, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<RouteParam>,
    /// True iff the route is protected and auth was enabled at generation.
    #[serde(default)]
    pub requires_auth: bool,
    /// True for the route whose response carries a session token.
    #[serde(default)]
    pub issues_token: bool,
    /// Documentation rendered into the doc block.
    #[serde(default)]
    pub doc: RouteDoc,
}

impl RouteDescriptor {
    /// Creates a descriptor with no parameter, no auth and no doc.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            param: None,
            requires_auth: false,
            issues_token: false,
            doc: RouteDoc::default(),
        }
    }

    /// Sets the route parameter.
    #[must_use]
    pub fn with_param(mut self, param: RouteParam) -> Self {
        self.param = Some(param);
        self
    }

    /// Marks the route as requiring a bearer token.
    #[must_use]
    pub const fn with_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    /// Marks the route as the token-issuing route.
    #[must_use]
    pub const fn issuing_token(mut self) -> Self {
        self.issues_token = true;
        self
    }

    /// Sets the route documentation.
    #[must_use]
    pub fn with_doc(mut self, doc: RouteDoc) -> Self {
        self.doc = doc;
        self
    }

    /// Ordered parameter names of the callable generated for this route.
    #[must_use]
    pub fn param_names(&self) -> Vec<String> {
        self.param.iter().map(|p| p.name.clone()).collect()
    }

    /// Names of the `:name` segments in the path template, in order.
    #[must_use]
    pub fn path_segments_params(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix(':'))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Name of a generated callable.
///
/// Always a valid JavaScript identifier (`[A-Za-z_$][A-Za-z0-9_$]*`).
///
/// # Examples
///
/// ```
/// use apiproxy_core::CallableName;
///
/// let name = CallableName::new("echomsg").unwrap();
/// assert_eq!(name.as_str(), "echomsg");
///
/// assert!(CallableName::new("9lives").is_err());
/// assert!(CallableName::new("has-dash").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallableName(String);

impl CallableName {
    /// Creates a validated callable name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if `name` is not a JavaScript
    /// identifier.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if is_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(Error::ValidationError {
                field: "callable name".to_string(),
                reason: format!("'{name}' is not a valid identifier"),
            })
        }
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Words a JavaScript module cannot use as a binding name.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Returns `true` if `name` can be used as a parameter of a generated
/// callable: an identifier that is not a reserved word.
///
/// Callable names only need [`CallableName`] validation since they are
/// object keys, where reserved words are allowed.
///
/// # Examples
///
/// ```
/// use apiproxy_core::is_binding_name;
///
/// assert!(is_binding_name("msg"));
/// assert!(!is_binding_name("delete"));
/// assert!(!is_binding_name("has-dash"));
/// ```
#[must_use]
pub fn is_binding_name(name: &str) -> bool {
    is_identifier(name) && !RESERVED_WORDS.contains(&name)
}

impl fmt::Display for CallableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CallableName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<CallableName> for String {
    fn from(name: CallableName) -> Self {
        name.0
    }
}

impl AsRef<str> for CallableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_route_descriptor_serializes_camel_case() {
        let route = RouteDescriptor::new(HttpMethod::Post, "/api/login")
            .with_param(RouteParam::new("credentials", ParamType::Body))
            .issuing_token();
        let json = serde_json::to_value(&route).unwrap();

        assert_eq!(json["method"], "POST");
        assert_eq!(json["param"]["kind"], "BODY");
        assert_eq!(json["issuesToken"], true);
        assert_eq!(json["requiresAuth"], false);
    }

    #[test]
    fn test_route_descriptor_deserialize_defaults() {
        let route: RouteDescriptor =
            serde_json::from_str(r#"{"method":"GET","path":"/api/todos/fetch"}"#).unwrap();
        assert!(route.param.is_none());
        assert!(!route.requires_auth);
        assert!(route.param_names().is_empty());
    }

    #[test]
    fn test_path_segment_params() {
        let route = RouteDescriptor::new(HttpMethod::Get, "/api/users/:id/posts/:postId");
        assert_eq!(route.path_segments_params(), vec!["id", "postId"]);

        let bare = RouteDescriptor::new(HttpMethod::Get, "/api/todos/fetch");
        assert!(bare.path_segments_params().is_empty());
    }

    #[test]
    fn test_field_doc_type_key() {
        let field = FieldDoc::optional("completed", "boolean", "New state");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "boolean");
        assert_eq!(json["optional"], true);
    }

    #[test]
    fn test_callable_name_validation() {
        assert!(CallableName::new("fetch").is_ok());
        assert!(CallableName::new("_private").is_ok());
        assert!(CallableName::new("$jq").is_ok());
        assert!(CallableName::new("").is_err());
        assert!(CallableName::new("a b").is_err());
    }

    #[test]
    fn test_callable_name_deserialize_rejects_invalid() {
        let result: std::result::Result<CallableName, _> = serde_json::from_str(r#""not-valid""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_binding_names_exclude_reserved_words() {
        for name in ["class", "delete", "new", "await", "yield", "this"] {
            assert!(!is_binding_name(name), "{name}");
            assert!(CallableName::new(name).is_ok(), "{name}");
        }
        for name in ["data", "msg", "className", "$el", "_id"] {
            assert!(is_binding_name(name), "{name}");
        }
        assert!(!is_binding_name(""));
    }
}
