//! Callable name derivation.

use apiproxy_core::{CallableName, Error, Result};

/// Converts a segment to camelCase across `-`, `_` and `.` separators.
///
/// The first character keeps its case.
///
/// # Examples
///
/// ```
/// use apiproxy_introspector::to_camel_case;
///
/// assert_eq!(to_camel_case("fetch"), "fetch");
/// assert_eq!(to_camel_case("send-message"), "sendMessage");
/// assert_eq!(to_camel_case("get_user.profile"), "getUserProfile");
/// ```
#[must_use]
pub fn to_camel_case(segment: &str) -> String {
    let mut result = String::with_capacity(segment.len());
    let mut capitalize_next = false;

    for ch in segment.chars() {
        if matches!(ch, '-' | '_' | '.') {
            capitalize_next = !result.is_empty();
        } else if capitalize_next {
            result.push(ch.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}

/// Derives the callable name of a route from its path template.
///
/// The last static segment wins; `:param` and `*wildcard` segments are
/// skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidRoute`] when the path has no static segment or the
/// segment does not yield a valid identifier.
///
/// # Examples
///
/// ```
/// use apiproxy_introspector::derive_callable_name;
///
/// assert_eq!(derive_callable_name("/api/echomsg/:msg").unwrap().as_str(), "echomsg");
/// assert_eq!(derive_callable_name("/api/todos/fetch").unwrap().as_str(), "fetch");
/// assert!(derive_callable_name("/:id").is_err());
/// ```
pub fn derive_callable_name(path: &str) -> Result<CallableName> {
    let segment = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with(':') && !s.starts_with('*'))
        .next_back()
        .ok_or_else(|| Error::InvalidRoute {
            path: path.to_string(),
            reason: "path has no static segment to name the callable after".to_string(),
        })?;

    CallableName::new(to_camel_case(segment)).map_err(|_| Error::InvalidRoute {
        path: path.to_string(),
        reason: format!("segment '{segment}' does not form a valid identifier"),
    })
}
