//! Field text to argument conversion.

use crate::field::FieldKind;
use serde_json::Value;
use thiserror::Error;

/// A field value that cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Text that looks like JSON but does not parse.
    #[error("field '{field}': invalid JSON input ({message})")]
    InvalidJson {
        /// Parameter name
        field: String,
        /// Parser message
        message: String,
    },
}

impl FieldError {
    /// Returns the offending field name.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidJson { field, .. } => field,
        }
    }
}

/// Converts field text into an argument.
///
/// Structured fields: empty text is absent (`None`); text starting with
/// `{` or `[`, or whose brackets do not balance, must parse as JSON; any
/// other text is passed as a string. Scalar fields always pass the text as
/// a string.
///
/// # Errors
///
/// Returns [`FieldError::InvalidJson`] for a structured value that looks
/// like JSON but does not parse.
///
/// # Examples
///
/// ```
/// use apiproxy_harness::{FieldKind, parse_field};
/// use serde_json::json;
///
/// let v = parse_field("data", FieldKind::Structured, r#" {"text": "x"} "#).unwrap();
/// assert_eq!(v, Some(json!({"text": "x"})));
///
/// let v = parse_field("message", FieldKind::Structured, "abc").unwrap();
/// assert_eq!(v, Some(json!("abc")));
///
/// assert!(parse_field("data", FieldKind::Structured, "not-json-{").is_err());
/// assert_eq!(parse_field("data", FieldKind::Structured, "  ").unwrap(), None);
/// ```
pub fn parse_field(name: &str, kind: FieldKind, raw: &str) -> Result<Option<Value>, FieldError> {
    match kind {
        FieldKind::Scalar => Ok(Some(Value::String(raw.to_string()))),
        FieldKind::Structured => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if !looks_like_json(trimmed) {
                return Ok(Some(Value::String(raw.to_string())));
            }
            serde_json::from_str(trimmed)
                .map(Some)
                .map_err(|e| FieldError::InvalidJson {
                    field: name.to_string(),
                    message: e.to_string(),
                })
        }
    }
}

fn looks_like_json(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[') || !brackets_balance(text)
}

/// Whether `{}` and `[]` pairs in `text` open and close in order.
fn brackets_balance(text: &str) -> bool {
    let mut stack = Vec::new();
    for c in text.chars() {
        match c {
            '{' | '[' => stack.push(c),
            '}' if stack.pop() != Some('{') => return false,
            ']' if stack.pop() != Some('[') => return false,
            _ => {}
        }
    }
    stack.is_empty()
}
