//! Input field kinds.

use apiproxy_extractor::ParamTag;
use serde::Serialize;

/// How a field's text is turned into an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Multi-line input; JSON-looking text is parsed.
    Structured,
    /// Single-line input sent as a literal string.
    Scalar,
}

/// One name rule of a [`FieldKindTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    /// Case-sensitive substring of the parameter name.
    pub pattern: String,
    /// Kind assigned on match.
    pub kind: FieldKind,
    /// Text pre-filled into the field, if any.
    pub initial_value: Option<String>,
}

impl FieldRule {
    /// Creates a rule without an initial value.
    #[must_use]
    pub fn new(pattern: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            initial_value: None,
        }
    }

    /// Sets the text pre-filled into matching fields.
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = Some(value.into());
        self
    }
}

/// Maps parameter names and documented types to field kinds.
///
/// Resolution order: a structured `@param` type in the documentation wins,
/// then the first name rule whose pattern occurs in the name, then
/// [`FieldKind::Scalar`].
///
/// # Examples
///
/// ```
/// use apiproxy_harness::{FieldKind, FieldKindTable};
///
/// let table = FieldKindTable::default();
/// assert_eq!(table.classify("credentials", None), FieldKind::Structured);
/// assert_eq!(table.classify("metadata", None), FieldKind::Structured);
/// // Name rules are case-sensitive.
/// assert_eq!(table.classify("userData", None), FieldKind::Scalar);
/// assert_eq!(table.classify("msg", None), FieldKind::Scalar);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKindTable {
    rules: Vec<FieldRule>,
}

impl Default for FieldKindTable {
    fn default() -> Self {
        Self {
            rules: vec![
                FieldRule::new("data", FieldKind::Structured),
                FieldRule::new("credentials", FieldKind::Structured),
                FieldRule::new("message", FieldKind::Structured)
                    .with_initial_value(r#"{"message": "Hello"}"#),
                FieldRule::new("dataOrParams", FieldKind::Structured),
            ],
        }
    }
}

impl FieldKindTable {
    /// Creates a table with no name rules.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the rules in match order.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Classifies a parameter.
    #[must_use]
    pub fn classify(&self, name: &str, tag: Option<&ParamTag>) -> FieldKind {
        if tag.is_some_and(ParamTag::is_structured_type) {
            return FieldKind::Structured;
        }
        self.matching_rule(name)
            .map_or(FieldKind::Scalar, |rule| rule.kind)
    }

    /// Returns the text a new field for `name` starts with.
    #[must_use]
    pub fn initial_value(&self, name: &str) -> String {
        self.matching_rule(name)
            .and_then(|rule| rule.initial_value.clone())
            .unwrap_or_default()
    }

    fn matching_rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| name.contains(&rule.pattern))
    }
}
