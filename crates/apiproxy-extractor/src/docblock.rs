//! Doc block cleanup and `@param` tag parsing.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static PARAM_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@param\s+(?:\{([^}]*)\}\s*)?(\[[^\]]*\]|\S+)(?:\s+-?\s*(.*))?$")
        .expect("valid regex")
});

/// A parsed `@param {type} name - description` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamTag {
    /// Type expression between the braces; empty when omitted.
    pub type_expr: String,
    /// Parameter name, possibly dotted (`data.text`), without brackets or
    /// default value.
    pub name: String,
    /// Whether the name was written in `[brackets]`.
    pub optional: bool,
    /// Text after the name, with a leading `-` removed.
    pub description: String,
}

impl ParamTag {
    /// Returns `true` for a field of another parameter (`data.text`).
    #[must_use]
    pub fn is_field(&self) -> bool {
        self.name.contains('.')
    }

    /// Returns `true` if the type names an object or array.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_extractor::parse_param_tags;
    ///
    /// let tags = parse_param_tags("@param {Object[]} items - list");
    /// assert!(tags[0].is_structured_type());
    /// ```
    #[must_use]
    pub fn is_structured_type(&self) -> bool {
        let ty = self.type_expr.trim();
        ty.eq_ignore_ascii_case("object")
            || ty == "Array"
            || ty.ends_with("[]")
            || ty.starts_with("Array<")
    }
}

/// Strips comment decoration from a raw `/** ... */` block.
///
/// Removes the opening and closing markers and one leading `*` per line,
/// then trims each line and the whole text.
pub(crate) fn clean_doc_block(raw: &str) -> String {
    let inner = raw.strip_prefix("/**").unwrap_or(raw);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    let lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map_or(line, str::trim_start)
        })
        .collect();

    lines.join("\n").trim().to_string()
}

/// Parses every `@param` line of cleaned doc text.
///
/// Lines that start with `@param` but do not fit the expected shape are
/// skipped.
///
/// # Examples
///
/// ```
/// use apiproxy_extractor::parse_param_tags;
///
/// let doc = "Update a todo.\n\
///            @param {object} data - Request body.\n\
///            @param {boolean} [data.completed] - New state";
/// let tags = parse_param_tags(doc);
///
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags[0].name, "data");
/// assert!(tags[0].is_structured_type());
/// assert_eq!(tags[1].name, "data.completed");
/// assert!(tags[1].optional);
/// assert!(tags[1].is_field());
/// ```
#[must_use]
pub fn parse_param_tags(jsdoc: &str) -> Vec<ParamTag> {
    jsdoc
        .lines()
        .map(str::trim)
        .filter_map(|line| PARAM_TAG_REGEX.captures(line))
        .map(|caps| {
            let raw_name = caps.get(2).map_or("", |m| m.as_str());
            let optional = raw_name.starts_with('[') && raw_name.ends_with(']');
            let name = raw_name
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split('=')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();

            ParamTag {
                type_expr: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
                name,
                optional,
                description: caps.get(3).map_or("", |m| m.as_str()).trim().to_string(),
            }
        })
        .collect()
}

/// Finds the tag documenting a top-level parameter.
#[must_use]
pub fn param_tag<'a>(tags: &'a [ParamTag], name: &str) -> Option<&'a ParamTag> {
    tags.iter().find(|t| t.name == name)
}

/// Returns `true` if the doc text carries an `@auth` tag.
#[must_use]
pub fn has_auth_tag(jsdoc: &str) -> bool {
    jsdoc
        .lines()
        .any(|line| line.trim_start().starts_with("@auth"))
}
