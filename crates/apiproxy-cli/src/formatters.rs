//! Output formatting shared by all commands.
//!
//! `json` is pretty-printed JSON, `text` is compact JSON for scripts, and
//! `pretty` is colored, indented output for terminals.

use anyhow::Result;
use apiproxy_client::ResponsePayload;
use apiproxy_core::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Formats any serializable result.
///
/// # Examples
///
/// ```
/// use apiproxy_cli::formatters::format_output;
/// use apiproxy_core::cli::OutputFormat;
/// use serde_json::json;
///
/// let out = format_output(&json!({"callables": 3}), OutputFormat::Text)?;
/// assert_eq!(out, r#"{"callables":3}"#);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Text => serde_json::to_string(data)?,
        OutputFormat::Pretty => {
            let mut out = String::new();
            write_value(&mut out, &serde_json::to_value(data)?, 0);
            out
        }
    })
}

/// Formats a call result. Text responses are printed as-is in every format
/// except `json`, where they become a JSON string.
pub fn format_payload(payload: &ResponsePayload, format: OutputFormat) -> Result<String> {
    match payload {
        ResponsePayload::Json(value) => format_output(value, format),
        ResponsePayload::Text(text) if format == OutputFormat::Json => format_output(text, format),
        ResponsePayload::Text(text) => Ok(text.clone()),
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".dimmed().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().yellow().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().cyan().to_string()),
        Value::String(s) => out.push_str(&format!("\"{}\"", s.green())),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&"  ".repeat(depth + 1));
                write_value(out, item, depth + 1);
                out.push_str(if i + 1 < items.len() { ",\n" } else { "\n" });
            }
            out.push_str(&"  ".repeat(depth));
            out.push(']');
        }
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&format!("\"{}\": ", key.blue().bold()));
                write_value(out, item, depth + 1);
                out.push_str(if i + 1 < map.len() { ",\n" } else { "\n" });
            }
            out.push_str(&"  ".repeat(depth));
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_is_indented() {
        let out = format_output(&json!({"a": [1, 2]}), OutputFormat::Json).unwrap();
        assert!(out.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&out).unwrap(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_text_is_compact() {
        let out = format_output(&json!({"a": true}), OutputFormat::Text).unwrap();
        assert_eq!(out, r#"{"a":true}"#);
    }

    #[test]
    fn test_pretty_layout() {
        colored::control::set_override(false);
        let out = format_output(&json!({"list": [1, {}]}), OutputFormat::Pretty).unwrap();
        assert_eq!(out, "{\n  \"list\": [\n    1,\n    {}\n  ]\n}");
    }

    #[test]
    fn test_text_payload() {
        let payload = ResponsePayload::Text("plain".to_string());
        assert_eq!(format_payload(&payload, OutputFormat::Pretty).unwrap(), "plain");
        assert_eq!(format_payload(&payload, OutputFormat::Json).unwrap(), "\"plain\"");
    }
}
