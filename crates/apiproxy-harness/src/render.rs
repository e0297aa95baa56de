//! Terminal rendering of harness state.

use crate::field::FieldKind;
use crate::harness::{AuthStatus, Harness};
use crate::invoker::ProxyInvoker;
use crate::section::{ResponseView, Section};
use colored::Colorize;
use serde_json::Value;
use std::fmt::Write;

/// Placeholder shown instead of an input form for nullary callables.
pub const NO_PARAMETERS: &str = "This API takes no parameters.";

/// Placeholder shown for a callable without documentation.
pub const NO_DOCUMENTATION: &str = "No documentation.";

/// Renders the authentication indicator.
#[must_use]
pub fn render_auth_status(status: AuthStatus) -> String {
    let label = match status {
        AuthStatus::LoggedIn => status.to_string().green().bold(),
        AuthStatus::LoggedOut => status.to_string().yellow(),
    };
    format!("Auth status: {label}")
}

/// Renders one section: heading, documentation, fields and last response.
#[must_use]
pub fn render_section(section: &Section) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", section.name().cyan().bold());

    let doc = if section.jsdoc().is_empty() {
        NO_DOCUMENTATION
    } else {
        section.jsdoc()
    };
    for line in doc.lines() {
        let _ = writeln!(out, "  {}", line.dimmed());
    }

    if section.has_no_params() {
        let _ = writeln!(out, "  {}", NO_PARAMETERS.italic());
    } else {
        for field in section.fields() {
            let kind = match field.kind() {
                FieldKind::Structured => "json",
                FieldKind::Scalar => "text",
            };
            let _ = writeln!(out, "  {} ({kind}): {}", field.name().bold(), field.value());
        }
    }

    if section.is_busy() {
        let _ = writeln!(out, "  {}", "Loading...".blue());
    } else {
        let response = render_response(&section.response());
        for line in response.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

/// Renders a response view.
///
/// JSON successes are pretty-printed; failures show the status, reason and
/// structured payload when there is one.
#[must_use]
pub fn render_response(view: &ResponseView) -> String {
    match view {
        ResponseView::Idle => "Waiting to send...".dimmed().to_string(),
        ResponseView::Success(payload) => payload.to_string(),
        ResponseView::ApiFailure {
            status,
            status_text,
            data,
        } => {
            let mut out = format!("Error: {status} {status_text}").red().to_string();
            if !data.is_null() {
                out.push('\n');
                out.push_str(&pretty(data));
            }
            out
        }
        ResponseView::NetworkFailure { message } | ResponseView::Failure { message } => {
            format!("Error: {message}").red().to_string()
        }
        ResponseView::InvalidInput(e) => format!("Error: {e}").red().to_string(),
    }
}

/// Renders the whole harness.
#[must_use]
pub fn render_harness<I: ProxyInvoker>(harness: &Harness<I>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", render_auth_status(harness.auth_status()));

    if let Some(banner) = harness.banner() {
        let _ = writeln!(out, "{}", banner.red().bold());
        return out;
    }

    for issue in harness.issues() {
        let _ = writeln!(out, "{} {issue}", "warning:".yellow());
    }
    for section in harness.sections() {
        out.push('\n');
        out.push_str(&render_section(section));
    }
    out
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKindTable;
    use apiproxy_client::ResponsePayload;
    use apiproxy_core::ProxyMethodDescriptor;
    use serde_json::json;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_zero_param_placeholder() {
        let section = Section::new(
            &ProxyMethodDescriptor::new("fetch", "", vec![]),
            &FieldKindTable::default(),
        );
        let out = plain(|| render_section(&section));
        assert!(out.contains(NO_PARAMETERS));
        assert!(out.contains(NO_DOCUMENTATION));
    }

    #[test]
    fn test_api_failure_shows_payload() {
        let view = ResponseView::ApiFailure {
            status: 404,
            status_text: "Not Found".to_string(),
            data: json!({"message": "Todo not found"}),
        };
        let out = plain(|| render_response(&view));
        assert!(out.starts_with("Error: 404 Not Found"));
        assert!(out.contains("\"message\": \"Todo not found\""));
    }

    #[test]
    fn test_success_is_pretty_json() {
        let view = ResponseView::Success(ResponsePayload::Json(json!({"original": "abc"})));
        assert_eq!(
            plain(|| render_response(&view)),
            "{\n  \"original\": \"abc\"\n}"
        );
    }

    #[test]
    fn test_network_failure_has_no_status() {
        let view = ResponseView::NetworkFailure {
            message: "network request failed: connection refused".to_string(),
        };
        let out = plain(|| render_response(&view));
        assert_eq!(out, "Error: network request failed: connection refused");
    }
}
