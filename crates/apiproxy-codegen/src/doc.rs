//! Documentation block lines for a callable.

use apiproxy_core::{ParamType, RouteDescriptor};

/// Lines of the `/** ... */` block, without comment decoration.
pub(crate) fn doc_lines(route: &RouteDescriptor) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(summary) = &route.doc.summary {
        lines.extend(
            summary
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(sanitize),
        );
    }

    lines.push(format!("{} {}", route.method, sanitize(&route.path)));

    if let Some(param) = &route.param {
        let (type_expr, name, description) = match param.kind {
            ParamType::Body => ("object", param.name.clone(), "Request body.".to_string()),
            ParamType::Path => (
                "string",
                param.name.clone(),
                format!("Path segment :{}.", param.name),
            ),
            ParamType::Query => (
                "string",
                format!("[{}]", param.name),
                "Query string value.".to_string(),
            ),
        };
        lines.push(format!("@param {{{type_expr}}} {name} - {description}"));

        for field in &route.doc.fields {
            let qualified = format!("{}.{}", param.name, field.name);
            let name = if field.optional {
                format!("[{qualified}]")
            } else {
                qualified
            };
            let mut line = format!("@param {{{}}} {name}", sanitize(&field.type_expr));
            if !field.description.trim().is_empty() {
                line.push_str(" - ");
                line.push_str(&sanitize(field.description.trim()));
            }
            lines.push(line);
        }
    }

    if route.requires_auth {
        lines.push("@auth bearer".to_string());
    }
    if route.issues_token {
        lines.push("Stores the returned token for later requests.".to_string());
    }
    lines.push("@returns {Promise<any>}".to_string());

    lines
}

/// Keeps user text from closing the comment early.
fn sanitize(text: &str) -> String {
    text.replace("*/", "*\\/")
}
