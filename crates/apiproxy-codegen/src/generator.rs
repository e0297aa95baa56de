//! Proxy module generator.
//!
//! Generates one ES module containing the dispatch layer, the token store
//! functions, and the single exported `apiProxy` aggregate with one
//! documented `name: async (param) => { ... }` callable per route.

use crate::doc::doc_lines;
use crate::template_engine::{PROXY_MODULE_TEMPLATE, TemplateEngine};
use crate::types::{CallableContext, GeneratedCode, ModuleContext};
use apiproxy_core::{Error, ManifestEntry, ParamType, Result};
use apiproxy_introspector::ApiSurface;

/// File name of the generated module.
pub const MODULE_FILE_NAME: &str = "apiProxy.js";

/// File name of the sidecar manifest.
pub const MANIFEST_FILE_NAME: &str = "apiProxy.manifest.json";

/// Generator for the JavaScript proxy module.
///
/// # Examples
///
/// ```
/// use apiproxy_codegen::ProxyGenerator;
/// use apiproxy_introspector::ApiSurface;
///
/// let generator = ProxyGenerator::new().unwrap();
/// let code = generator.generate(&ApiSurface::default()).unwrap();
/// assert_eq!(code.callable_count(), 0);
/// ```
#[derive(Debug)]
pub struct ProxyGenerator<'a> {
    engine: TemplateEngine<'a>,
}

impl ProxyGenerator<'_> {
    /// Creates a new generator.
    ///
    /// # Errors
    ///
    /// Returns error if template registration fails.
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
        })
    }

    /// Generates the module source and manifest for a surface.
    ///
    /// An empty surface yields a module with zero callables.
    ///
    /// # Errors
    ///
    /// Returns error if a literal cannot be encoded or rendering fails.
    pub fn generate(&self, surface: &ApiSurface) -> Result<GeneratedCode> {
        tracing::info!(callables = surface.len(), "generating API proxy module");

        let callables = surface
            .entries()
            .iter()
            .map(callable_context)
            .collect::<Result<Vec<_>>>()?;

        let context = ModuleContext {
            callable_count: callables.len(),
            callables,
        };
        let source = self.engine.render(PROXY_MODULE_TEMPLATE, &context)?;

        tracing::debug!(bytes = source.len(), "rendered proxy module");

        Ok(GeneratedCode {
            source,
            manifest: surface.to_manifest(),
        })
    }
}

fn callable_context(entry: &ManifestEntry) -> Result<CallableContext> {
    let route = &entry.route;
    let kind = route.param.as_ref().map(|p| p.kind);
    let param = route
        .param
        .as_ref()
        .map_or_else(String::new, |p| p.name.clone());

    tracing::debug!(callable = %entry.name, kind = ?kind, "building callable context");

    Ok(CallableContext {
        name: entry.name.as_str().to_string(),
        doc_lines: doc_lines(route),
        param_list: param.clone(),
        method_literal: js_string(route.method.as_str())?,
        path_literal: js_string(&route.path)?,
        path_template: path_template(&route.path, &param),
        is_query: kind == Some(ParamType::Query),
        is_path: kind == Some(ParamType::Path),
        is_body: kind == Some(ParamType::Body),
        no_param: kind.is_none(),
        issues_token: route.issues_token,
        param,
    })
}

/// Encodes text as a double-quoted JavaScript string literal.
fn js_string(text: &str) -> Result<String> {
    serde_json::to_string(text).map_err(|e| Error::SerializationError {
        message: format!("failed to encode '{text}' as a string literal"),
        source: Some(e),
    })
}

/// Body of a template literal substituting `:param` with its encoded value.
fn path_template(path: &str, param: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if name == param && !param.is_empty() => {
                format!("${{encodeURIComponent({param})}}")
            }
            _ => segment
                .replace('\\', "\\\\")
                .replace('`', "\\`")
                .replace('$', "\\$"),
        })
        .collect::<Vec<_>>()
        .join("/")
}
