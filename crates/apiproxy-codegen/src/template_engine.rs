//! Template engine for code generation using Handlebars.
//!
//! HTML escaping is disabled: the output is JavaScript, and every value that
//! lands inside a string literal is already quoted by the generator.

use apiproxy_core::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Name of the proxy module template.
pub const PROXY_MODULE_TEMPLATE: &str = "proxy_module";

/// Template engine for code generation.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates a new template engine with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns error if template registration fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_codegen::template_engine::TemplateEngine;
    ///
    /// let engine = TemplateEngine::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self::register_builtin_templates(&mut handlebars)?;

        Ok(Self { handlebars })
    }

    fn register_builtin_templates(handlebars: &mut Handlebars<'a>) -> Result<()> {
        // Dispatch layer and token store, emitted ahead of the aggregate
        handlebars
            .register_partial("runtime", include_str!("../templates/runtime.js.hbs"))
            .map_err(|e| Error::TemplateError {
                message: format!("Failed to register runtime partial: {e}"),
            })?;

        handlebars
            .register_template_string(
                PROXY_MODULE_TEMPLATE,
                include_str!("../templates/proxy_module.js.hbs"),
            )
            .map_err(|e| Error::TemplateError {
                message: format!("Failed to register proxy module template: {e}"),
            })?;

        Ok(())
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns error if the template is not registered, the context cannot
    /// be serialized, or rendering fails.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                message: format!("Template rendering failed: {e}"),
            })
    }

    /// Registers a custom template.
    ///
    /// # Errors
    ///
    /// Returns error if the template string is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_codegen::template_engine::TemplateEngine;
    ///
    /// let mut engine = TemplateEngine::new().unwrap();
    /// engine.register_template_string("custom", "// {{name}}").unwrap();
    /// ```
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                message: format!("Failed to register template '{name}': {e}"),
            })
    }
}
