//! Template resolution for JSON and HTML documents.
//!
//! `{{name}}` placeholders are interpolated from a JSON mapping with HTML
//! escaping, mustache style. Missing keys render as empty strings.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{Result, ShellError};

pub struct TemplateResolver {
    registry: Handlebars<'static>,
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateResolver {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        Self { registry }
    }

    /// Resolve `template` against `data`.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        Ok(self.registry.render_template(template, data)?)
    }

    /// Resolve `template` and parse the result as JSON. `origin` only labels
    /// parse errors.
    pub fn render_json<T: Serialize>(&self, template: &str, data: &T, origin: &Path) -> Result<Value> {
        let rendered = self.render(template, data)?;
        serde_json::from_str(&rendered).map_err(|e| ShellError::json(origin, e))
    }
}
