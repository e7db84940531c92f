//! Handlebars-based template renderer.
//!
//! Wraps the [`handlebars::Handlebars`] engine with **strict mode** enabled, so a
//! `{{variable}}` missing from the data context is an error instead of an empty
//! string. HTML escaping is turned off: the output is markdown and TypeScript,
//! where `&` and `<` must survive as written.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::templates::{embedded, renderer::TemplateRenderer};
//!
//! let renderer = TemplateRenderer::new();
//! let data = serde_json::json!({ "units": ["FHECounter"], "deploy_id": "deploy_fhe_counter" });
//! let output = renderer.render(embedded::DEPLOY_SCRIPT, &data)?;
//! ```

use handlebars::Handlebars;
use serde_json::Value;

use crate::error::{ExemplarError, Result};

/// Template renderer using Handlebars for generated project files.
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a new renderer with strict mode enabled and escaping disabled.
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Render a template string with the given data context.
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        self.hbs
            .render_template(template, data)
            .map_err(|e| ExemplarError::TemplateRender(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
