//! Template rendering for scaffold.
//!
//! - `engine`: MiniJinja-based implementation of [`TemplateRenderer`]
//! - `filters`: case-conversion filters and helper functions

mod engine;
pub mod filters;

pub use engine::MiniJinjaRenderer;

use crate::error::Result;
use crate::vars::Vars;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a short template string (a path, a computed expression, an
    /// injection snippet) with the default delimiters. Strings without any
    /// template syntax are returned unchanged.
    fn render(&self, template: &str, vars: &Vars) -> Result<String>;

    /// Renders file content under `name`, using `left`/`right` as the variable
    /// delimiters. Errors carry the file name and source context.
    fn render_file(
        &self,
        name: &str,
        template: &str,
        vars: &Vars,
        left: &str,
        right: &str,
    ) -> Result<String>;

    /// Registers a partial that templates can `{% include %}` by name.
    fn add_partial(&mut self, name: &str, template: String) -> Result<()>;
}

/// Whether `s` contains any default template syntax.
pub fn is_template(s: &str) -> bool {
    s.contains("{{") || s.contains("{%") || s.contains("{#")
}
