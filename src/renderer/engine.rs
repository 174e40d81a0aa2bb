use super::{filters, is_template, TemplateRenderer};
use crate::constants::{DEFAULT_LEFT_DELIMITER, DEFAULT_RIGHT_DELIMITER};
use crate::error::{Error, Result, TemplateError};
use crate::vars::Vars;
use log::debug;
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment};

/// MiniJinja-based template rendering engine.
///
/// Output is never auto-escaped and trailing newlines are kept, so rendered
/// files match their sources byte for byte outside of template expressions.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        filters::register(&mut env);
        Self { env }
    }

    /// Environment whose only live syntax is `left ... right`. Blocks and
    /// comments move to `left% ... %right` and `left# ... #right`, so default
    /// Jinja markers in the file stay literal text.
    fn with_delimiters(&self, left: &str, right: &str) -> Result<Environment<'static>> {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters(left.to_string(), right.to_string())
            .block_delimiters(format!("{left}%"), format!("%{right}"))
            .comment_delimiters(format!("{left}#"), format!("#{right}"))
            .build()
            .map_err(|e| {
                Error::ConfigError(format!("invalid delimiters '{left}' / '{right}': {e}"))
            })?;

        let mut env = self.env.clone();
        env.set_syntax(syntax);
        Ok(env)
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, vars: &Vars) -> Result<String> {
        if !is_template(template) {
            return Ok(template.to_string());
        }

        self.env
            .render_str(template, vars)
            .map_err(|e| Error::TemplateError(TemplateError::new(e, template)))
    }

    fn render_file(
        &self,
        name: &str,
        template: &str,
        vars: &Vars,
        left: &str,
        right: &str,
    ) -> Result<String> {
        let wrap = |e: minijinja::Error| {
            Error::TemplateError(
                TemplateError::new(e, template)
                    .with_file(name)
                    .with_context(template)
                    .with_delimiters(left, right),
            )
        };

        if left == DEFAULT_LEFT_DELIMITER && right == DEFAULT_RIGHT_DELIMITER {
            return self.env.render_named_str(name, template, vars).map_err(wrap);
        }

        debug!("Rendering {} with delimiters {} {}", name, left, right);
        let env = self.with_delimiters(left, right)?;
        env.render_named_str(name, template, vars).map_err(wrap)
    }

    fn add_partial(&mut self, name: &str, template: String) -> Result<()> {
        debug!("Registering partial '{}'", name);
        self.env
            .add_template_owned(name.to_string(), template.clone())
            .map_err(|e| {
                Error::TemplateError(
                    TemplateError::new(e, &template).with_file(name).with_context(&template),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::Value;

    fn vars() -> Vars {
        let mut vars = Vars::new();
        vars.insert("Project".to_string(), Value::from("NewProject"));
        vars.insert("Flag".to_string(), Value::Bool(false));
        vars
    }

    #[test]
    fn test_render_plain_string_untouched() {
        let engine = MiniJinjaRenderer::new();
        assert_eq!(engine.render("./path/to/file", &vars()).unwrap(), "./path/to/file");
    }

    #[test]
    fn test_render_variable() {
        let engine = MiniJinjaRenderer::new();
        let out = engine.render("{{ Project }}/main.go", &vars()).unwrap();
        assert_eq!(out, "NewProject/main.go");
    }

    #[test]
    fn test_trailing_newline_kept_and_html_not_escaped() {
        let engine = MiniJinjaRenderer::new();
        let out = engine
            .render_file("index.html", "<b>{{ '<i>' }}</b>\n", &vars(), "{{", "}}")
            .unwrap();
        assert_eq!(out, "<b><i></b>\n");
    }

    #[test]
    fn test_custom_delimiters() {
        let engine = MiniJinjaRenderer::new();
        let out = engine
            .render_file("a.txt", "[[ Project ]] keeps {{ this }}", &vars(), "[[", "]]")
            .unwrap();
        assert_eq!(out, "NewProject keeps {{ this }}");
    }

    #[test]
    fn test_custom_delimiters_disable_default_blocks_and_comments() {
        let engine = MiniJinjaRenderer::new();
        let source = "{% raw %} {# note #} ${#args[@]}\n[[% if Flag %]]on[[% else %]]off[[% endif %]][[# gone #]]\n";
        let out = engine.render_file("run.sh", source, &vars(), "[[", "]]").unwrap();
        assert_eq!(out, "{% raw %} {# note #} ${#args[@]}\noff\n");
    }

    #[test]
    fn test_render_file_error_has_location() {
        let engine = MiniJinjaRenderer::new();
        let source = "ok\n{% if %}\nend";
        let err = engine.render_file("proj/a.txt", source, &vars(), "{{", "}}").unwrap_err();

        match err {
            Error::TemplateError(terr) => {
                assert_eq!(terr.file_path, "proj/a.txt");
                assert_eq!(terr.line, 2);
                assert_eq!(terr.context.len(), 3);
                assert_eq!(terr.delimiters, Some(("{{".to_string(), "}}".to_string())));
            }
            other => panic!("Expected TemplateError, got {other:?}"),
        }
    }

    #[test]
    fn test_partials() {
        let mut engine = MiniJinjaRenderer::new();
        engine.add_partial("common/header", "# {{ Project }}".to_string()).unwrap();

        let out = engine
            .render_file("README.md", "{% include \"common/header\" %}\n", &vars(), "{{", "}}")
            .unwrap();
        assert_eq!(out, "# NewProject\n");
    }
}
