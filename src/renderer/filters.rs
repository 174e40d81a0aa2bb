//! Filters and functions available to every template.
//!
//! ```text
//! {{ Project | snakecase }}      -> new_project
//! {{ add(1, 2) }}                -> 3
//! {{ wraptmpl("name") }}         -> {{ name }}
//! ```

use cruet::Inflector;
use minijinja::Environment;

pub fn register(env: &mut Environment<'_>) {
    env.add_filter("snakecase", snakecase);
    env.add_filter("kebabcase", kebabcase);
    env.add_filter("camelcase", camelcase);
    env.add_filter("pascalcase", pascalcase);
    env.add_filter("titlecase", titlecase);
    env.add_function("add", add);
    env.add_function("wraptmpl", wraptmpl);
}

pub fn snakecase(value: String) -> String {
    value.to_snake_case()
}

pub fn kebabcase(value: String) -> String {
    value.to_kebab_case()
}

pub fn camelcase(value: String) -> String {
    value.to_camel_case()
}

pub fn pascalcase(value: String) -> String {
    value.to_pascal_case()
}

pub fn titlecase(value: String) -> String {
    value.to_title_case()
}

pub fn add(a: i64, b: i64) -> i64 {
    a.saturating_add(b)
}

/// Emits template syntax literally, for templates that generate templates.
pub fn wraptmpl(value: String) -> String {
    format!("{{{{ {value} }}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_filters() {
        assert_eq!(snakecase("NewProject".to_string()), "new_project");
        assert_eq!(kebabcase("NewProject".to_string()), "new-project");
        assert_eq!(camelcase("new_project".to_string()), "newProject");
        assert_eq!(pascalcase("new_project".to_string()), "NewProject");
    }

    #[test]
    fn test_functions_in_templates() {
        let mut env = Environment::new();
        register(&mut env);

        assert_eq!(env.render_str("{{ add(1, 2) }}", ()).unwrap(), "3");
        assert_eq!(env.render_str("{{ wraptmpl('Arg') }}", ()).unwrap(), "{{ Arg }}");
        assert_eq!(env.render_str("{{ 'My App' | kebabcase }}", ()).unwrap(), "my-app");
    }
}
