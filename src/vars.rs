//! Variable bindings passed to every template evaluation.
//!
//! Bindings are a closed sum type rather than arbitrary JSON: the pipeline
//! only ever substitutes them into templates or coerces computed results.

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::renderer::TemplateRenderer;
use cruet::Inflector;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Ordered variable map.
pub type Vars = IndexMap<String, Value>;

/// A single binding value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
    Map(Vars),
}

impl Value {
    pub fn as_map(&self) -> Option<&Vars> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Coerces a rendered template result. Integers are tried before booleans
    /// so that `"0"` and `"1"` stay numbers.
    pub fn coerce(raw: String) -> Self {
        if let Some(i) = parse_int(&raw) {
            return Value::Int(i);
        }
        if let Some(b) = parse_bool(&raw) {
            return Value::Bool(b);
        }
        Value::Str(raw)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Value::List(list)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Str(String::new()),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Str(n.to_string()),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Converts a JSON object into bindings. Anything else yields an empty map.
pub fn vars_from_json(value: serde_json::Value) -> Vars {
    match Value::from(value) {
        Value::Map(vars) => vars,
        _ => Vars::new(),
    }
}

/// Parses an optionally signed decimal integer.
pub fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// Parses the boolean spellings accepted by scaffold descriptors.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Builds the full binding set for a render.
///
/// The caller's answers live under `Scaffold`, never flattened into the top
/// level. Computed entries are evaluated top to bottom against the project
/// name variables and `Scaffold` only; they cannot see each other.
pub fn build_vars(
    engine: &dyn TemplateRenderer,
    project_name: &str,
    config: &ProjectConfig,
    scaffold: Vars,
) -> Result<Vars> {
    let mut vars = Vars::new();
    vars.insert("Project".to_string(), project_name.into());
    vars.insert("ProjectSnake".to_string(), project_name.to_snake_case().into());
    vars.insert("ProjectKebab".to_string(), project_name.to_kebab_case().into());
    vars.insert("ProjectCamel".to_string(), project_name.to_camel_case().into());
    vars.insert("ProjectPascal".to_string(), project_name.to_pascal_case().into());
    vars.insert("Scaffold".to_string(), Value::Map(scaffold));

    let mut computed = Vars::new();
    for (key, expression) in &config.computed {
        let out = engine.render(expression, &vars)?;
        let value = Value::coerce(out);
        debug!("Computed '{}' = {:?}", key, value);
        computed.insert(key.clone(), value);
    }

    vars.insert("Computed".to_string(), Value::Map(computed));
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;

    #[test]
    fn test_coerce_prefers_integers() {
        assert_eq!(Value::coerce("0".to_string()), Value::Int(0));
        assert_eq!(Value::coerce("1".to_string()), Value::Int(1));
        assert_eq!(Value::coerce("007".to_string()), Value::Int(7));
        assert_eq!(Value::coerce("-12".to_string()), Value::Int(-12));
    }

    #[test]
    fn test_coerce_booleans() {
        assert_eq!(Value::coerce("true".to_string()), Value::Bool(true));
        assert_eq!(Value::coerce("FALSE".to_string()), Value::Bool(false));
        assert_eq!(Value::coerce("t".to_string()), Value::Bool(true));
        assert_eq!(Value::coerce("tRuE".to_string()), Value::Str("tRuE".to_string()));
    }

    #[test]
    fn test_coerce_falls_back_to_string() {
        assert_eq!(Value::coerce("hello".to_string()), Value::Str("hello".to_string()));
        assert_eq!(Value::coerce(String::new()), Value::Str(String::new()));
    }

    #[test]
    fn test_from_json() {
        let vars = vars_from_json(serde_json::json!({
            "name": "demo",
            "count": 3,
            "ratio": 0.5,
            "enabled": true,
            "services": ["auth", "users"],
            "nested": {"key": null}
        }));

        assert_eq!(vars["name"], Value::from("demo"));
        assert_eq!(vars["count"], Value::Int(3));
        assert_eq!(vars["ratio"], Value::from("0.5"));
        assert_eq!(vars["enabled"], Value::Bool(true));
        assert_eq!(
            vars["services"],
            Value::List(vec!["auth".to_string(), "users".to_string()])
        );
        assert_eq!(vars["nested"].as_map().unwrap()["key"], Value::from(""));
    }

    #[test]
    fn test_non_object_json_is_empty() {
        assert!(vars_from_json(serde_json::json!(42)).is_empty());
    }

    fn config(yaml: &str) -> ProjectConfig {
        ProjectConfig::parse(yaml).unwrap()
    }

    #[test]
    fn test_build_vars_names_and_scaffold() {
        let engine = MiniJinjaRenderer::new();
        let scaffold = Vars::from([("license".to_string(), Value::from("MIT"))]);
        let vars = build_vars(&engine, "My Project", &config(""), scaffold).unwrap();

        assert_eq!(vars["Project"], Value::from("My Project"));
        assert_eq!(vars["ProjectSnake"], Value::from("my_project"));
        assert_eq!(vars["ProjectKebab"], Value::from("my-project"));
        assert_eq!(vars["ProjectCamel"], Value::from("myProject"));
        assert_eq!(vars["ProjectPascal"], Value::from("MyProject"));
        assert_eq!(vars["Scaffold"].as_map().unwrap()["license"], Value::from("MIT"));
        assert!(!vars.contains_key("license"));
        assert!(vars["Computed"].as_map().unwrap().is_empty());
    }

    #[test]
    fn test_computed_round_trip() {
        let engine = MiniJinjaRenderer::new();
        let yaml = "computed:\n  Bool: \"true\"\n  Int: \"{{ add(1, 2) }}\"\n  ZeroInt: \"0\"\n  Zip: \"007\"\n  Name: \"{{ ProjectKebab }}-{{ Scaffold.suffix }}\"\n";
        let scaffold = Vars::from([("suffix".to_string(), Value::from("api"))]);
        let vars = build_vars(&engine, "Demo", &config(yaml), scaffold).unwrap();

        let computed = vars["Computed"].as_map().unwrap();
        assert_eq!(computed["Bool"], Value::Bool(true));
        assert_eq!(computed["Int"], Value::Int(3));
        assert_eq!(computed["ZeroInt"], Value::Int(0));
        assert_eq!(computed["Zip"], Value::Int(7));
        assert_eq!(computed["Name"], Value::from("demo-api"));
    }

    #[test]
    fn test_computed_cannot_see_siblings() {
        let engine = MiniJinjaRenderer::new();
        let yaml = "computed:\n  A: \"1\"\n  B: \"{{ Computed | default('hidden') }}\"\n";
        let vars = build_vars(&engine, "Demo", &config(yaml), Vars::new()).unwrap();

        assert_eq!(vars["Computed"].as_map().unwrap()["B"], Value::from("hidden"));
    }

    #[test]
    fn test_computed_error_is_template_error() {
        let engine = MiniJinjaRenderer::new();
        let yaml = "computed:\n  Bad: \"{{ broken( }}\"\n";
        let err = build_vars(&engine, "Demo", &config(yaml), Vars::new()).unwrap_err();
        assert!(matches!(err, crate::error::Error::TemplateError(_)));
    }
}
