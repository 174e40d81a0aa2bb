//! Answer collection: preloaded answers (stdin, presets, `--var`) and the
//! descriptor's questions.

use crate::config::{PromptKind, Question};
use crate::error::{Error, Result};
use crate::project::Project;
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;
use crate::vars::{parse_bool, vars_from_json, Value, Vars};
use log::debug;
use std::io::Read;

/// Parses a JSON object of answers. Blank input yields no answers.
pub fn parse_answers(input: &str) -> Result<Vars> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vars::new());
    }
    let value: serde_json::Value = serde_json::from_str(input)?;
    if !value.is_object() {
        return Err(Error::ConfigError("answers must be a JSON object".to_string()));
    }
    Ok(vars_from_json(value))
}

pub fn load_from_stdin() -> Result<Vars> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_answers(&buffer)
}

/// Parses a `KEY=VALUE` command-line answer.
pub fn parse_var(raw: &str) -> Result<(String, Value)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), Value::from(value)))
        }
        _ => Err(Error::ConfigError(format!("invalid variable '{raw}', expected KEY=VALUE"))),
    }
}

/// Answers bundled under `presets.<name>` in the descriptor.
pub fn get_preset(project: &Project, name: &str) -> Result<Vars> {
    let preset = project
        .config
        .presets
        .get(name)
        .ok_or_else(|| Error::ConfigError(format!("preset '{name}' is not defined")))?;

    Ok(preset
        .iter()
        .map(|(key, value)| (key.clone(), Value::from(value.clone())))
        .collect())
}

/// Merges preloaded answers. Later sources win: stdin, then the preset, then
/// `--var` pairs.
pub fn merge_answers(stdin: Vars, preset: Vars, vars: Vec<(String, Value)>) -> Vars {
    let mut answers = stdin;
    answers.extend(preset);
    answers.extend(vars);
    answers
}

/// Resolves the project name and asks every question that has no preloaded
/// answer.
///
/// In project mode the name comes from `name`, a preloaded `Project` answer
/// or a prompt, in that order. In template mode it is always `templates`.
pub fn get_answers(
    engine: &dyn TemplateRenderer,
    prompter: &dyn Prompter,
    project: &mut Project,
    name: Option<String>,
    preloaded: Vars,
) -> Result<Vars> {
    let mut answers = preloaded;

    if !project.is_template_mode() {
        project.name = match (name, answers.get("Project")) {
            (Some(name), _) => name,
            (None, Some(Value::Str(name))) => name.clone(),
            (None, Some(_)) => {
                return Err(Error::ConfigError("Project name must be a string".to_string()))
            }
            (None, None) => prompter.input("Project name", None, "", true)?,
        };
        if project.name.trim().is_empty() {
            return Err(Error::ConfigError("Project name must not be empty".to_string()));
        }
    }
    answers.insert("Project".to_string(), Value::from(project.name.as_str()));

    for question in &project.config.questions {
        if answers.contains_key(&question.name) {
            debug!("Question '{}' answered up front", question.name);
            continue;
        }

        if !should_ask(engine, question, &answers)? {
            debug!("Skipping question '{}'", question.name);
            if let Some(default) = default_answer(question) {
                answers.insert(question.name.clone(), default);
            }
            continue;
        }

        let value = ask(engine, prompter, question, &answers)?;
        debug!("Question '{}' = {:?}", question.name, value);
        answers.insert(question.name.clone(), value);
    }

    Ok(answers)
}

fn should_ask(engine: &dyn TemplateRenderer, question: &Question, answers: &Vars) -> Result<bool> {
    if question.when.is_empty() {
        return Ok(true);
    }
    let rendered = engine.render(&question.when, answers)?;
    Ok(parse_bool(rendered.trim()).unwrap_or(false))
}

fn default_answer(question: &Question) -> Option<Value> {
    let default = question.prompt.default.clone()?;
    Some(match question.prompt.kind() {
        Some(PromptKind::Confirm) => Value::Bool(default.as_bool().unwrap_or(false)),
        _ => Value::from(default),
    })
}

fn default_strings(default: Option<&serde_json::Value>) -> Vec<String> {
    match default {
        Some(serde_json::Value::String(s)) => vec![s.clone()],
        Some(serde_json::Value::Array(items)) => {
            items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
        }
        _ => Vec::new(),
    }
}

fn ask(
    engine: &dyn TemplateRenderer,
    prompter: &dyn Prompter,
    question: &Question,
    answers: &Vars,
) -> Result<Value> {
    let prompt = &question.prompt;
    let description = prompt.description.as_deref();
    let message = prompt.message.as_deref().unwrap_or(&question.name);
    let options = prompt.options.as_deref().unwrap_or_default();
    let defaults = default_strings(prompt.default.as_ref());

    match prompt.kind() {
        Some(PromptKind::Confirm) => {
            let message = prompt.confirm.as_deref().unwrap_or(message);
            let default = prompt.default.as_ref().and_then(|d| d.as_bool()).unwrap_or(false);
            Ok(Value::Bool(prompter.confirm(message, description, default)?))
        }
        Some(PromptKind::Select) => {
            let default = defaults
                .first()
                .and_then(|d| options.iter().position(|o| o == d))
                .unwrap_or(0);
            let index = prompter.select(message, description, options, default)?;
            let choice = options.get(index).ok_or_else(|| {
                Error::PromptError(format!("no option {index} for '{}'", question.name))
            })?;
            Ok(Value::from(choice.as_str()))
        }
        Some(PromptKind::MultiSelect) => {
            let selected: Vec<bool> = options.iter().map(|o| defaults.contains(o)).collect();
            let indices = prompter.multi_select(message, description, options, &selected)?;
            let choices = indices
                .into_iter()
                .map(|index| {
                    options.get(index).cloned().ok_or_else(|| {
                        Error::PromptError(format!("no option {index} for '{}'", question.name))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(choices))
        }
        Some(PromptKind::Input) | None => {
            let default = match defaults.first() {
                Some(default) => engine.render(default, answers)?,
                None => String::new(),
            };
            let answer = prompter.input(message, description, &default, question.required)?;
            Ok(Value::Str(answer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answers() {
        assert!(parse_answers("  \n").unwrap().is_empty());

        let answers = parse_answers(r#"{"name": "demo", "count": 2}"#).unwrap();
        assert_eq!(answers["name"], Value::from("demo"));
        assert_eq!(answers["count"], Value::Int(2));

        assert!(matches!(parse_answers("[1, 2]"), Err(Error::ConfigError(_))));
        assert!(matches!(parse_answers("{"), Err(Error::JsonError(_))));
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("key=value").unwrap(), ("key".to_string(), Value::from("value")));
        assert_eq!(parse_var("url=a=b").unwrap(), ("url".to_string(), Value::from("a=b")));
        assert_eq!(parse_var("empty=").unwrap(), ("empty".to_string(), Value::from("")));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=value").is_err());
    }

    #[test]
    fn test_merge_priority() {
        let stdin = Vars::from([
            ("a".to_string(), Value::from("stdin")),
            ("b".to_string(), Value::from("stdin")),
            ("c".to_string(), Value::from("stdin")),
        ]);
        let preset = Vars::from([
            ("b".to_string(), Value::from("preset")),
            ("c".to_string(), Value::from("preset")),
        ]);
        let vars = vec![("c".to_string(), Value::from("var"))];

        let merged = merge_answers(stdin, preset, vars);
        assert_eq!(merged["a"], Value::from("stdin"));
        assert_eq!(merged["b"], Value::from("preset"));
        assert_eq!(merged["c"], Value::from("var"));
    }
}
