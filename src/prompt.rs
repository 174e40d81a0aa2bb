//! User interaction for template questions.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Interactive question surface. Implemented with `dialoguer` for the
/// terminal; tests provide scripted answers.
pub trait Prompter {
    /// Asks for free text. `required` rejects an empty answer.
    fn input(
        &self,
        message: &str,
        description: Option<&str>,
        default: &str,
        required: bool,
    ) -> Result<String>;

    fn confirm(&self, message: &str, description: Option<&str>, default: bool) -> Result<bool>;

    /// Returns the index of the chosen option.
    fn select(
        &self,
        message: &str,
        description: Option<&str>,
        options: &[String],
        default: usize,
    ) -> Result<usize>;

    /// Returns the indices of the chosen options.
    fn multi_select(
        &self,
        message: &str,
        description: Option<&str>,
        options: &[String],
        defaults: &[bool],
    ) -> Result<Vec<usize>>;
}

fn prompt_text(message: &str, description: Option<&str>) -> String {
    match description {
        Some(description) if !description.is_empty() => format!("{message} ({description})"),
        _ => message.to_string(),
    }
}

fn prompt_error(err: dialoguer::Error) -> Error {
    Error::PromptError(err.to_string())
}

#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn input(
        &self,
        message: &str,
        description: Option<&str>,
        default: &str,
        required: bool,
    ) -> Result<String> {
        let mut input = Input::<String>::new()
            .with_prompt(prompt_text(message, description))
            .allow_empty(!required);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn confirm(&self, message: &str, description: Option<&str>, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt_text(message, description))
            .default(default)
            .interact()
            .map_err(prompt_error)
    }

    fn select(
        &self,
        message: &str,
        description: Option<&str>,
        options: &[String],
        default: usize,
    ) -> Result<usize> {
        Select::new()
            .with_prompt(prompt_text(message, description))
            .default(default)
            .items(options)
            .interact()
            .map_err(prompt_error)
    }

    fn multi_select(
        &self,
        message: &str,
        description: Option<&str>,
        options: &[String],
        defaults: &[bool],
    ) -> Result<Vec<usize>> {
        MultiSelect::new()
            .with_prompt(prompt_text(message, description))
            .items(options)
            .defaults(defaults)
            .interact()
            .map_err(prompt_error)
    }
}
