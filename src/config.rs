//! Configuration handling for scaffold templates.
//! This module provides the descriptor schema (`scaffold.yaml`) and the
//! functions that locate, parse and validate it.

use crate::constants::{CONFIG_FILES, DEFAULT_LEFT_DELIMITER, DEFAULT_RIGHT_DELIMITER};
use crate::error::{Error, Result};
use crate::inject::InjectMode;
use crate::rwfs::ReadFs;
use globset::{GlobBuilder, GlobMatcher};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

/// Parsed scaffold descriptor. Loaded once per render and never mutated.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Globs (relative to the project root) of files copied without evaluation.
    pub skip: Vec<String>,
    pub questions: Vec<Question>,
    pub rewrites: Vec<Rewrite>,
    pub computed: IndexMap<String, String>,
    pub messages: Messages,
    pub inject: Vec<Injectable>,
    pub features: Vec<Feature>,
    pub delimiters: Vec<DelimiterOverride>,
    pub each: Vec<EachConfig>,
    pub presets: IndexMap<String, IndexMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub pre: String,
    pub post: String,
}

/// A snippet inserted into an already rendered file at a marker line.
#[derive(Debug, Clone, Deserialize)]
pub struct Injectable {
    pub name: String,
    pub path: String,
    pub at: String,
    #[serde(default)]
    pub mode: InjectMode,
    pub template: String,
}

/// Files matching `globs` are excluded when `value` renders to false.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub value: String,
    #[serde(default)]
    pub globs: Vec<String>,
}

/// Replaces the variable delimiters for files matching `glob`.
#[derive(Debug, Clone, Deserialize)]
pub struct DelimiterOverride {
    pub glob: String,
    pub left: String,
    pub right: String,
}

/// Declares a list variable that `[var]` path tokens expand over.
#[derive(Debug, Clone, Deserialize)]
pub struct EachConfig {
    pub var: String,
    #[serde(default, rename = "as")]
    pub as_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub name: String,
    pub prompt: Prompt,
    #[serde(default)]
    pub when: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Prompt {
    pub message: Option<String>,
    pub description: Option<String>,
    pub confirm: Option<String>,
    pub default: Option<serde_json::Value>,
    pub options: Option<Vec<String>>,
    pub multi: bool,
}

/// The kind of interaction a [`Prompt`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Confirm,
    MultiSelect,
    Select,
    Input,
}

impl Prompt {
    pub fn kind(&self) -> Option<PromptKind> {
        match (&self.confirm, &self.message, &self.options) {
            (Some(_), _, _) => Some(PromptKind::Confirm),
            (None, Some(_), Some(_)) if self.multi => Some(PromptKind::MultiSelect),
            (None, Some(_), Some(_)) => Some(PromptKind::Select),
            (None, Some(_), None) => Some(PromptKind::Input),
            (None, None, _) => None,
        }
    }
}

/// Compiles a glob the way descriptor patterns are interpreted: `**` crosses
/// directories, `*` does not.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

impl ProjectConfig {
    /// Parses a descriptor from YAML and validates it.
    pub fn parse(content: &str) -> Result<Self> {
        let config: ProjectConfig = if content.trim().is_empty() {
            ProjectConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every glob compiles and every delimiter override is usable.
    pub fn validate(&self) -> Result<()> {
        let rewrite_globs = self.rewrites.iter().map(|r| &r.from);
        let feature_globs = self.features.iter().flat_map(|f| f.globs.iter());
        let delimiter_globs = self.delimiters.iter().map(|d| &d.glob);

        for pattern in self
            .skip
            .iter()
            .chain(rewrite_globs)
            .chain(feature_globs)
            .chain(delimiter_globs)
        {
            compile_glob(pattern)?;
        }

        for delims in &self.delimiters {
            if delims.left.is_empty() || delims.right.is_empty() {
                return Err(Error::ConfigError(format!(
                    "override delimiters for '{}' must not be empty",
                    delims.glob
                )));
            }
        }

        for each in &self.each {
            if each.var.is_empty() {
                return Err(Error::ConfigError("each entries need a 'var'".to_string()));
            }
        }

        for question in &self.questions {
            if question.prompt.kind().is_none() {
                return Err(Error::ConfigError(format!(
                    "question '{}' needs a 'message' or 'confirm' prompt",
                    question.name
                )));
            }
        }

        Ok(())
    }
}

/// Delimiter overrides with their globs compiled once per render.
pub struct DelimiterMatcher<'a> {
    overrides: Vec<(GlobMatcher, &'a DelimiterOverride)>,
}

impl<'a> DelimiterMatcher<'a> {
    pub fn new(overrides: &'a [DelimiterOverride]) -> Result<Self> {
        let overrides = overrides
            .iter()
            .map(|o| Ok((compile_glob(&o.glob)?, o)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { overrides })
    }

    /// Resolves the delimiters for a path relative to the project root.
    /// The first matching override wins.
    pub fn delimiters_for(&self, relative_path: &str) -> (&'a str, &'a str) {
        for &(ref glob, delims) in &self.overrides {
            if glob.is_match(relative_path) {
                debug!("Matched delimiter override '{}' for {}", delims.glob, relative_path);
                return (&delims.left, &delims.right);
            }
        }
        (DEFAULT_LEFT_DELIMITER, DEFAULT_RIGHT_DELIMITER)
    }
}

/// Loads the descriptor from the root of a template filesystem.
/// Supports: scaffold.yaml, scaffold.yml
///
/// # Errors
/// * `Error::ConfigError` if no descriptor exists
/// * `Error::YamlError` if the descriptor is malformed
pub fn get_config(fs: &dyn ReadFs) -> Result<ProjectConfig> {
    for file in CONFIG_FILES {
        if fs.exists(file) && !fs.is_dir(file) {
            debug!("Loading configuration from {}", file);
            let bytes = fs.read_file(file).map_err(|e| Error::fs(file, e))?;
            let content = String::from_utf8_lossy(&bytes);
            return ProjectConfig::parse(&content);
        }
    }

    Err(Error::ConfigError(format!(
        "No configuration file found (tried: {})",
        CONFIG_FILES.join(", ")
    )))
}
