//! Error handling for the scaffold renderer.
//! Defines the crate-wide error type, the structured template diagnostic and
//! the result alias used throughout the pipeline.

use std::fmt;
use std::io;
use thiserror::Error;

/// Custom error types for scaffold operations.
///
/// Skipping an entry during the walk is not an error; it is expressed by
/// [`crate::guards::Guarded`]. Every variant here aborts the render unless the
/// caller explicitly downgrades it (see [`Error::is_already_exists`]).
#[derive(Error, Debug)]
pub enum Error {
    /// The scaffold descriptor is missing, malformed or the template tree has
    /// no recognizable project root directory.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Template syntax or evaluation failure, with positional context.
    #[error(transparent)]
    TemplateError(#[from] TemplateError),

    /// Raised by the no-clobber guard when the output path already exists.
    #[error("'{path}' already exists and no-clobber is enabled.")]
    AlreadyExistsError { path: String },

    /// Raised by an injection whose marker is absent from the target file.
    #[error("Inject '{name}': marker '{marker}' not found in '{path}'.")]
    MarkerNotFoundError {
        name: String,
        path: String,
        marker: String,
    },

    /// Read, write or mkdir failure on one of the virtual filesystems.
    #[error("Filesystem error at '{path}': {source}.")]
    FilesystemError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("Invalid glob pattern: {0}.")]
    GlobError(#[from] globset::Error),

    #[error("Invalid scaffold descriptor: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// Failure while interacting with the user.
    #[error("Prompt error: {0}.")]
    PromptError(String),
}

impl Error {
    /// Wraps an IO error with the path it happened on.
    pub fn fs(path: impl Into<String>, source: io::Error) -> Self {
        Error::FilesystemError { path: path.into(), source }
    }

    /// Whether this is the no-clobber condition, which callers may treat as a skip.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExistsError { .. })
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A template failure enriched with the location it happened at.
///
/// Line and column are 1-based; `0` means the engine did not report one.
#[derive(Debug)]
pub struct TemplateError {
    pub message: String,
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    /// Source lines around `line`: the one before, the failing one and the one after.
    pub context: Vec<String>,
    pub delimiters: Option<(String, String)>,
    source: minijinja::Error,
}

impl TemplateError {
    /// Builds a template error from the engine error, using `template` to turn
    /// the reported byte range into a column.
    pub fn new(source: minijinja::Error, template: &str) -> Self {
        let message = match source.detail() {
            Some(detail) => format!("{}: {}", source.kind(), detail),
            None => source.kind().to_string(),
        };
        let line = source.line().unwrap_or(0);
        let column = source
            .range()
            .and_then(|range| column_at(template, range.start))
            .unwrap_or(0);

        Self {
            message,
            file_path: String::new(),
            line,
            column,
            context: Vec::new(),
            delimiters: None,
            source,
        }
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        if self.file_path.is_empty() {
            self.file_path = path.into();
        }
        self
    }

    /// Captures the lines around the failing line from the template source.
    pub fn with_context(mut self, template: &str) -> Self {
        if self.line == 0 {
            return self;
        }

        let lines: Vec<&str> = template.split('\n').collect();
        if self.line > lines.len() {
            return self;
        }

        let first = self.line.saturating_sub(2);
        let last = (self.line + 1).min(lines.len());
        self.context = lines[first..last].iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_delimiters(mut self, left: &str, right: &str) -> Self {
        self.delimiters = Some((left.to_string(), right.to_string()));
        self
    }

    /// Line number of the first entry in `context`.
    pub fn context_start(&self) -> usize {
        if self.line > 1 {
            self.line - 1
        } else {
            self.line
        }
    }
}

fn column_at(template: &str, offset: usize) -> Option<usize> {
    let before = template.get(..offset)?;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    Some(before[line_start..].chars().count() + 1)
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.file_path.is_empty() {
            write!(f, " in {}", self.file_path)?;
            if self.line > 0 {
                write!(f, ":{}", self.line)?;
                if self.column > 0 {
                    write!(f, ":{}", self.column)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
