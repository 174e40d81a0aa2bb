//! Command-line interface implementation for scaffold.
//! Provides argument parsing and the plain-text error diagnostic.

use crate::error::{Error, TemplateError};
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::fmt::Write;
use std::path::PathBuf;

/// Command-line arguments structure for scaffold.
#[derive(Parser, Debug)]
#[command(author, version, about = "scaffold: render a project from a template directory", long_about = None)]
pub struct Args {
    /// Path to the template directory (contains scaffold.yaml)
    #[arg(value_name = "TEMPLATE_DIR")]
    pub template: PathBuf,

    /// Directory the rendered project is written into
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Project name, instead of asking for it
    #[arg(short, long)]
    pub name: Option<String>,

    /// Fail instead of overwriting files that already exist
    #[arg(long)]
    pub no_clobber: bool,

    /// Preloaded answer, may be repeated
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Use the answers of a preset defined in scaffold.yaml
    #[arg(long)]
    pub preset: Option<String>,

    /// Read answers as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Render in memory and print a snapshot of the result instead of writing
    #[arg(long)]
    pub snapshot: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Formats an error for the terminal. Template errors get their location,
/// the surrounding source lines and the delimiters in effect.
pub fn format_error(err: &Error) -> String {
    match err {
        Error::TemplateError(terr) => format_template_error(terr),
        other => format!("Error: {other}"),
    }
}

fn format_template_error(err: &TemplateError) -> String {
    let mut out = format!("Template error: {}\n", err.message);

    if !err.file_path.is_empty() {
        let _ = write!(out, "  --> {}", err.file_path);
        if err.line > 0 {
            let _ = write!(out, ":{}", err.line);
            if err.column > 0 {
                let _ = write!(out, ":{}", err.column);
            }
        }
        out.push('\n');
    }

    if !err.context.is_empty() {
        let start = err.context_start();
        let width = (start + err.context.len()).to_string().len();
        for (offset, line) in err.context.iter().enumerate() {
            let number = start + offset;
            let marker = if number == err.line { ">" } else { " " };
            let _ = writeln!(out, "{marker} {number:>width$} | {line}");
        }
    }

    if let Some((left, right)) = &err.delimiters {
        let _ = writeln!(out, "  delimiters: {left} {right}");
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_error() {
        let err = Error::ConfigError("missing scaffold.yaml".to_string());
        assert_eq!(format_error(&err), "Error: Configuration error: missing scaffold.yaml.");
    }

    #[test]
    fn test_format_template_error() {
        let source = "first\n{{ broken( }}\nthird";
        let env = minijinja::Environment::new();
        let raw = env.template_from_str(source).err().unwrap();
        let err = TemplateError::new(raw, source)
            .with_file("proj/a.txt")
            .with_context(source)
            .with_delimiters("{{", "}}");

        let out = format_error(&Error::TemplateError(err));
        assert!(out.starts_with("Template error: "));
        assert!(out.contains("--> proj/a.txt:2"));
        assert!(out.contains("  1 | first"));
        assert!(out.contains("> 2 | {{ broken( }}"));
        assert!(out.contains("  3 | third"));
        assert!(out.ends_with("delimiters: {{ }}"));
    }
}
