//! Line injection into already rendered files.
//!
//! The target is scanned line by line for the first line containing the
//! marker. The new text is inserted before (default) or after that line,
//! each inserted line carrying the marker line's indentation. Later
//! occurrences of the marker are left alone. Injecting twice inserts twice;
//! avoiding duplicates is up to the caller.

use serde::Deserialize;
use thiserror::Error;

/// Where injected lines go relative to the marker line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum InjectMode {
    #[default]
    Before,
    After,
}

impl TryFrom<String> for InjectMode {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "" | "before" => Ok(InjectMode::Before),
            "after" => Ok(InjectMode::After),
            other => Err(format!("unknown inject mode '{other}', expected 'before' or 'after'")),
        }
    }
}

/// The marker did not appear on any line of the target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("inject marker not found")]
pub struct MarkerNotFound;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    Found,
    Done,
}

fn indentation(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Inserts `data` into `content` at the first line containing `at`.
pub fn inject(
    content: &str,
    data: &str,
    at: &str,
    mode: InjectMode,
) -> std::result::Result<String, MarkerNotFound> {
    let mut out = String::with_capacity(content.len() + data.len());
    let new_lines: Vec<&str> = data.lines().filter(|l| !l.is_empty()).collect();

    let write_block = |out: &mut String, indent: &str| {
        for line in &new_lines {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
    };

    let mut state = State::Scanning;
    let mut indent = "";

    for line in content.lines() {
        if state == State::Scanning && line.contains(at) {
            state = State::Found;
            indent = indentation(line);
            if mode == InjectMode::Before {
                write_block(&mut out, indent);
                state = State::Done;
            }
        }

        out.push_str(line);
        out.push('\n');

        if state == State::Found {
            write_block(&mut out, indent);
            state = State::Done;
        }
    }

    match state {
        State::Scanning => Err(MarkerNotFound),
        _ => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "---\nhello world\n    indented line\n    # Inject Marker\n";

    #[test]
    fn test_inject_before() {
        let got = inject(INPUT, "line 1\nline 2", "# Inject Marker", InjectMode::Before).unwrap();
        assert_eq!(
            got,
            "---\nhello world\n    indented line\n    line 1\n    line 2\n    # Inject Marker\n"
        );
    }

    #[test]
    fn test_inject_after() {
        let got = inject(INPUT, "line 1\nline 2", "# Inject Marker", InjectMode::After).unwrap();
        assert_eq!(
            got,
            "---\nhello world\n    indented line\n    # Inject Marker\n    line 1\n    line 2\n"
        );
    }

    #[test]
    fn test_inject_missing_marker() {
        let got = inject(INPUT, "injected", "# Inject Marker invalid", InjectMode::Before);
        assert_eq!(got, Err(MarkerNotFound));
    }

    #[test]
    fn test_only_first_marker_is_used() {
        let input = "a\n// here\nb\n// here\n";
        let got = inject(input, "x", "// here", InjectMode::Before).unwrap();
        assert_eq!(got, "a\nx\n// here\nb\n// here\n");

        let got = inject(input, "x", "// here", InjectMode::After).unwrap();
        assert_eq!(got, "a\n// here\nx\nb\n// here\n");
    }

    #[test]
    fn test_blank_lines_are_dropped_and_tabs_kept() {
        let input = "fn main() {\n\t// marker\n}\n";
        let got = inject(input, "one();\n\ntwo();\n", "// marker", InjectMode::Before).unwrap();
        assert_eq!(got, "fn main() {\n\tone();\n\ttwo();\n\t// marker\n}\n");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(InjectMode::try_from(String::new()), Ok(InjectMode::Before));
        assert_eq!(InjectMode::try_from("after".to_string()), Ok(InjectMode::After));
        assert!(InjectMode::try_from("sideways".to_string()).is_err());
    }
}
