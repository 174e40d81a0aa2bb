//! Common constants used throughout the scaffold renderer.

/// Supported descriptor file names, in lookup order.
pub const CONFIG_FILES: [&str; 2] = ["scaffold.yaml", "scaffold.yml"];

/// Directory names recognized as the project root of a template tree.
pub const PROJECT_NAMES: [&str; 5] = [
    "{{ Project }}",
    "{{ ProjectSnake }}",
    "{{ ProjectKebab }}",
    "{{ ProjectCamel }}",
    "{{ ProjectPascal }}",
];

/// Root directory used by template-mode repositories. Its name is stripped
/// from every output path.
pub const TEMPLATE_DIR: &str = "templates";

/// Top-level directory whose files are registered as partials.
pub const PARTIALS_DIR: &str = "partials";

pub const DEFAULT_LEFT_DELIMITER: &str = "{{";
pub const DEFAULT_RIGHT_DELIMITER: &str = "}}";
