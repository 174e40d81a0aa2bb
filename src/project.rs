//! Template project discovery: locating the project root directory inside a
//! template tree and loading its descriptor.

use crate::config::{get_config, ProjectConfig};
use crate::constants::{PROJECT_NAMES, TEMPLATE_DIR};
use crate::error::{Error, Result};
use crate::rwfs::ReadFs;
use log::debug;

/// Options that change how a render treats the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Refuse to overwrite files that already exist in the destination.
    pub no_clobber: bool,
}

/// A template tree ready to render.
#[derive(Debug)]
pub struct Project {
    /// Name of the root directory the walk starts from, e.g. `{{ Project }}`.
    pub name_template: String,
    /// Human-entered project name.
    pub name: String,
    pub config: ProjectConfig,
    pub options: Options,
}

impl Project {
    /// Validates the template tree layout and loads its descriptor.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the descriptor or the root directory is missing
    pub fn load(fs: &dyn ReadFs, options: Options) -> Result<Self> {
        let config = get_config(fs)?;
        let name_template = find_root(fs)?;
        debug!("Using '{}' as the project root", name_template);

        let name = if name_template == TEMPLATE_DIR { TEMPLATE_DIR.to_string() } else { String::new() };

        Ok(Self { name_template, name, config, options })
    }

    /// Whether this repository renders a `templates/` directory instead of a
    /// named project root.
    pub fn is_template_mode(&self) -> bool {
        self.name_template == TEMPLATE_DIR
    }

    /// Strips the project root prefix from a source path.
    pub fn relative_path<'p>(&self, path: &'p str) -> &'p str {
        path.strip_prefix(self.name_template.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    }

    /// Maps a rendered path to its final output location. In template mode the
    /// `templates/` prefix is dropped.
    pub fn output_path(&self, path: &str) -> String {
        if self.is_template_mode() {
            if let Some(rest) = path.strip_prefix(TEMPLATE_DIR).and_then(|r| r.strip_prefix('/')) {
                return rest.to_string();
            }
        }
        path.to_string()
    }
}

fn find_root(fs: &dyn ReadFs) -> Result<String> {
    PROJECT_NAMES
        .iter()
        .chain(std::iter::once(&TEMPLATE_DIR))
        .find(|dir| fs.is_dir(dir))
        .map(|dir| dir.to_string())
        .ok_or_else(|| {
            Error::ConfigError(format!(
                "'{}' directory does not exist",
                PROJECT_NAMES[0]
            ))
        })
}
