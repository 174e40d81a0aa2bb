//! Renders a template tree into a destination filesystem.
//!
//! The walk visits every entry under the project root. For each entry, in
//! this order:
//!
//! 1. `[var]` path tokens declared under `each` expand the entry once per item
//! 2. files matching a `skip` pattern are copied without evaluation
//! 3. everything else runs the guard chain and is rendered
//!
//! Injections run once the whole tree has been written.

use crate::config::{compile_glob, DelimiterMatcher, EachConfig};
use crate::constants::PARTIALS_DIR;
use crate::error::{Error, Result};
use crate::guards::{GuardChain, Guarded};
use crate::inject::inject;
use crate::project::Project;
use crate::renderer::TemplateRenderer;
use crate::rwfs::{self, Entry, ReadFs, Visit, Walk, WriteFs};
use crate::vars::{Value, Vars};
use globset::GlobMatcher;
use log::{debug, warn};
use regex::Regex;
use std::io;

const EACH_PATTERN: &str = r"\[([a-zA-Z_]\w*)\]";

/// Everything a single render works against.
pub struct RenderContext<'a> {
    pub source: &'a dyn ReadFs,
    pub dest: &'a dyn WriteFs,
    pub project: &'a Project,
}

/// Renders the project tree of `ctx.source` into `ctx.dest`, then applies the
/// configured injections.
///
/// Any error aborts the render; files written before it are left in place.
pub fn render_rwfs(
    engine: &mut dyn TemplateRenderer,
    ctx: &RenderContext<'_>,
    vars: &Vars,
) -> Result<()> {
    load_partials(engine, ctx.source)?;

    let engine: &dyn TemplateRenderer = engine;
    Processor::new(engine, ctx, vars)?.render_tree()?;
    run_injections(engine, ctx, vars)
}

/// Registers every file under the top-level `partials/` directory, named by
/// its path below `partials/` without the extension.
pub fn load_partials(engine: &mut dyn TemplateRenderer, source: &dyn ReadFs) -> Result<()> {
    if !source.is_dir(PARTIALS_DIR) {
        return Ok(());
    }

    for visit in Walk::new(source, PARTIALS_DIR) {
        let Visit::File(entry) = visit? else {
            continue;
        };

        let bytes = source.read_file(&entry.path).map_err(|e| Error::fs(entry.path.as_str(), e))?;
        let Ok(content) = String::from_utf8(bytes) else {
            warn!("Partial {} is not valid UTF-8, ignoring it", entry.path);
            continue;
        };

        engine.add_partial(&partial_name(&entry.path), content)?;
    }
    Ok(())
}

fn partial_name(path: &str) -> String {
    let relative = path
        .strip_prefix(PARTIALS_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path);

    match relative.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => stem.to_string(),
        _ => relative.to_string(),
    }
}

/// Applies every configured injection to files already in the destination.
pub fn run_injections(
    engine: &dyn TemplateRenderer,
    ctx: &RenderContext<'_>,
    vars: &Vars,
) -> Result<()> {
    for injection in &ctx.project.config.inject {
        let path = engine.render(&injection.path, vars)?;
        let snippet = engine.render(&injection.template, vars)?;
        if snippet.trim().is_empty() {
            debug!("Injection '{}' rendered empty, skipping", injection.name);
            continue;
        }

        let bytes = ctx.dest.read_file(&path).map_err(|e| Error::fs(path.as_str(), e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            Error::fs(path.as_str(), io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        let patched = inject(&content, &snippet, &injection.at, injection.mode).map_err(|_| {
            Error::MarkerNotFoundError {
                name: injection.name.clone(),
                path: path.clone(),
                marker: injection.at.clone(),
            }
        })?;

        debug!("Injected '{}' into {}", injection.name, path);
        ctx.dest.write_file(&path, patched.as_bytes()).map_err(|e| Error::fs(path.as_str(), e))?;
    }
    Ok(())
}

struct Processor<'a> {
    engine: &'a dyn TemplateRenderer,
    ctx: &'a RenderContext<'a>,
    vars: &'a Vars,
    skip: Vec<GlobMatcher>,
    delimiters: DelimiterMatcher<'a>,
    each_token: Regex,
}

impl<'a> Processor<'a> {
    fn new(
        engine: &'a dyn TemplateRenderer,
        ctx: &'a RenderContext<'a>,
        vars: &'a Vars,
    ) -> Result<Self> {
        let skip = ctx
            .project
            .config
            .skip
            .iter()
            .map(|pattern| compile_glob(pattern))
            .collect::<Result<Vec<_>>>()?;
        let delimiters = DelimiterMatcher::new(&ctx.project.config.delimiters)?;
        let each_token = Regex::new(EACH_PATTERN).map_err(|e| Error::ConfigError(e.to_string()))?;

        Ok(Self { engine, ctx, vars, skip, delimiters, each_token })
    }

    fn project(&self) -> &Project {
        self.ctx.project
    }

    /// Guards for verbatim copies (`full == false`) or rendered entries.
    fn guards<'b>(&'b self, vars: &'b Vars, full: bool) -> Result<GuardChain<'b>> {
        let builder =
            GuardChain::builder(self.engine, self.ctx.project, self.ctx.dest, vars).path_guards()?;
        let builder = if full { builder.render_guards()? } else { builder };
        Ok(builder.build())
    }

    fn render_tree(&self) -> Result<()> {
        let path_guards = self.guards(self.vars, false)?;
        let guards = self.guards(self.vars, true)?;

        let mut walk = Walk::new(self.ctx.source, &self.project().name_template);
        while let Some(visit) = walk.next() {
            let entry = match visit? {
                Visit::EnterDir(entry) | Visit::File(entry) => entry,
                Visit::LeaveDir(_) => continue,
            };

            if let Some((each, token)) = self.find_each(&entry.path) {
                if entry.is_dir {
                    walk.skip_current_dir();
                }
                self.expand_each(&entry, each, &token)?;
                continue;
            }

            if !entry.is_dir && self.is_skipped(&entry) {
                self.copy_verbatim(&entry, &path_guards)?;
                continue;
            }

            self.render_entry(&entry, entry.path.clone(), &guards, self.vars)?;
        }
        Ok(())
    }

    fn is_skipped(&self, entry: &Entry) -> bool {
        let relative = self.project().relative_path(&entry.path);
        let skipped = self.skip.iter().any(|glob| glob.is_match(relative));
        if skipped {
            debug!("Skip pattern matched {}", relative);
        }
        skipped
    }

    /// Writes a skipped file byte for byte. Only the path guards apply, and an
    /// existing destination file under no-clobber just drops the entry.
    fn copy_verbatim(&self, entry: &Entry, path_guards: &GuardChain<'_>) -> Result<()> {
        let outpath = match path_guards.apply(entry, entry.path.clone()) {
            Ok(Guarded::Continue(outpath)) => outpath,
            Ok(_) => return Ok(()),
            Err(err) if err.is_already_exists() => {
                debug!("Not copying {}: {}", entry.path, err);
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let outpath = self.project().output_path(&outpath);
        let bytes = self
            .ctx
            .source
            .read_file(&entry.path)
            .map_err(|e| Error::fs(entry.path.as_str(), e))?;

        debug!("Copying {} to {}", entry.path, outpath);
        self.write(&outpath, &bytes)
    }

    fn render_entry(
        &self,
        entry: &Entry,
        outpath: String,
        guards: &GuardChain<'_>,
        vars: &Vars,
    ) -> Result<()> {
        let outpath = match guards.apply(entry, outpath)? {
            Guarded::Continue(outpath) => outpath,
            Guarded::SkipRender | Guarded::SkipWrite => return Ok(()),
        };

        let outpath = self.project().output_path(&outpath);
        self.process_file(entry, &outpath, vars)
    }

    fn process_file(&self, entry: &Entry, outpath: &str, vars: &Vars) -> Result<()> {
        let bytes = self
            .ctx
            .source
            .read_file(&entry.path)
            .map_err(|e| Error::fs(entry.path.as_str(), e))?;

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                debug!("{} is not UTF-8, copying verbatim", entry.path);
                return self.write(outpath, err.as_bytes());
            }
        };

        let relative = self.project().relative_path(&entry.path);
        let (left, right) = self.delimiters.delimiters_for(relative);
        let rendered = self.engine.render_file(&entry.path, &content, vars, left, right)?;

        if rendered.trim().is_empty() {
            debug!("{} rendered empty, not writing {}", entry.path, outpath);
            return Ok(());
        }

        debug!("Writing {}", outpath);
        self.write(outpath, rendered.as_bytes())
    }

    fn write(&self, outpath: &str, data: &[u8]) -> Result<()> {
        let dir = rwfs::parent(outpath);
        self.ctx.dest.create_dir_all(dir).map_err(|e| Error::fs(dir, e))?;
        self.ctx.dest.write_file(outpath, data).map_err(|e| Error::fs(outpath, e))
    }

    /// Returns the `each` entry and bracketed token for the first `[var]` in
    /// `path`, when `var` is declared under `each`.
    fn find_each(&self, path: &str) -> Option<(&'a EachConfig, String)> {
        let caps = self.each_token.captures(path)?;
        let var = caps.get(1)?.as_str();
        let each = self.ctx.project.config.each.iter().find(|each| each.var == var)?;
        Some((each, caps.get(0)?.as_str().to_string()))
    }

    fn expand_each(&self, entry: &Entry, each: &EachConfig, token: &str) -> Result<()> {
        let items = self.list_var(&each.var)?;
        if items.is_empty() {
            warn!("each variable '{}' is empty, no files generated for {}", each.var, entry.path);
            return Ok(());
        }

        for (index, item) in items.iter().enumerate() {
            let iter_vars = each_vars(self.vars, item, index);
            let replacement = self.each_replacement(each, item, &iter_vars)?;
            let guards = self.guards(&iter_vars, true)?;
            debug!("Expanding {} as '{}'", entry.path, replacement);

            if !entry.is_dir {
                let outpath = entry.path.replacen(token, &replacement, 1);
                self.render_entry(entry, outpath, &guards, &iter_vars)?;
                continue;
            }

            for visit in Walk::new(self.ctx.source, &entry.path) {
                if let Visit::File(file) = visit? {
                    let outpath = file.path.replacen(token, &replacement, 1);
                    self.render_entry(&file, outpath, &guards, &iter_vars)?;
                }
            }
        }
        Ok(())
    }

    /// Resolves `Scaffold.<var>` as a list. A plain string is a one-item list.
    fn list_var(&self, var: &str) -> Result<Vec<String>> {
        let scaffold = self
            .vars
            .get("Scaffold")
            .and_then(Value::as_map)
            .ok_or_else(|| Error::ConfigError("each: Scaffold vars not found".to_string()))?;

        match scaffold.get(var) {
            Some(Value::List(items)) => Ok(items.clone()),
            Some(Value::Str(item)) => Ok(vec![item.clone()]),
            Some(other) => Err(Error::ConfigError(format!(
                "each: variable '{var}' is not a list (got {other:?})"
            ))),
            None => Err(Error::ConfigError(format!(
                "each: variable '{var}' not found in Scaffold vars"
            ))),
        }
    }

    fn each_replacement(&self, each: &EachConfig, item: &str, vars: &Vars) -> Result<String> {
        if each.as_template.is_empty() {
            return Ok(item.to_string());
        }

        let replacement = self.engine.render(&each.as_template, vars)?;
        if replacement.is_empty() {
            return Err(Error::ConfigError(format!(
                "each: 'as' template for '{}' rendered an empty string",
                each.var
            )));
        }
        if replacement.contains('/') {
            return Err(Error::ConfigError(format!(
                "each: 'as' template for '{}' rendered a path separator: '{replacement}'",
                each.var
            )));
        }
        Ok(replacement)
    }
}

/// Copies `vars` with `Each` bound to the current iteration.
fn each_vars(vars: &Vars, item: &str, index: usize) -> Vars {
    let mut each = Vars::new();
    each.insert("Item".to_string(), Value::from(item));
    each.insert("Index".to_string(), Value::Int(index as i64));

    let mut vars = vars.clone();
    vars.insert("Each".to_string(), Value::Map(each));
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_name() {
        assert_eq!(partial_name("partials/header.txt"), "header");
        assert_eq!(partial_name("partials/common/footer.md"), "common/footer");
        assert_eq!(partial_name("partials/LICENSE"), "LICENSE");
        assert_eq!(partial_name("partials/.hidden"), ".hidden");
        assert_eq!(partial_name("partials/a.b.c"), "a.b");
    }

    #[test]
    fn test_each_vars_keeps_bindings() {
        let mut vars = Vars::new();
        vars.insert("Project".to_string(), Value::from("demo"));

        let iter = each_vars(&vars, "auth", 2);
        assert_eq!(iter["Project"], Value::from("demo"));

        let each = iter["Each"].as_map().unwrap();
        assert_eq!(each["Item"], Value::from("auth"));
        assert_eq!(each["Index"], Value::Int(2));
        assert!(!vars.contains_key("Each"));
    }
}
