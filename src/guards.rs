//! Path guards applied to every entry of the template walk.
//!
//! A guard receives the candidate output path and the entry being visited and
//! either passes on a (possibly changed) path, asks for the entry to be
//! skipped, or fails. Guards run in a fixed order:
//!
//! 1. rewrite
//! 2. render path
//! 3. no-clobber
//! 4. directories
//! 5. feature flags
//!
//! The chain is assembled once per render; guards whose configuration is
//! empty are left out.

use crate::config::{compile_glob, Feature, Rewrite};
use crate::constants::PROJECT_NAMES;
use crate::error::{Error, Result};
use crate::project::Project;
use crate::renderer::TemplateRenderer;
use crate::rwfs::{Entry, WriteFs};
use crate::vars::{parse_bool, Vars};
use globset::GlobMatcher;
use log::debug;

/// Outcome of a guard for a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded {
    /// Continue with this output path.
    Continue(String),
    /// Drop the entry; it is not rendered.
    SkipRender,
    /// Drop the entry; it needs no write of its own.
    SkipWrite,
}

pub trait Guard {
    fn name(&self) -> &'static str;

    fn transform(&self, outpath: String, entry: &Entry) -> Result<Guarded>;
}

/// Redirects entries whose source path matches a rewrite rule. The first
/// matching rule wins.
pub struct RewriteGuard {
    rules: Vec<(GlobMatcher, String)>,
}

impl RewriteGuard {
    pub fn new(rewrites: &[Rewrite]) -> Result<Self> {
        let rules = rewrites
            .iter()
            .map(|r| Ok((compile_glob(&r.from)?, r.to.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }
}

impl Guard for RewriteGuard {
    fn name(&self) -> &'static str {
        "rewrite"
    }

    fn transform(&self, outpath: String, entry: &Entry) -> Result<Guarded> {
        for (from, to) in &self.rules {
            if from.is_match(&entry.path) {
                debug!("Rewriting {} to {}", entry.path, to);
                return Ok(Guarded::Continue(to.clone()));
            }
        }
        Ok(Guarded::Continue(outpath))
    }
}

/// Evaluates the path itself as a template.
pub struct RenderPathGuard<'a> {
    engine: &'a dyn TemplateRenderer,
    vars: &'a Vars,
}

impl<'a> RenderPathGuard<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, vars: &'a Vars) -> Self {
        Self { engine, vars }
    }
}

/// A rendered path is usable when none of its segments rendered empty.
pub fn is_rendered_path_valid(path: &str) -> bool {
    !path.is_empty() && path.split('/').all(|segment| !segment.trim().is_empty())
}

impl Guard for RenderPathGuard<'_> {
    fn name(&self) -> &'static str {
        "render path"
    }

    fn transform(&self, outpath: String, _entry: &Entry) -> Result<Guarded> {
        let rendered = self.engine.render(&outpath, self.vars).map_err(|e| match e {
            Error::TemplateError(terr) => Error::TemplateError(terr.with_file(outpath.as_str())),
            other => other,
        })?;

        if !is_rendered_path_valid(&rendered) {
            debug!("Path {} rendered to '{}', skipping", outpath, rendered);
            return Ok(Guarded::SkipRender);
        }
        Ok(Guarded::Continue(rendered))
    }
}

/// Refuses to overwrite files that already exist in the destination.
pub struct NoClobberGuard<'a> {
    project: &'a Project,
    dest: &'a dyn WriteFs,
}

impl<'a> NoClobberGuard<'a> {
    pub fn new(project: &'a Project, dest: &'a dyn WriteFs) -> Self {
        Self { project, dest }
    }
}

impl Guard for NoClobberGuard<'_> {
    fn name(&self) -> &'static str {
        "no-clobber"
    }

    fn transform(&self, outpath: String, entry: &Entry) -> Result<Guarded> {
        if entry.is_dir {
            return Ok(Guarded::Continue(outpath));
        }

        let target = self.project.output_path(&outpath);
        if self.dest.is_file(&target) {
            debug!("{} exists and no-clobber is set", target);
            return Err(Error::AlreadyExistsError { path: target });
        }
        Ok(Guarded::Continue(outpath))
    }
}

/// Creates the project root directory and skips every other directory; those
/// come into existence when files are written beneath them.
pub struct DirectoryGuard<'a> {
    project: &'a Project,
    dest: &'a dyn WriteFs,
}

impl<'a> DirectoryGuard<'a> {
    pub fn new(project: &'a Project, dest: &'a dyn WriteFs) -> Self {
        Self { project, dest }
    }
}

impl Guard for DirectoryGuard<'_> {
    fn name(&self) -> &'static str {
        "directories"
    }

    fn transform(&self, outpath: String, entry: &Entry) -> Result<Guarded> {
        if !entry.is_dir {
            return Ok(Guarded::Continue(outpath));
        }

        if PROJECT_NAMES.contains(&entry.path.as_str()) {
            let target = self.project.output_path(&outpath);
            debug!("Creating project root {}", target);
            self.dest.create_dir_all(&target).map_err(|e| Error::fs(target, e))?;
        }

        Ok(Guarded::SkipWrite)
    }
}

/// Excludes entries that belong to a disabled feature.
pub struct FeatureFlagGuard<'a> {
    engine: &'a dyn TemplateRenderer,
    vars: &'a Vars,
    features: Vec<(&'a Feature, Vec<GlobMatcher>)>,
}

impl<'a> FeatureFlagGuard<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        vars: &'a Vars,
        features: &'a [Feature],
    ) -> Result<Self> {
        let features = features
            .iter()
            .map(|f| {
                let globs = f.globs.iter().map(|g| compile_glob(g)).collect::<Result<Vec<_>>>()?;
                Ok((f, globs))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { engine, vars, features })
    }
}

impl Guard for FeatureFlagGuard<'_> {
    fn name(&self) -> &'static str {
        "feature flag"
    }

    fn transform(&self, outpath: String, _entry: &Entry) -> Result<Guarded> {
        for (feature, globs) in &self.features {
            let rendered = self.engine.render(&feature.value, self.vars)?;
            if parse_bool(rendered.trim()).unwrap_or(false) {
                continue;
            }

            if globs.iter().any(|g| g.is_match(&outpath)) {
                debug!("Feature '{}' is off, skipping {}", feature.value, outpath);
                return Ok(Guarded::SkipRender);
            }
        }
        Ok(Guarded::Continue(outpath))
    }
}

/// The ordered guard list for one render.
#[derive(Default)]
pub struct GuardChain<'a> {
    guards: Vec<Box<dyn Guard + 'a>>,
}

impl<'a> GuardChain<'a> {
    pub fn builder(
        engine: &'a dyn TemplateRenderer,
        project: &'a Project,
        dest: &'a dyn WriteFs,
        vars: &'a Vars,
    ) -> GuardChainBuilder<'a> {
        GuardChainBuilder { engine, project, dest, vars, chain: GuardChain::default() }
    }

    pub fn push(&mut self, guard: impl Guard + 'a) {
        self.guards.push(Box::new(guard));
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Runs every guard in order, threading the output path through.
    pub fn apply(&self, entry: &Entry, outpath: String) -> Result<Guarded> {
        let mut outpath = outpath;
        for guard in &self.guards {
            match guard.transform(outpath, entry)? {
                Guarded::Continue(next) => {
                    debug!("Guard {}: {}", guard.name(), next);
                    outpath = next;
                }
                skip => return Ok(skip),
            }
        }
        Ok(Guarded::Continue(outpath))
    }
}

/// Assembles a [`GuardChain`] in the fixed guard order.
pub struct GuardChainBuilder<'a> {
    engine: &'a dyn TemplateRenderer,
    project: &'a Project,
    dest: &'a dyn WriteFs,
    vars: &'a Vars,
    chain: GuardChain<'a>,
}

impl<'a> GuardChainBuilder<'a> {
    /// Rewrite, render-path and no-clobber: the guards every written entry
    /// passes, including files copied verbatim.
    pub fn path_guards(mut self) -> Result<Self> {
        if !self.project.config.rewrites.is_empty() {
            self.chain.push(RewriteGuard::new(&self.project.config.rewrites)?);
        }
        self.chain.push(RenderPathGuard::new(self.engine, self.vars));
        if self.project.options.no_clobber {
            self.chain.push(NoClobberGuard::new(self.project, self.dest));
        }
        Ok(self)
    }

    /// Directory and feature-flag guards for rendered entries.
    pub fn render_guards(mut self) -> Result<Self> {
        self.chain.push(DirectoryGuard::new(self.project, self.dest));
        if !self.project.config.features.is_empty() {
            self.chain.push(FeatureFlagGuard::new(
                self.engine,
                self.vars,
                &self.project.config.features,
            )?);
        }
        Ok(self)
    }

    pub fn build(self) -> GuardChain<'a> {
        self.chain
    }
}
