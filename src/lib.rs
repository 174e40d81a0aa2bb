//! scaffold renders a template directory into a new project tree.
//! Paths and file contents are evaluated as templates, files can be skipped,
//! rewritten or gated behind feature flags, and snippets can be injected into
//! files that already exist.

/// Command-line interface and error diagnostics
pub mod cli;

/// Descriptor handling (scaffold.yaml, scaffold.yml)
pub mod config;

pub mod constants;

/// Error types and handling for scaffold
pub mod error;

/// Plain-text snapshots of rendered trees
pub mod fsast;

/// Ordered path guards applied to every walked entry
pub mod guards;

/// Marker-based line injection
pub mod inject;

pub mod logger;

/// Preloaded answers and question handling
pub mod parser;

/// Tree walk, rendering and the injection pass
pub mod processor;

/// Template project discovery
pub mod project;

/// User input and interaction handling
pub mod prompt;

/// Template engine abstraction and the MiniJinja implementation
pub mod renderer;

/// Read/write filesystem abstraction
pub mod rwfs;

/// Variable bindings and their materialization
pub mod vars;
