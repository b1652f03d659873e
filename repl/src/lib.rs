//! Command line front end for the MiniJava pipeline: file runner, inline
//! evaluation and an interactive REPL.

pub mod cli;
pub mod error;
pub mod repl;
pub mod report;

pub use cli::Cli;
pub use error::{ReplError, Result};
pub use repl::Repl;

use minijava_core::config::PipelineConfig;
use minijava_core::{compile_with, CompilationReport};
use std::fs;
use std::path::Path;

pub fn load_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ReplError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Compile and run a file, returning the report for the caller to render.
pub fn run_file(path: &Path, config: &PipelineConfig) -> Result<CompilationReport> {
    let span = tracing::debug_span!("run_file", path = %path.display());
    let _enter = span.enter();

    let source = load_source(path)?;
    tracing::debug!(bytes = source.len(), "Source loaded");
    Ok(compile_with(&source, config))
}
