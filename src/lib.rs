//! quadvm
//!
//! Lowers a parsed program into quadruples, optimizes them and runs them
//! on a two-pass virtual machine.
//!
//! # Example
//!
//! ```
//! use quadvm::{run, Result};
//!
//! fn main() -> Result<()> {
//!     let ast = r#"{"node": "program", "stmts": [
//!         {"node": "print", "expr": {"node": "number", "value": 5}}
//!     ]}"#;
//!     assert_eq!(run(ast)?, "5\n");
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod frontend;
pub mod middle;
pub mod pipeline;
pub mod runtime;
pub mod vm;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;
pub use pipeline::{compile, compile_json, CompileReport, PipelineError};

use crate::util::config::Config;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "quadvm";

/// Compile and run an AST given as JSON text, returning what it printed.
pub fn run(ast_json: &str) -> Result<String> {
    debug!("run called");
    let report = compile_json(ast_json, &Config::default())?;
    Ok(report.execution.output)
}

/// Compile and run an AST JSON file
pub fn run_file(
    path: &Path,
    config: &Config,
) -> Result<CompileReport> {
    debug!(path = %path.display(), "reading AST file");
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let report = compile_json(&text, config)
        .with_context(|| format!("Failed to compile: {}", path.display()))?;
    Ok(report)
}
