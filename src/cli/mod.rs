//! CLI support for odata-mongo
//!
//! Provides programmatic access to the translate commands so other tools can
//! embed them without spawning the binary.

mod convert;
mod translate;

pub use convert::to_json_value;
pub use translate::{execute_translate, Target, TranslateCommand};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// The AST could not be translated
    #[error("Translation error: {0}")]
    Translate(#[from] crate::TranslateError),

    /// The input was not a JSON-encoded AST
    #[error("Invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe an AST as JSON to stdin.")]
    NoInput,
}
