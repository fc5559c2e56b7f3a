//! Translate a JSON-encoded OData AST

use super::{to_json_value, CliError};
use crate::{ast::Node, pipeline, TranslateOptions, Value};

/// Which artifact to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// All `find` artifacts as one object
    #[default]
    Query,
    /// The filter document only
    Filter,
    /// The aggregation pipeline as an array of stages
    Pipeline,
}

/// Options for the translate commands
#[derive(Debug, Clone, Default)]
pub struct TranslateCommand {
    pub target: Target,
    /// JSON-encoded AST
    pub input: Option<String>,
    pub options: TranslateOptions,
}

/// Execute a translate command, returning the artifact as JSON
pub fn execute_translate(command: &TranslateCommand) -> Result<serde_json::Value, CliError> {
    let json_str = command.input.as_deref().ok_or(CliError::NoInput)?;

    // `null` is an absent AST, which translates to empty artifacts.
    let root: Option<Node> = serde_json::from_str(json_str)?;

    let output = match command.target {
        Target::Query => {
            Value::from(crate::create_query_with(root.as_ref(), &command.options)?.to_document())
        }
        Target::Filter => Value::from(crate::create_filter_with(root.as_ref(), &command.options)?),
        Target::Pipeline => {
            pipeline::to_value(&crate::create_pipeline_with(root.as_ref(), &command.options)?)
        }
    };

    Ok(to_json_value(output))
}
