//! Translate OData query ASTs into MongoDB query artifacts.
//!
//! The three entry points cover the ways a query reaches MongoDB:
//!
//! - [`create_query`] for `find`: collection, filter, projection, sort, skip
//!   and limit
//! - [`create_filter`] for a bare filter document
//! - [`create_pipeline`] for an aggregation pipeline, the only form that can
//!   carry `$expand` joins
//!
//! ```
//! use odata_mongo::ast::{BinaryOperator, ExpandItem, Node, QueryOptions};
//! use odata_mongo::{create_pipeline, pipeline};
//!
//! let root = QueryOptions::new()
//!     .with_filter(Node::binary(BinaryOperator::Eq, Node::identifier("Size"), Node::literal(4)))
//!     .with_expand(vec![ExpandItem::new("ListAgent")])
//!     .into_node();
//!
//! let stages = create_pipeline(Some(&root)).unwrap();
//! let names: Vec<_> = stages.iter().map(|stage| stage.name()).collect();
//! assert_eq!(names, ["$match", "$lookup", "$unwind"]);
//! assert_eq!(
//!     pipeline::to_value(&stages[..1]).to_string(),
//!     r#"[{"$match":{"Size":{"$eq":4}}}]"#
//! );
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod context;
pub mod filter;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod translator;
pub mod value;

pub use ast::{Node, NodeKind, QueryOptions};
pub use context::{MongoQuery, TranslationContext};
pub use output::{to_json, to_json_pretty};
pub use pipeline::Stage;
pub use translator::{TranslateError, TranslateOptions, Translator};
pub use value::{Document, Value};

use tracing::debug;

/// Translates a query for a plain `find`, with default options.
pub fn create_query(input: Option<&Node>) -> Result<MongoQuery, TranslateError> {
    create_query_with(input, &TranslateOptions::default())
}

/// Translates a query for a plain `find`.
///
/// A `find` cannot join, so `$expand` is translated (and validated) but its
/// stages are not part of the result.
pub fn create_query_with(
    input: Option<&Node>,
    options: &TranslateOptions,
) -> Result<MongoQuery, TranslateError> {
    let context = Translator::with_options(options.clone()).translate(input)?;
    if !context.stages().is_empty() {
        debug!(
            stages = context.stages().len(),
            "ignoring $expand stages for a find query"
        );
    }
    Ok(context.into_query())
}

/// Translates only the filter of a query, with default options.
pub fn create_filter(input: Option<&Node>) -> Result<Document, TranslateError> {
    create_filter_with(input, &TranslateOptions::default())
}

/// Translates only the filter of a query. See [`Translator::translate_filter`].
pub fn create_filter_with(
    input: Option<&Node>,
    options: &TranslateOptions,
) -> Result<Document, TranslateError> {
    Translator::with_options(options.clone()).translate_filter(input)
}

/// Translates a query into an aggregation pipeline, with default options.
pub fn create_pipeline(input: Option<&Node>) -> Result<Vec<Stage>, TranslateError> {
    create_pipeline_with(input, &TranslateOptions::default())
}

/// Translates a query into an aggregation pipeline.
pub fn create_pipeline_with(
    input: Option<&Node>,
    options: &TranslateOptions,
) -> Result<Vec<Stage>, TranslateError> {
    let context = Translator::with_options(options.clone()).translate(input)?;
    Ok(context.pipeline())
}
