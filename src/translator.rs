use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{LiteralValue, Node, NodeKind, QueryOptions, SortDirection},
    context::TranslationContext,
    filter::{self, FilterLowering},
    path::{self, FieldPath},
    pipeline,
    value::Document,
};

/// Errors that abort a translation.
///
/// A failed translation yields no artifacts at all: a half-built filter or
/// pipeline could match the wrong documents.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslateError {
    /// A node kind the translator cannot handle in the position it occupies,
    /// or an unknown function name
    #[error("unsupported {kind} in {context}")]
    UnsupportedNodeKind { kind: String, context: String },

    /// An operator or function applied to the wrong number or shape of operands
    #[error("`{operator}` expects {expected}, found {found}")]
    InvalidOperandArity {
        operator: String,
        expected: String,
        found: usize,
    },

    /// A literal of the wrong type or range (negative `$top`, malformed date, ...)
    #[error("invalid literal in {context}: expected {expected}, found {found}")]
    InvalidLiteralType {
        context: String,
        expected: String,
        found: String,
    },

    /// An identifier that does not form a valid MongoDB field path
    #[error("cannot resolve field path `{path}`: {reason}")]
    UnresolvableFieldPath { path: String, reason: String },
}

/// Options that shape the generated MongoDB artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    /// Field of the joined collection that an association's value refers to
    pub foreign_field: String,
    /// Unwind each `$lookup` result so the association holds one embedded
    /// document instead of an array
    pub unwind_expanded: bool,
    /// Emit `$options: "i"` on `contains`/`startswith`/`endswith` conditions
    pub case_insensitive_match: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            foreign_field: "_id".to_string(),
            unwind_expanded: true,
            case_insensitive_match: false,
        }
    }
}

/// Walks an OData AST and accumulates MongoDB artifacts into a
/// [`TranslationContext`].
///
/// The translator holds only its options; all state lives in the context, so
/// one translator can serve any number of translations.
///
/// # Examples
///
/// ```
/// use odata_mongo::ast::{BinaryOperator, Node, QueryOptions};
/// use odata_mongo::{doc, Translator};
///
/// let root = QueryOptions::new()
///     .with_filter(Node::binary(BinaryOperator::Eq, Node::identifier("Size"), Node::literal(4)))
///     .with_top(5)
///     .into_node();
///
/// let context = Translator::new().translate(Some(&root)).unwrap();
/// assert_eq!(context.filter(), &doc! { "Size" => doc! { "$eq" => 4 } });
/// assert_eq!(context.limit(), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
    options: TranslateOptions,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TranslateOptions) -> Self {
        Translator { options }
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translates a whole query into a fresh context.
    pub fn translate(&self, root: Option<&Node>) -> Result<TranslationContext, TranslateError> {
        let mut context = TranslationContext::new();
        self.visit(root, &mut context)?;
        Ok(context)
    }

    /// Translates only the filter of a query.
    ///
    /// The root may be a `QueryOptions` (every clause but `$filter` is
    /// ignored), a `Filter`, or a bare boolean expression. Other query-option
    /// nodes contribute nothing.
    pub fn translate_filter(&self, root: Option<&Node>) -> Result<Document, TranslateError> {
        let mut context = TranslationContext::new();
        match root {
            Some(Node::QueryOptions(options)) => {
                let filter = clause(&options.filter, NodeKind::Filter, "$filter")?;
                self.visit(filter, &mut context)?;
            }
            Some(node @ Node::Filter { .. }) => self.visit(Some(node), &mut context)?,
            Some(node) if node.is_expression() => self.visit(Some(node), &mut context)?,
            _ => {}
        }
        Ok(context.into_filter())
    }

    /// Visits one node, folding what it means into `context`.
    ///
    /// `None` stands for an absent clause and does nothing. Expression nodes
    /// visited directly are treated as a filter predicate.
    pub fn visit(
        &self,
        node: Option<&Node>,
        context: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        let Some(node) = node else {
            return Ok(());
        };

        match node {
            Node::QueryOptions(options) => self.visit_query_options(options, context),
            Node::Filter { expression } => self.visit_filter(expression.as_deref(), context),
            Node::OrderBy { items } => {
                for item in items {
                    match item {
                        Node::OrderByItem {
                            expression,
                            direction,
                        } => self.visit_order_by_item(expression, *direction, context)?,
                        Node::Identifier { .. } => self.visit_order_by_item(item, None, context)?,
                        other => {
                            return Err(TranslateError::UnsupportedNodeKind {
                                kind: other.kind().to_string(),
                                context: "$orderby".to_string(),
                            });
                        }
                    }
                }
                Ok(())
            }
            Node::OrderByItem {
                expression,
                direction,
            } => self.visit_order_by_item(expression, *direction, context),
            Node::Select { items } => self.visit_select(items, context),
            Node::Skip { value } => {
                let count = count_literal(value, "$skip")?;
                trace!(skip = count, "lowered $skip");
                context.set_skip(count);
                Ok(())
            }
            Node::Top { value } => {
                let count = count_literal(value, "$top")?;
                trace!(limit = count, "lowered $top");
                context.set_limit(count);
                Ok(())
            }
            Node::Expand { items } => {
                for item in items {
                    pipeline::lower_expand_item(self, item, context)?;
                }
                Ok(())
            }
            Node::Literal { .. }
            | Node::Identifier { .. }
            | Node::FunctionCall { .. }
            | Node::BinaryOp { .. }
            | Node::UnaryOp { .. } => self.visit_filter(Some(node), context),
        }
    }

    fn visit_query_options(
        &self,
        options: &QueryOptions,
        context: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        if let Some(resource) = clause(&options.resource, NodeKind::Identifier, "resource path")? {
            let path = path::resolve(resource, None)?;
            if context.set_collection(path.first()) {
                debug!(collection = path.first(), "resolved target collection");
            }
        }

        self.visit(clause(&options.filter, NodeKind::Filter, "$filter")?, context)?;
        self.visit(clause(&options.select, NodeKind::Select, "$select")?, context)?;
        self.visit(clause(&options.order_by, NodeKind::OrderBy, "$orderby")?, context)?;
        self.visit(clause(&options.skip, NodeKind::Skip, "$skip")?, context)?;
        self.visit(clause(&options.top, NodeKind::Top, "$top")?, context)?;
        self.visit(clause(&options.expand, NodeKind::Expand, "$expand")?, context)?;
        Ok(())
    }

    fn visit_filter(
        &self,
        expression: Option<&Node>,
        context: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        let Some(expression) = expression else {
            return Ok(());
        };

        let mut lowering = FilterLowering::new(&self.options, context.path_prefix());
        let condition = lowering.lower(expression)?;
        let referenced = lowering.into_referenced();
        trace!(keys = condition.len(), paths = referenced.len(), "lowered $filter");
        context.and_filter(condition);
        context.add_filter_paths(referenced);
        Ok(())
    }

    fn visit_order_by_item(
        &self,
        expression: &Node,
        direction: Option<SortDirection>,
        context: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        let path = path::resolve(expression, context.path_prefix())?;
        let direction = direction.unwrap_or_default();
        trace!(path = %path, ?direction, "lowered $orderby item");
        context.set_sort(path, direction);
        Ok(())
    }

    fn visit_select(
        &self,
        items: &[Node],
        context: &mut TranslationContext,
    ) -> Result<(), TranslateError> {
        // `*` selects every field, which is what an empty projection means.
        if items
            .iter()
            .any(|item| matches!(item, Node::Identifier { name } if name == "*"))
        {
            return Ok(());
        }

        let paths = items
            .iter()
            .map(|item| match item {
                Node::Identifier { .. } => path::resolve(item, context.path_prefix()),
                other => Err(TranslateError::UnsupportedNodeKind {
                    kind: other.kind().to_string(),
                    context: "$select".to_string(),
                }),
            })
            .collect::<Result<Vec<FieldPath>, _>>()?;

        for path in paths {
            context.add_projection(path);
        }
        Ok(())
    }
}

/// Reads an optional query-option slot, checking it holds the expected kind.
fn clause<'a>(
    slot: &'a Option<Box<Node>>,
    expected: NodeKind,
    name: &str,
) -> Result<Option<&'a Node>, TranslateError> {
    match slot.as_deref() {
        Some(node) if node.kind() != expected => Err(TranslateError::UnsupportedNodeKind {
            kind: node.kind().to_string(),
            context: name.to_string(),
        }),
        other => Ok(other),
    }
}

/// Reads the non-negative integer of a `$skip` or `$top`.
fn count_literal(node: &Node, clause: &str) -> Result<u64, TranslateError> {
    let invalid = |found: String| TranslateError::InvalidLiteralType {
        context: clause.to_string(),
        expected: "a non-negative integer".to_string(),
        found,
    };

    match filter::literal_value(node)? {
        Some(LiteralValue::Integer(n)) => u64::try_from(n).map_err(|_| invalid(n.to_string())),
        Some(other) => Err(invalid(other.type_name().to_string())),
        None => Err(TranslateError::UnsupportedNodeKind {
            kind: node.kind().to_string(),
            context: clause.to_string(),
        }),
    }
}
