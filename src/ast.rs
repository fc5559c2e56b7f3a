//! # OData Query AST
//!
//! The tree a parser produces from an OData query string and the translator
//! consumes. Parsing the query text is outside this crate: any parser that can
//! build these nodes (directly, or as JSON through serde) can drive the
//! translator.
//!
//! ## Layout
//!
//! - **[node]** - the closed [`Node`] union and its kind tag
//! - **[literals]** - typed literal values
//! - **[operators]** - binary/unary operators and sort direction
//! - **[query]** - the root [`QueryOptions`] and `$expand` items
//!
//! ## Shape of a query
//!
//! ```text
//! Products?$filter=Size eq 4&$orderby=Orders&$skip=10&$top=5&$expand=ListAgent($expand=Seller)
//! ```
//!
//! parses to a `QueryOptions` whose slots hold:
//!
//! ```text
//! resource  Identifier(Products)
//! filter    Filter(BinaryOp(eq, Identifier(Size), Literal(4)))
//! order_by  OrderBy[OrderByItem(Identifier(Orders))]
//! skip      Skip(Literal(10))
//! top       Top(Literal(5))
//! expand    Expand[ExpandItem(ListAgent, QueryOptions{expand: Expand[ExpandItem(Seller)]})]
//! ```
//!
//! ## Building trees in Rust
//!
//! ```
//! use odata_mongo::ast::{BinaryOperator, ExpandItem, Node, QueryOptions};
//!
//! let query = QueryOptions::new()
//!     .with_resource("Products")
//!     .with_filter(Node::binary(BinaryOperator::Eq, Node::identifier("Size"), Node::literal(4)))
//!     .with_top(5)
//!     .with_expand(vec![ExpandItem::new("ListAgent")])
//!     .into_node();
//! assert!(matches!(query, Node::QueryOptions(_)));
//! ```
pub mod literals;
pub mod node;
pub mod operators;
pub mod query;

pub use literals::LiteralValue;
pub use node::{Node, NodeKind};
pub use operators::{BinaryOperator, SortDirection, UnaryOperator};
pub use query::{ExpandItem, QueryOptions};
