use serde::{Deserialize, Serialize};

use crate::ast::{Node, SortDirection};

/// The root of a parsed OData query: the resource path plus every system
/// query option, each of them optional.
///
/// Each slot holds the node of the matching kind (`filter` holds a
/// [`Node::Filter`], `top` a [`Node::Top`], ...). The builder methods below
/// wrap plain values into those nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Resource path (`Products`, `Orders/Items`) as an identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Box<Node>>,

    /// `$filter`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Box<Node>>,

    /// `$orderby`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Box<Node>>,

    /// `$select`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Box<Node>>,

    /// `$skip`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Box<Node>>,

    /// `$top`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Box<Node>>,

    /// `$expand`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<Box<Node>>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, path: &str) -> Self {
        self.resource = Some(Box::new(Node::identifier(path)));
        self
    }

    /// Sets `$filter` to the given boolean expression.
    pub fn with_filter(mut self, expression: Node) -> Self {
        self.filter = Some(Box::new(Node::filter(expression)));
        self
    }

    /// Sets `$orderby` from `(path, direction)` pairs.
    pub fn with_order_by(mut self, items: &[(&str, Option<SortDirection>)]) -> Self {
        let items = items
            .iter()
            .map(|(path, direction)| Node::order_by_item(Node::identifier(*path), *direction))
            .collect();
        self.order_by = Some(Box::new(Node::OrderBy { items }));
        self
    }

    pub fn with_select(mut self, paths: &[&str]) -> Self {
        let items = paths.iter().map(|path| Node::identifier(*path)).collect();
        self.select = Some(Box::new(Node::Select { items }));
        self
    }

    pub fn with_skip(mut self, count: i64) -> Self {
        self.skip = Some(Box::new(Node::Skip {
            value: Box::new(Node::literal(count)),
        }));
        self
    }

    pub fn with_top(mut self, count: i64) -> Self {
        self.top = Some(Box::new(Node::Top {
            value: Box::new(Node::literal(count)),
        }));
        self
    }

    pub fn with_expand(mut self, items: Vec<ExpandItem>) -> Self {
        self.expand = Some(Box::new(Node::Expand { items }));
        self
    }

    pub fn into_node(self) -> Node {
        Node::QueryOptions(self)
    }
}

/// One association named in `$expand`, with its own nested options.
///
/// # Example
/// ```text
/// $expand=ListAgent($filter=Active eq true;$expand=Seller)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandItem {
    /// Navigation property path, as an identifier
    pub path: Box<Node>,

    /// Nested `QueryOptions` node applied to the joined documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Box<Node>>,
}

impl ExpandItem {
    pub fn new(path: &str) -> Self {
        ExpandItem {
            path: Box::new(Node::identifier(path)),
            options: None,
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = Some(Box::new(options.into_node()));
        self
    }
}
