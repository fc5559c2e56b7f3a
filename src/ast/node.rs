use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{BinaryOperator, ExpandItem, LiteralValue, QueryOptions, SortDirection, UnaryOperator};

/// A node of a parsed OData query.
///
/// The set of kinds is closed: every consumer matches on it exhaustively, so
/// adding a kind is a compile-time change for the translator.
///
/// With serde the node is internally tagged by `kind`:
///
/// ```
/// use odata_mongo::ast::{BinaryOperator, Node};
///
/// let json = r#"{
///     "kind": "binaryOp",
///     "op": "eq",
///     "left": { "kind": "identifier", "name": "Size" },
///     "right": { "kind": "literal", "value": { "type": "integer", "value": 4 } }
/// }"#;
/// let node: Node = serde_json::from_str(json).unwrap();
/// assert_eq!(
///     node,
///     Node::binary(BinaryOperator::Eq, Node::identifier("Size"), Node::literal(4))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    /// Typed literal value
    ///
    /// # Examples
    /// ```text
    /// 4
    /// 'Seattle'
    /// 2024-01-02T03:04:05Z
    /// ```
    Literal { value: LiteralValue },

    /// Member path, segments separated by `/`
    ///
    /// # Examples
    /// ```text
    /// Size
    /// Address/City
    /// ```
    Identifier { name: String },

    /// Built-in function call
    ///
    /// # Examples
    /// ```text
    /// contains(Name,'ann')
    /// in(Status,'open','closed')
    /// ```
    FunctionCall {
        name: String,
        #[serde(default)]
        args: Vec<Node>,
    },

    /// Comparison or logical operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `not` or numeric negation
    UnaryOp { op: UnaryOperator, operand: Box<Node> },

    /// Root of a query (or of the nested options of an expand item)
    QueryOptions(QueryOptions),

    /// `$filter`; no expression means "no filter"
    Filter {
        #[serde(default)]
        expression: Option<Box<Node>>,
    },

    /// `$orderby`
    OrderBy { items: Vec<Node> },

    /// One `$orderby` key
    ///
    /// # Examples
    /// ```text
    /// Name
    /// Age desc
    /// ```
    OrderByItem {
        expression: Box<Node>,
        #[serde(default)]
        direction: Option<SortDirection>,
    },

    /// `$select`
    Select { items: Vec<Node> },

    /// `$skip`
    Skip { value: Box<Node> },

    /// `$top`
    Top { value: Box<Node> },

    /// `$expand`
    Expand { items: Vec<ExpandItem> },
}

/// The kind tag of a [`Node`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal,
    Identifier,
    FunctionCall,
    BinaryOp,
    UnaryOp,
    QueryOptions,
    Filter,
    OrderBy,
    OrderByItem,
    Select,
    Skip,
    Top,
    Expand,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Literal => "Literal",
            NodeKind::Identifier => "Identifier",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::BinaryOp => "BinaryOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::QueryOptions => "QueryOptions",
            NodeKind::Filter => "Filter",
            NodeKind::OrderBy => "OrderBy",
            NodeKind::OrderByItem => "OrderByItem",
            NodeKind::Select => "Select",
            NodeKind::Skip => "Skip",
            NodeKind::Top => "Top",
            NodeKind::Expand => "Expand",
        };
        f.write_str(name)
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Literal { .. } => NodeKind::Literal,
            Node::Identifier { .. } => NodeKind::Identifier,
            Node::FunctionCall { .. } => NodeKind::FunctionCall,
            Node::BinaryOp { .. } => NodeKind::BinaryOp,
            Node::UnaryOp { .. } => NodeKind::UnaryOp,
            Node::QueryOptions(_) => NodeKind::QueryOptions,
            Node::Filter { .. } => NodeKind::Filter,
            Node::OrderBy { .. } => NodeKind::OrderBy,
            Node::OrderByItem { .. } => NodeKind::OrderByItem,
            Node::Select { .. } => NodeKind::Select,
            Node::Skip { .. } => NodeKind::Skip,
            Node::Top { .. } => NodeKind::Top,
            Node::Expand { .. } => NodeKind::Expand,
        }
    }

    /// True for the kinds that can appear inside a `$filter` expression.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::Literal { .. }
                | Node::Identifier { .. }
                | Node::FunctionCall { .. }
                | Node::BinaryOp { .. }
                | Node::UnaryOp { .. }
        )
    }

    // Constructors, for parsers and tests that build trees by hand.

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Node::Literal {
            value: value.into(),
        }
    }

    pub fn null() -> Self {
        Node::Literal {
            value: LiteralValue::Null,
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier { name: name.into() }
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::FunctionCall {
            name: name.into(),
            args,
        }
    }

    pub fn binary(op: BinaryOperator, left: Node, right: Node) -> Self {
        Node::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Node::binary(BinaryOperator::And, left, right)
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::binary(BinaryOperator::Or, left, right)
    }

    pub fn not(operand: Node) -> Self {
        Node::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(operand),
        }
    }

    pub fn negate(operand: Node) -> Self {
        Node::UnaryOp {
            op: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }

    pub fn filter(expression: Node) -> Self {
        Node::Filter {
            expression: Some(Box::new(expression)),
        }
    }

    pub fn order_by_item(expression: Node, direction: Option<SortDirection>) -> Self {
        Node::OrderByItem {
            expression: Box::new(expression),
            direction,
        }
    }
}

impl From<QueryOptions> for Node {
    fn from(options: QueryOptions) -> Self {
        Node::QueryOptions(options)
    }
}
