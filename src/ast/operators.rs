use std::fmt;

use serde::{Deserialize, Serialize};

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOperator {
    // Comparison
    /// Equal (`eq`)
    Eq,
    /// Not equal (`ne`)
    Ne,
    /// Greater than (`gt`)
    Gt,
    /// Greater than or equal (`ge`)
    Ge,
    /// Less than (`lt`)
    Lt,
    /// Less than or equal (`le`)
    Le,

    // Logical
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

impl BinaryOperator {
    /// The MongoDB query operator for a comparison, `None` for `and`/`or`.
    pub fn mongo_operator(self) -> Option<&'static str> {
        match self {
            BinaryOperator::Eq => Some("$eq"),
            BinaryOperator::Ne => Some("$ne"),
            BinaryOperator::Gt => Some("$gt"),
            BinaryOperator::Ge => Some("$gte"),
            BinaryOperator::Lt => Some("$lt"),
            BinaryOperator::Le => Some("$lte"),
            BinaryOperator::And | BinaryOperator::Or => None,
        }
    }

    /// The operator that gives the same result with its operands swapped:
    /// `4 lt Size` holds exactly when `Size gt 4` does.
    pub fn mirrored(self) -> Self {
        match self {
            BinaryOperator::Gt => BinaryOperator::Lt,
            BinaryOperator::Ge => BinaryOperator::Le,
            BinaryOperator::Lt => BinaryOperator::Gt,
            BinaryOperator::Le => BinaryOperator::Ge,
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Ge => "ge",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Le => "le",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOperator {
    /// Logical negation (`not`)
    Not,
    /// Arithmetic negation (`-`), only meaningful on numeric literals
    Negate,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => f.write_str("not"),
            UnaryOperator::Negate => f.write_str("-"),
        }
    }
}

/// `$orderby` direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// `1` or `-1`, as used in a MongoDB sort document.
    pub fn as_mongo(self) -> i64 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}
