use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A literal value together with the type the parser inferred for it.
///
/// Dates and datetimes stay in their textual OData form here; they are
/// validated when the literal is lowered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum LiteralValue {
    /// `null`
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// Integer literal (`Edm.Int32`, `Edm.Int64`, ...)
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// Binary floating point literal (`Edm.Double`)
    ///
    /// # Example
    /// ```text
    /// 3.14
    /// ```
    Double(f64),

    /// Decimal literal (`Edm.Decimal`)
    ///
    /// # Example
    /// ```text
    /// 12.50M
    /// ```
    Decimal(Decimal),

    /// String literal, already unquoted
    ///
    /// # Example
    /// ```text
    /// 'hello'
    /// ```
    String(String),

    /// RFC 3339 datetime (`Edm.DateTimeOffset`)
    ///
    /// # Example
    /// ```text
    /// 2024-01-02T03:04:05Z
    /// ```
    DateTime(String),

    /// Calendar date (`Edm.Date`), lowered to midnight UTC
    ///
    /// # Example
    /// ```text
    /// 2024-01-02
    /// ```
    Date(String),

    /// GUID literal (`Edm.Guid`), kept as its string form
    Guid(String),
}

impl LiteralValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Boolean(_) => "boolean",
            LiteralValue::Integer(_) => "integer",
            LiteralValue::Double(_) => "double",
            LiteralValue::Decimal(_) => "decimal",
            LiteralValue::String(_) => "string",
            LiteralValue::DateTime(_) => "datetime",
            LiteralValue::Date(_) => "date",
            LiteralValue::Guid(_) => "guid",
        }
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Boolean(b)
    }
}

impl From<i32> for LiteralValue {
    fn from(n: i32) -> Self {
        LiteralValue::Integer(n.into())
    }
}

impl From<i64> for LiteralValue {
    fn from(n: i64) -> Self {
        LiteralValue::Integer(n)
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Double(n)
    }
}

impl From<Decimal> for LiteralValue {
    fn from(d: Decimal) -> Self {
        LiteralValue::Decimal(d)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::String(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::String(s)
    }
}
