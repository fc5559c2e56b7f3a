use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// An ordered MongoDB document.
///
/// Key order is insertion order. It matters for sort specifications and for
/// the single-key documents that make up a pipeline stage.
pub type Document = IndexMap<String, Value>;

/// A MongoDB value produced by translation.
///
/// This covers the BSON types an OData literal can lower to, plus arrays and
/// embedded documents for the condition and stage documents themselves.
///
/// # Examples
///
/// ```
/// use odata_mongo::{doc, Value};
///
/// let size = doc! { "Size" => doc! { "$eq" => 4 } };
/// assert_eq!(Value::from(size).to_string(), r#"{"Size":{"$eq":4}}"#);
///
/// let names = Value::Array(vec![Value::from("a"), Value::from("b")]);
/// assert_eq!(names.type_name(), "array");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// BSON null
    Null,

    /// BSON boolean
    Boolean(bool),

    /// 64-bit integer
    Integer(i64),

    /// 64-bit binary floating point
    Double(f64),

    /// 128-bit decimal, rendered as `{"$numberDecimal": "..."}`
    Decimal(Decimal),

    /// UTF-8 string
    String(String),

    /// UTC datetime, rendered as `{"$date": "..."}`
    DateTime(DateTime<Utc>),

    /// Array of values
    Array(Vec<Value>),

    /// Embedded document
    Document(Document),
}

impl Value {
    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Document(_) => "document",
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// True for a non-empty document whose keys are all query operators
    /// (`{"$gt": 1, "$lt": 5}`), i.e. a field condition that can absorb more
    /// operators.
    pub fn is_operator_document(&self) -> bool {
        match self {
            Value::Document(doc) => !doc.is_empty() && doc.keys().all(|k| k.starts_with('$')),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::output::to_json(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Builds a [`Document`] from `key => value` pairs, keeping their order.
///
/// ```
/// use odata_mongo::doc;
///
/// let sort = doc! { "Name" => 1, "Age" => -1 };
/// assert_eq!(sort.keys().collect::<Vec<_>>(), ["Name", "Age"]);
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::Document::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::Document::new();
        $(
            document.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        document
    }};
}
