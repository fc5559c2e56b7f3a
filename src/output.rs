//! MongoDB extended-JSON rendering for translated values.
//!
//! Output follows the relaxed extended-JSON conventions: integers and doubles
//! print as plain JSON numbers, while types JSON cannot express print as
//! wrapper documents.
//!
//! - decimals print as `{"$numberDecimal": "12.50"}`
//! - datetimes print as `{"$date": "2024-01-02T03:04:05Z"}`
//! - non-finite doubles print as `{"$numberDouble": "NaN"}`
//!
//! Document keys print in insertion order, so a sort document or a pipeline
//! stage renders exactly as it was built.
//!
//! # Examples
//!
//! ```
//! use odata_mongo::doc;
//! use odata_mongo::Value;
//! use odata_mongo::output::{to_json, to_json_pretty};
//!
//! let value = Value::from(doc! { "Size" => 4 });
//!
//! assert_eq!(to_json(&value), r#"{"Size":4}"#);
//! assert_eq!(to_json_pretty(&value), "{\n  \"Size\": 4\n}");
//! ```

use chrono::SecondsFormat;

use crate::value::{Document, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    pub fn print_document(&self, doc: &Document) -> String {
        self.print_object(doc, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Double(n) if n.is_finite() => format!("{:?}", n),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Double(_) | Value::Decimal(_) | Value::DateTime(_) => match extended_wrapper(value) {
                Some((key, text)) => self.print_wrapper(key, &text, indent),
                None => "null".to_string(),
            },
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Document(doc) => self.print_object(doc, indent),
        }
    }

    fn print_wrapper(&self, key: &str, text: &str, indent: usize) -> String {
        let mut wrapper = Document::new();
        wrapper.insert(key.to_string(), Value::String(text.to_string()));
        self.print_object(&wrapper, indent)
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let mut result = "[\n".to_string();
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push(']');
            result
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, obj: &Document, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        if self.pretty {
            let mut result = "{\n".to_string();
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            result.push_str(&items.join(",\n"));
            result.push('\n');
            result.push_str(&self.indent(indent));
            result.push('}');
            result
        } else {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("\"{}\":{}", self.escape_string(k), self.print_value(v, indent)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        s.chars()
            .flat_map(|c| match c {
                '"' => vec!['\\', '"'],
                '\\' => vec!['\\', '\\'],
                '\n' => vec!['\\', 'n'],
                '\r' => vec!['\\', 'r'],
                '\t' => vec!['\\', 't'],
                c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
                c => vec![c],
            })
            .collect()
    }
}

/// The `{"$key": "text"}` wrapper for values plain JSON cannot express:
/// decimals, datetimes and non-finite doubles. `None` for every other value.
pub fn extended_wrapper(value: &Value) -> Option<(&'static str, String)> {
    match value {
        Value::Double(n) if n.is_nan() => Some(("$numberDouble", "NaN".to_string())),
        Value::Double(n) if n.is_infinite() => {
            let text = if *n > 0.0 { "Infinity" } else { "-Infinity" };
            Some(("$numberDouble", text.to_string()))
        }
        Value::Decimal(d) => Some(("$numberDecimal", d.to_string())),
        Value::DateTime(dt) => Some(("$date", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        _ => None,
    }
}

/// Renders a value as compact extended JSON.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Renders a value as extended JSON with 2-space indentation.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
