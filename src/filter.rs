//! `$filter` lowering.
//!
//! Every expression lowers to a self-contained query document; composition
//! happens on the documents themselves:
//!
//! - `and` merges both sides into one document when no condition would be
//!   lost, and falls back to `{"$and": [...]}` otherwise ([`conjoin`])
//! - `or` always groups under `{"$or": [...]}`, since merging keys would turn
//!   a disjunction into a conjunction ([`disjoin`])
//! - `not` wraps its operand in `{"$nor": [...]}` ([`negation`])

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    ast::{BinaryOperator, LiteralValue, Node, UnaryOperator},
    path::{self, FieldPath},
    translator::{TranslateError, TranslateOptions},
    value::{Document, Value},
};

/// Lowers filter expressions under one path prefix, recording every field
/// path the lowered conditions read.
pub struct FilterLowering<'a> {
    options: &'a TranslateOptions,
    prefix: Option<&'a FieldPath>,
    referenced: Vec<FieldPath>,
}

#[derive(Debug, Clone, Copy)]
enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

impl<'a> FilterLowering<'a> {
    pub fn new(options: &'a TranslateOptions, prefix: Option<&'a FieldPath>) -> Self {
        FilterLowering {
            options,
            prefix,
            referenced: Vec::new(),
        }
    }

    /// Field paths read by the conditions lowered so far, in the order they
    /// were resolved.
    pub fn into_referenced(self) -> Vec<FieldPath> {
        self.referenced
    }

    fn resolve(&mut self, node: &Node) -> Result<FieldPath, TranslateError> {
        let path = path::resolve(node, self.prefix)?;
        self.referenced.push(path.clone());
        Ok(path)
    }

    /// Lowers a boolean expression to a query document.
    pub fn lower(&mut self, node: &Node) -> Result<Document, TranslateError> {
        match node {
            Node::BinaryOp {
                op: BinaryOperator::And,
                left,
                right,
            } => Ok(conjoin(self.lower(left)?, self.lower(right)?)),
            Node::BinaryOp {
                op: BinaryOperator::Or,
                left,
                right,
            } => Ok(disjoin(self.lower(left)?, self.lower(right)?)),
            Node::BinaryOp { op, left, right } => self.lower_comparison(*op, left, right),
            Node::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => Ok(negation(self.lower(operand)?)),
            Node::FunctionCall { name, args } => self.lower_function(name, args),
            // A bare member used as a predicate tests a boolean property.
            Node::Identifier { .. } => {
                let path = self.resolve(node)?;
                Ok(field_condition(&path, "$eq", Value::Boolean(true)))
            }
            Node::Literal { .. }
            | Node::UnaryOp {
                op: UnaryOperator::Negate,
                ..
            } => self.lower_constant(node),
            other => Err(TranslateError::UnsupportedNodeKind {
                kind: other.kind().to_string(),
                context: "$filter expression".to_string(),
            }),
        }
    }

    fn lower_constant(&self, node: &Node) -> Result<Document, TranslateError> {
        match literal_value(node)? {
            Some(LiteralValue::Boolean(true)) => Ok(Document::new()),
            Some(LiteralValue::Boolean(false)) => Ok(crate::doc! { "$expr" => false }),
            Some(other) => Err(TranslateError::InvalidLiteralType {
                context: "$filter predicate".to_string(),
                expected: "a boolean".to_string(),
                found: other.type_name().to_string(),
            }),
            None => Err(TranslateError::UnsupportedNodeKind {
                kind: node.kind().to_string(),
                context: "$filter predicate".to_string(),
            }),
        }
    }

    fn lower_comparison(
        &mut self,
        op: BinaryOperator,
        left: &Node,
        right: &Node,
    ) -> Result<Document, TranslateError> {
        if let Some(condition) = self.lower_predicate_comparison(op, left, right)? {
            return Ok(condition);
        }

        let Some(operator) = op.mongo_operator() else {
            return Err(TranslateError::UnsupportedNodeKind {
                kind: format!("operator `{}`", op),
                context: "comparison".to_string(),
            });
        };

        match (left, right) {
            (Node::Identifier { .. }, Node::Identifier { .. }) => {
                let left = self.resolve(left)?;
                let right = self.resolve(right)?;
                let comparison = crate::doc! {
                    operator => vec![Value::from(left.to_reference()), Value::from(right.to_reference())]
                };
                Ok(crate::doc! { "$expr" => comparison })
            }
            (Node::Identifier { .. }, value) => {
                let path = self.resolve(left)?;
                let value = self.operand_value(value, op.as_str())?;
                Ok(field_condition(&path, operator, value))
            }
            (value, Node::Identifier { .. }) => {
                let path = self.resolve(right)?;
                let value = self.operand_value(value, op.as_str())?;
                let operator = op.mirrored().mongo_operator().unwrap_or(operator);
                Ok(field_condition(&path, operator, value))
            }
            _ => Err(TranslateError::InvalidOperandArity {
                operator: op.to_string(),
                expected: "one field operand".to_string(),
                found: 0,
            }),
        }
    }

    /// `contains(Name,'x') eq true` and friends: a boolean function compared
    /// with a boolean literal.
    fn lower_predicate_comparison(
        &mut self,
        op: BinaryOperator,
        left: &Node,
        right: &Node,
    ) -> Result<Option<Document>, TranslateError> {
        let (call, literal) = match (left, right) {
            (call @ Node::FunctionCall { .. }, literal @ Node::Literal { .. })
            | (literal @ Node::Literal { .. }, call @ Node::FunctionCall { .. }) => (call, literal),
            _ => return Ok(None),
        };
        let Node::FunctionCall { name, args } = call else {
            return Ok(None);
        };

        let expected = match literal {
            Node::Literal {
                value: LiteralValue::Boolean(b),
            } => *b,
            Node::Literal { value } => {
                return Err(TranslateError::InvalidLiteralType {
                    context: format!("comparison with {}()", name),
                    expected: "a boolean".to_string(),
                    found: value.type_name().to_string(),
                });
            }
            _ => return Ok(None),
        };

        let wanted = match op {
            BinaryOperator::Eq => expected,
            BinaryOperator::Ne => !expected,
            other => {
                return Err(TranslateError::UnsupportedNodeKind {
                    kind: format!("operator `{}`", other),
                    context: format!("comparison with {}()", name),
                });
            }
        };

        let condition = self.lower_function(name, args)?;
        Ok(Some(if wanted { condition } else { negation(condition) }))
    }

    fn lower_function(&mut self, name: &str, args: &[Node]) -> Result<Document, TranslateError> {
        match name {
            "contains" => self.lower_text_match(name, args, TextMatch::Contains),
            "startswith" => self.lower_text_match(name, args, TextMatch::StartsWith),
            "endswith" => self.lower_text_match(name, args, TextMatch::EndsWith),
            "in" => self.lower_in(args),
            _ => Err(TranslateError::UnsupportedNodeKind {
                kind: format!("function `{}`", name),
                context: "$filter expression".to_string(),
            }),
        }
    }

    fn lower_text_match(
        &mut self,
        name: &str,
        args: &[Node],
        kind: TextMatch,
    ) -> Result<Document, TranslateError> {
        let [target, text] = args else {
            return Err(TranslateError::InvalidOperandArity {
                operator: name.to_string(),
                expected: "2 arguments".to_string(),
                found: args.len(),
            });
        };

        let path = self.resolve(target)?;
        let text = match literal_value(text)? {
            Some(LiteralValue::String(s)) => s,
            Some(other) => {
                return Err(TranslateError::InvalidLiteralType {
                    context: format!("{}()", name),
                    expected: "a string".to_string(),
                    found: other.type_name().to_string(),
                });
            }
            None => {
                return Err(TranslateError::UnsupportedNodeKind {
                    kind: text.kind().to_string(),
                    context: format!("argument of {}()", name),
                });
            }
        };

        let escaped = regex::escape(&text);
        let pattern = match kind {
            TextMatch::Contains => escaped,
            TextMatch::StartsWith => format!("^{}", escaped),
            TextMatch::EndsWith => format!("{}$", escaped),
        };

        let mut condition = crate::doc! { "$regex" => pattern };
        if self.options.case_insensitive_match {
            condition.insert("$options".to_string(), Value::from("i"));
        }
        Ok(crate::doc! { path.to_dotted() => condition })
    }

    fn lower_in(&mut self, args: &[Node]) -> Result<Document, TranslateError> {
        let Some((target, values)) = args.split_first().filter(|(_, rest)| !rest.is_empty()) else {
            return Err(TranslateError::InvalidOperandArity {
                operator: "in".to_string(),
                expected: "at least 2 arguments".to_string(),
                found: args.len(),
            });
        };

        let path = self.resolve(target)?;
        let values = values
            .iter()
            .map(|value| self.operand_value(value, "in"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(field_condition(&path, "$in", Value::Array(values)))
    }

    fn operand_value(&self, node: &Node, operator: &str) -> Result<Value, TranslateError> {
        match literal_value(node)? {
            Some(literal) => to_value(literal, operator),
            None => Err(TranslateError::UnsupportedNodeKind {
                kind: node.kind().to_string(),
                context: format!("operand of `{}`", operator),
            }),
        }
    }
}

/// The literal a node stands for, folding numeric negation.
///
/// Returns `Ok(None)` when the node is not a literal at all.
pub(crate) fn literal_value(node: &Node) -> Result<Option<LiteralValue>, TranslateError> {
    match node {
        Node::Literal { value } => Ok(Some(value.clone())),
        Node::UnaryOp {
            op: UnaryOperator::Negate,
            operand,
        } => {
            let Some(value) = literal_value(operand)? else {
                return Err(TranslateError::UnsupportedNodeKind {
                    kind: operand.kind().to_string(),
                    context: "numeric negation".to_string(),
                });
            };
            let negated = match value {
                LiteralValue::Integer(n) => n.checked_neg().map(LiteralValue::Integer),
                LiteralValue::Double(n) => Some(LiteralValue::Double(-n)),
                LiteralValue::Decimal(d) => Some(LiteralValue::Decimal(-d)),
                _ => None,
            };
            negated.map(Some).ok_or_else(|| TranslateError::InvalidLiteralType {
                context: "numeric negation".to_string(),
                expected: "a number".to_string(),
                found: value.type_name().to_string(),
            })
        }
        _ => Ok(None),
    }
}

/// Converts a literal to the MongoDB value it compares against.
pub(crate) fn to_value(literal: LiteralValue, context: &str) -> Result<Value, TranslateError> {
    let invalid = |expected: &str, found: &str| TranslateError::InvalidLiteralType {
        context: context.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    };

    Ok(match literal {
        LiteralValue::Null => Value::Null,
        LiteralValue::Boolean(b) => Value::Boolean(b),
        LiteralValue::Integer(n) => Value::Integer(n),
        LiteralValue::Double(n) => Value::Double(n),
        LiteralValue::Decimal(d) => Value::Decimal(d),
        LiteralValue::String(s) => Value::String(s),
        LiteralValue::DateTime(text) => {
            let parsed = DateTime::parse_from_rfc3339(&text)
                .map_err(|_| invalid("an RFC 3339 datetime", &text))?;
            Value::DateTime(parsed.with_timezone(&Utc))
        }
        LiteralValue::Date(text) => {
            let midnight = NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(|| invalid("a YYYY-MM-DD date", &text))?;
            Value::DateTime(midnight.and_utc())
        }
        LiteralValue::Guid(text) => {
            if !is_guid(&text) {
                return Err(invalid("a GUID", &text));
            }
            Value::String(text.to_ascii_lowercase())
        }
    })
}

fn is_guid(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 36
        && bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

fn field_condition(path: &FieldPath, operator: &str, value: Value) -> Document {
    crate::doc! { path.to_dotted() => crate::doc! { operator => value } }
}

/// Combines two conditions that must both hold.
///
/// Conditions on distinct fields share one document. Operator documents on
/// the same field merge when their operators differ (`{"$gt": 18}` and
/// `{"$lt": 65}`). Anything else would overwrite a condition, so both sides
/// are grouped under `$and` instead.
///
/// ```
/// use odata_mongo::doc;
/// use odata_mongo::filter::conjoin;
///
/// let merged = conjoin(
///     doc! { "Age" => doc! { "$gt" => 18 } },
///     doc! { "Age" => doc! { "$lt" => 65 } },
/// );
/// assert_eq!(merged, doc! { "Age" => doc! { "$gt" => 18, "$lt" => 65 } });
///
/// let grouped = conjoin(
///     doc! { "Age" => doc! { "$ne" => 1 } },
///     doc! { "Age" => doc! { "$ne" => 2 } },
/// );
/// assert!(grouped.contains_key("$and"));
/// ```
pub fn conjoin(left: Document, right: Document) -> Document {
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }
    if extends_and_group(&left, &right) || extends_and_group(&right, &left) {
        return group("$and", left, right);
    }
    match merge_conditions(&left, &right) {
        Some(merged) => merged,
        None => group("$and", left, right),
    }
}

/// Combines two alternatives under `$or`, flattening nested `$or` groups.
pub fn disjoin(left: Document, right: Document) -> Document {
    group("$or", left, right)
}

/// Negates a condition with `$nor`.
pub fn negation(condition: Document) -> Document {
    crate::doc! { "$nor" => vec![Value::Document(condition)] }
}

fn merge_conditions(left: &Document, right: &Document) -> Option<Document> {
    let mut merged = left.clone();
    for (key, condition) in right {
        match merged.get_mut(key) {
            None => {
                merged.insert(key.clone(), condition.clone());
            }
            Some(existing) => {
                if key.starts_with('$')
                    || !existing.is_operator_document()
                    || !condition.is_operator_document()
                {
                    return None;
                }
                let (Value::Document(existing), Value::Document(operators)) = (existing, condition)
                else {
                    return None;
                };
                if operators.keys().any(|op| existing.contains_key(op)) {
                    return None;
                }
                existing.extend(operators.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }
    Some(merged)
}

/// True when `group` is a lone `$and` group with a member constraining a
/// field that `other` also constrains. Such a condition joins the group
/// instead of sitting beside it.
fn extends_and_group(group: &Document, other: &Document) -> bool {
    if group.len() != 1 {
        return false;
    }
    let Some(Value::Array(members)) = group.get("$and") else {
        return false;
    };
    members
        .iter()
        .filter_map(Value::as_document)
        .flat_map(|member| member.keys())
        .any(|key| !key.starts_with('$') && other.contains_key(key))
}

fn group(operator: &str, left: Document, right: Document) -> Document {
    let mut clauses = Vec::new();
    flatten_into(&mut clauses, left, operator);
    flatten_into(&mut clauses, right, operator);
    crate::doc! { operator => clauses }
}

/// Pushes `doc` onto `clauses`, splicing in its members when it is itself a
/// lone group of the same operator.
fn flatten_into(clauses: &mut Vec<Value>, mut doc: Document, operator: &str) {
    if doc.len() == 1 && matches!(doc.get(operator), Some(Value::Array(_))) {
        if let Some(Value::Array(members)) = doc.swap_remove(operator) {
            clauses.extend(members);
        }
        return;
    }
    clauses.push(Value::Document(doc));
}
