use std::fmt;

use crate::{ast::Node, translator::TranslateError};

/// A resolved MongoDB field path.
///
/// Built from an OData member path (`Address/City`) and rendered in dotted
/// form (`Address.City`). Paths resolved inside an `$expand` carry the
/// association prefix (`ListAgent.Name`).
///
/// # Examples
///
/// ```
/// use odata_mongo::path::FieldPath;
///
/// let path = FieldPath::parse("Address/City").unwrap();
/// assert_eq!(path.to_string(), "Address.City");
///
/// let prefix = FieldPath::parse("ListAgent").unwrap();
/// assert_eq!(prefix.join(&path).to_string(), "ListAgent.Address.City");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses an OData member path.
    ///
    /// Fails when the path is empty, has an empty segment (`a//b`), or has a
    /// segment MongoDB would misread: one starting with `$` (an operator) or
    /// containing `.` (a path separator, or an OData type cast).
    pub fn parse(raw: &str) -> Result<Self, TranslateError> {
        if raw.is_empty() {
            return Err(unresolvable(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            if segment.is_empty() {
                return Err(unresolvable(raw, "path has an empty segment"));
            }
            if segment.starts_with('$') {
                return Err(unresolvable(
                    raw,
                    format!("segment `{}` would be read as a query operator", segment),
                ));
            }
            if segment.contains('.') {
                return Err(unresolvable(
                    raw,
                    format!("segment `{}` contains `.`; type casts are not supported", segment),
                ));
            }
            segments.push(segment.to_string());
        }

        Ok(FieldPath { segments })
    }

    /// This path appended to `self`.
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        FieldPath { segments }
    }

    /// This path with `prefix` removed, or `None` if it does not start with it
    /// (or is equal to it).
    pub fn strip_prefix(&self, prefix: &FieldPath) -> Option<FieldPath> {
        if self.segments.len() > prefix.segments.len()
            && self.segments.starts_with(&prefix.segments)
        {
            Some(FieldPath {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Dotted form, as used in query and stage documents.
    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }

    /// `$`-prefixed form, as used to reference a field inside an aggregation
    /// expression (`$ListAgent.Name`).
    pub fn to_reference(&self) -> String {
        format!("${}", self.to_dotted())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

/// Resolves an identifier node against the current expand prefix.
///
/// Any other node kind in a path position is an `UnsupportedNodeKind` error.
pub fn resolve(node: &Node, prefix: Option<&FieldPath>) -> Result<FieldPath, TranslateError> {
    match node {
        Node::Identifier { name } => {
            let path = FieldPath::parse(name)?;
            Ok(match prefix {
                Some(prefix) => prefix.join(&path),
                None => path,
            })
        }
        other => Err(TranslateError::UnsupportedNodeKind {
            kind: other.kind().to_string(),
            context: "field path".to_string(),
        }),
    }
}

fn unresolvable(path: &str, reason: impl Into<String>) -> TranslateError {
    TranslateError::UnresolvableFieldPath {
        path: path.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let path = FieldPath::parse("Size").unwrap();
        assert_eq!(path.segments(), ["Size"]);
        assert_eq!(path.first(), "Size");
        assert_eq!(path.last(), "Size");
    }

    #[test]
    fn test_parse_navigation_path() {
        let path = FieldPath::parse("ListAgent/Seller/Name").unwrap();
        assert_eq!(path.to_dotted(), "ListAgent.Seller.Name");
        assert_eq!(path.to_reference(), "$ListAgent.Seller.Name");
        assert_eq!(path.first(), "ListAgent");
        assert_eq!(path.last(), "Name");
    }

    #[test]
    fn test_parse_rejects_bad_paths() {
        for raw in ["", "a//b", "a/", "/a", "$where", "a/$gt", "NS.Type/Name"] {
            let err = FieldPath::parse(raw).unwrap_err();
            assert!(
                matches!(err, TranslateError::UnresolvableFieldPath { .. }),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_strip_prefix() {
        let prefix = FieldPath::parse("ListAgent").unwrap();
        let path = FieldPath::parse("ListAgent/Seller/Name").unwrap();
        assert_eq!(
            path.strip_prefix(&prefix).unwrap().to_dotted(),
            "Seller.Name"
        );
        assert!(prefix.strip_prefix(&prefix).is_none());
        assert!(FieldPath::parse("Other").unwrap().strip_prefix(&prefix).is_none());
    }

    #[test]
    fn test_resolve_applies_prefix() {
        let prefix = FieldPath::parse("ListAgent").unwrap();
        let node = Node::identifier("Name");
        assert_eq!(resolve(&node, Some(&prefix)).unwrap().to_dotted(), "ListAgent.Name");
        assert_eq!(resolve(&node, None).unwrap().to_dotted(), "Name");
    }

    #[test]
    fn test_resolve_rejects_non_identifier() {
        let err = resolve(&Node::literal(4), None).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedNodeKind { ref kind, .. } if kind == "Literal"));
    }
}
