use odata_mongo::ast::{BinaryOperator, ExpandItem, LiteralValue, Node, QueryOptions, SortDirection};
use odata_mongo::{create_query, doc, Document, MongoQuery, TranslateError, Value};

fn size_eq(n: i64) -> Node {
    Node::binary(BinaryOperator::Eq, Node::identifier("Size"), Node::literal(n))
}

fn query_of(options: QueryOptions) -> MongoQuery {
    create_query(Some(&options.into_node())).unwrap()
}

fn query_err(options: QueryOptions) -> TranslateError {
    create_query(Some(&options.into_node())).unwrap_err()
}

// ============================================================================
// Find artifacts
// ============================================================================

#[test]
fn test_absent_input_gives_empty_query() {
    assert_eq!(create_query(None).unwrap(), MongoQuery::default());
}

#[test]
fn test_collection_from_resource_path() {
    let query = query_of(QueryOptions::new().with_resource("Products"));
    assert_eq!(query.collection.as_deref(), Some("Products"));

    let query = query_of(QueryOptions::new().with_resource("Orders/Items"));
    assert_eq!(query.collection.as_deref(), Some("Orders"));
}

#[test]
fn test_orderby_skip_top() {
    let query = query_of(
        QueryOptions::new()
            .with_order_by(&[("Orders", None)])
            .with_skip(10)
            .with_top(5),
    );
    assert_eq!(query.sort, doc! { "Orders" => 1 });
    assert_eq!(query.skip, Some(10));
    assert_eq!(query.limit, Some(5));
    assert_eq!(query.query, Document::new());
}

#[test]
fn test_multiple_orderby_keep_order() {
    let query = query_of(QueryOptions::new().with_order_by(&[
        ("Name", Some(SortDirection::Descending)),
        ("Age", None),
        ("Address/City", Some(SortDirection::Ascending)),
    ]));
    let keys: Vec<_> = query.sort.keys().cloned().collect();
    assert_eq!(keys, ["Name", "Age", "Address.City"]);
    assert_eq!(
        query.sort,
        doc! { "Name" => -1, "Age" => 1, "Address.City" => 1 }
    );
}

#[test]
fn test_orderby_accepts_bare_identifiers() {
    let options = QueryOptions {
        order_by: Some(Box::new(Node::OrderBy {
            items: vec![Node::identifier("Name")],
        })),
        ..QueryOptions::default()
    };
    assert_eq!(query_of(options).sort, doc! { "Name" => 1 });
}

#[test]
fn test_select_builds_projection() {
    let query = query_of(QueryOptions::new().with_select(&["Name", "Address/City"]));
    assert_eq!(query.projection, doc! { "Name" => 1, "Address.City" => 1 });
}

#[test]
fn test_select_star_selects_everything() {
    let query = query_of(QueryOptions::new().with_select(&["Name", "*"]));
    assert_eq!(query.projection, Document::new());
}

#[test]
fn test_select_rejects_expressions() {
    let options = QueryOptions {
        select: Some(Box::new(Node::Select {
            items: vec![Node::literal(1)],
        })),
        ..QueryOptions::default()
    };
    let err = query_err(options);
    assert!(matches!(
        err,
        TranslateError::UnsupportedNodeKind { ref context, .. } if context == "$select"
    ));
}

#[test]
fn test_full_query() {
    let query = query_of(
        QueryOptions::new()
            .with_resource("Products")
            .with_filter(size_eq(4))
            .with_select(&["Name"])
            .with_order_by(&[("Name", None)])
            .with_skip(20)
            .with_top(10),
    );
    assert_eq!(
        Value::from(query.to_document()).to_string(),
        concat!(
            r#"{"collection":"Products","query":{"Size":{"$eq":4}},"#,
            r#""projection":{"Name":1},"sort":{"Name":1},"skip":20,"limit":10}"#
        )
    );
}

#[test]
fn test_expand_is_ignored_for_find() {
    let with_expand = query_of(
        QueryOptions::new()
            .with_filter(size_eq(4))
            .with_expand(vec![ExpandItem::new("ListAgent")]),
    );
    let without = query_of(QueryOptions::new().with_filter(size_eq(4)));
    assert_eq!(with_expand, without);
}

#[test]
fn test_expand_is_still_validated_for_find() {
    let err = query_err(QueryOptions::new().with_expand(vec![ExpandItem::new("$bad")]));
    assert!(matches!(err, TranslateError::UnresolvableFieldPath { .. }));
}

// ============================================================================
// Paging errors
// ============================================================================

#[test]
fn test_negative_top() {
    let err = query_err(QueryOptions::new().with_top(-1));
    assert_eq!(
        err,
        TranslateError::InvalidLiteralType {
            context: "$top".to_string(),
            expected: "a non-negative integer".to_string(),
            found: "-1".to_string(),
        }
    );
}

#[test]
fn test_negative_skip() {
    let err = query_err(QueryOptions::new().with_skip(-3));
    assert!(matches!(
        err,
        TranslateError::InvalidLiteralType { ref context, .. } if context == "$skip"
    ));
}

#[test]
fn test_top_must_be_integer() {
    let options = QueryOptions {
        top: Some(Box::new(Node::Top {
            value: Box::new(Node::literal(LiteralValue::String("5".into()))),
        })),
        ..QueryOptions::default()
    };
    let err = query_err(options);
    assert!(matches!(err, TranslateError::InvalidLiteralType { ref found, .. } if found == "string"));
}

#[test]
fn test_zero_top_is_allowed() {
    assert_eq!(query_of(QueryOptions::new().with_top(0)).limit, Some(0));
}

#[test]
fn test_clause_slot_with_wrong_kind() {
    let options = QueryOptions {
        filter: Some(Box::new(Node::Top {
            value: Box::new(Node::literal(1)),
        })),
        ..QueryOptions::default()
    };
    let err = query_err(options);
    assert_eq!(
        err,
        TranslateError::UnsupportedNodeKind {
            kind: "Top".to_string(),
            context: "$filter".to_string(),
        }
    );
}

#[test]
fn test_error_messages() {
    let err = query_err(QueryOptions::new().with_top(-1));
    assert_eq!(
        err.to_string(),
        "invalid literal in $top: expected a non-negative integer, found -1"
    );
}
