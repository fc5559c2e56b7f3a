use odata_mongo::ast::{BinaryOperator, LiteralValue, Node, QueryOptions};
use odata_mongo::{
    create_filter, create_filter_with, doc, Document, TranslateError, TranslateOptions, Value,
};

fn ident(name: &str) -> Node {
    Node::identifier(name)
}

fn cmp(op: BinaryOperator, left: Node, right: Node) -> Node {
    Node::binary(op, left, right)
}

fn eq(field: &str, value: impl Into<LiteralValue>) -> Node {
    cmp(BinaryOperator::Eq, ident(field), Node::literal(value))
}

fn filter_of(expression: Node) -> Document {
    let root = QueryOptions::new().with_filter(expression).into_node();
    create_filter(Some(&root)).unwrap()
}

fn filter_err(expression: Node) -> TranslateError {
    let root = QueryOptions::new().with_filter(expression).into_node();
    create_filter(Some(&root)).unwrap_err()
}

fn cond(field: &str, operator: &str, value: impl Into<Value>) -> Document {
    let value: Value = value.into();
    doc! { field => doc! { operator => value } }
}

// ============================================================================
// Absent filters
// ============================================================================

#[test]
fn test_absent_input_gives_empty_filter() {
    assert_eq!(create_filter(None).unwrap(), Document::new());
}

#[test]
fn test_query_without_filter_gives_empty_filter() {
    let root = QueryOptions::new().with_resource("Products").with_top(5).into_node();
    assert_eq!(create_filter(Some(&root)).unwrap(), Document::new());
}

#[test]
fn test_filter_without_expression_gives_empty_filter() {
    let root = Node::Filter { expression: None };
    assert_eq!(create_filter(Some(&root)).unwrap(), Document::new());
}

#[test]
fn test_non_filter_clause_root_gives_empty_filter() {
    let root = Node::Top {
        value: Box::new(Node::literal(5)),
    };
    assert_eq!(create_filter(Some(&root)).unwrap(), Document::new());
}

#[test]
fn test_bare_expression_is_the_filter() {
    let root = eq("Size", 4);
    assert_eq!(create_filter(Some(&root)).unwrap(), cond("Size", "$eq", 4));
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_simple_equality() {
    assert_eq!(filter_of(eq("Size", 4)), cond("Size", "$eq", 4));
}

#[test]
fn test_comparison_operators() {
    let cases = [
        (BinaryOperator::Ne, "$ne"),
        (BinaryOperator::Gt, "$gt"),
        (BinaryOperator::Ge, "$gte"),
        (BinaryOperator::Lt, "$lt"),
        (BinaryOperator::Le, "$lte"),
    ];
    for (op, expected) in cases {
        let result = filter_of(cmp(op, ident("Age"), Node::literal(18)));
        assert_eq!(result, cond("Age", expected, 18), "operator {op}");
    }
}

#[test]
fn test_literal_first_comparison_is_mirrored() {
    let result = filter_of(cmp(BinaryOperator::Lt, Node::literal(4), ident("Size")));
    assert_eq!(result, cond("Size", "$gt", 4));

    let result = filter_of(cmp(BinaryOperator::Eq, Node::literal("x"), ident("Name")));
    assert_eq!(result, cond("Name", "$eq", "x"));
}

#[test]
fn test_field_to_field_comparison_uses_expr() {
    let result = filter_of(cmp(BinaryOperator::Gt, ident("Price"), ident("Cost")));
    let expected = doc! {
        "$expr" => doc! { "$gt" => vec![Value::from("$Price"), Value::from("$Cost")] }
    };
    assert_eq!(result, expected);
}

#[test]
fn test_navigation_path_is_dotted() {
    let result = filter_of(eq("Address/City", "Seattle"));
    assert_eq!(result, cond("Address.City", "$eq", "Seattle"));
}

#[test]
fn test_null_comparison() {
    let result = filter_of(cmp(BinaryOperator::Eq, ident("Manager"), Node::null()));
    assert_eq!(result, cond("Manager", "$eq", Value::Null));
}

#[test]
fn test_negative_number_folds() {
    let result = filter_of(cmp(
        BinaryOperator::Gt,
        ident("Balance"),
        Node::negate(Node::literal(5)),
    ));
    assert_eq!(result, cond("Balance", "$gt", -5));
}

#[test]
fn test_date_literal_becomes_datetime() {
    let result = filter_of(cmp(
        BinaryOperator::Ge,
        ident("Created"),
        Node::literal(LiteralValue::Date("2024-01-02".into())),
    ));
    assert_eq!(
        Value::from(result).to_string(),
        r#"{"Created":{"$gte":{"$date":"2024-01-02T00:00:00Z"}}}"#
    );
}

#[test]
fn test_malformed_datetime_is_rejected() {
    let err = filter_err(cmp(
        BinaryOperator::Eq,
        ident("Created"),
        Node::literal(LiteralValue::DateTime("yesterday".into())),
    ));
    assert!(matches!(err, TranslateError::InvalidLiteralType { .. }));
}

#[test]
fn test_literal_against_literal_is_arity_error() {
    let err = filter_err(cmp(BinaryOperator::Eq, Node::literal(1), Node::literal(1)));
    assert!(matches!(
        err,
        TranslateError::InvalidOperandArity { found: 0, .. }
    ));
}

// ============================================================================
// Logical composition
// ============================================================================

#[test]
fn test_and_on_distinct_fields_merges() {
    let result = filter_of(Node::and(
        eq("Size", 4),
        cmp(BinaryOperator::Gt, ident("Age"), Node::literal(18)),
    ));
    assert_eq!(
        result,
        doc! { "Size" => doc! { "$eq" => 4 }, "Age" => doc! { "$gt" => 18 } }
    );
}

#[test]
fn test_and_range_on_one_field_merges_operators() {
    let result = filter_of(Node::and(
        cmp(BinaryOperator::Gt, ident("Age"), Node::literal(18)),
        cmp(BinaryOperator::Lt, ident("Age"), Node::literal(65)),
    ));
    assert_eq!(result, doc! { "Age" => doc! { "$gt" => 18, "$lt" => 65 } });
}

#[test]
fn test_and_with_colliding_operator_groups() {
    let result = filter_of(Node::and(
        cmp(BinaryOperator::Ne, ident("Status"), Node::literal("a")),
        cmp(BinaryOperator::Ne, ident("Status"), Node::literal("b")),
    ));
    assert_eq!(
        result,
        doc! { "$and" => vec![
            Value::from(cond("Status", "$ne", "a")),
            Value::from(cond("Status", "$ne", "b")),
        ] }
    );
}

#[test]
fn test_repeated_collision_joins_existing_and_group() {
    let ne = |n: i64| cmp(BinaryOperator::Ne, ident("Status"), Node::literal(n));
    let result = filter_of(Node::and(Node::and(ne(1), ne(2)), ne(3)));
    assert_eq!(
        result,
        doc! { "$and" => vec![
            Value::from(cond("Status", "$ne", 1)),
            Value::from(cond("Status", "$ne", 2)),
            Value::from(cond("Status", "$ne", 3)),
        ] }
    );
}

#[test]
fn test_or_on_same_field() {
    let result = filter_of(Node::or(eq("Size", 4), eq("Size", 5)));
    assert_eq!(
        result,
        doc! { "$or" => vec![
            Value::from(cond("Size", "$eq", 4)),
            Value::from(cond("Size", "$eq", 5)),
        ] }
    );
}

#[test]
fn test_nested_or_is_flattened() {
    let result = filter_of(Node::or(Node::or(eq("A", 1), eq("B", 2)), eq("C", 3)));
    let Some(Value::Array(members)) = result.get("$or") else {
        panic!("expected $or, got {result:?}");
    };
    assert_eq!(members.len(), 3);
}

#[test]
fn test_or_inside_and_keeps_grouping() {
    let result = filter_of(Node::and(
        Node::or(eq("A", 1), eq("B", 2)),
        eq("C", 3),
    ));
    assert_eq!(
        result,
        doc! {
            "$or" => vec![Value::from(cond("A", "$eq", 1)), Value::from(cond("B", "$eq", 2))],
            "C" => doc! { "$eq" => 3 },
        }
    );
}

#[test]
fn test_not_becomes_nor() {
    let result = filter_of(Node::not(eq("Size", 4)));
    assert_eq!(
        result,
        doc! { "$nor" => vec![Value::from(cond("Size", "$eq", 4))] }
    );
}

#[test]
fn test_boolean_member_predicate() {
    assert_eq!(filter_of(ident("Active")), cond("Active", "$eq", true));
}

#[test]
fn test_constant_predicates() {
    assert_eq!(filter_of(Node::literal(true)), Document::new());
    assert_eq!(filter_of(Node::literal(false)), doc! { "$expr" => false });

    let err = filter_err(Node::literal(4));
    assert!(matches!(err, TranslateError::InvalidLiteralType { .. }));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_contains_escapes_regex() {
    let result = filter_of(Node::call("contains", vec![ident("Name"), Node::literal("a.b")]));
    assert_eq!(result, cond("Name", "$regex", r"a\.b"));
}

#[test]
fn test_startswith_and_endswith_anchor() {
    let starts = filter_of(Node::call("startswith", vec![ident("Name"), Node::literal("Jo")]));
    assert_eq!(starts, cond("Name", "$regex", "^Jo"));

    let ends = filter_of(Node::call("endswith", vec![ident("Name"), Node::literal("son")]));
    assert_eq!(ends, cond("Name", "$regex", "son$"));
}

#[test]
fn test_case_insensitive_option() {
    let options = TranslateOptions {
        case_insensitive_match: true,
        ..TranslateOptions::default()
    };
    let root = Node::call("contains", vec![ident("Name"), Node::literal("ann")]);
    let result = create_filter_with(Some(&root), &options).unwrap();
    assert_eq!(
        result,
        doc! { "Name" => doc! { "$regex" => "ann", "$options" => "i" } }
    );
}

#[test]
fn test_function_compared_with_boolean() {
    let call = Node::call("contains", vec![ident("Name"), Node::literal("x")]);

    let positive = filter_of(cmp(BinaryOperator::Eq, call.clone(), Node::literal(true)));
    assert_eq!(positive, cond("Name", "$regex", "x"));

    let negative = filter_of(cmp(BinaryOperator::Eq, call.clone(), Node::literal(false)));
    assert_eq!(
        negative,
        doc! { "$nor" => vec![Value::from(cond("Name", "$regex", "x"))] }
    );

    let err = filter_err(cmp(BinaryOperator::Gt, call, Node::literal(true)));
    assert!(matches!(err, TranslateError::UnsupportedNodeKind { .. }));
}

#[test]
fn test_in_function() {
    let result = filter_of(Node::call(
        "in",
        vec![ident("Status"), Node::literal("open"), Node::literal("closed")],
    ));
    assert_eq!(
        result,
        cond(
            "Status",
            "$in",
            vec![Value::from("open"), Value::from("closed")]
        )
    );
}

#[test]
fn test_unknown_function() {
    let err = filter_err(Node::call("length", vec![ident("Name")]));
    assert!(
        matches!(err, TranslateError::UnsupportedNodeKind { ref kind, .. } if kind.contains("length")),
        "got {err:?}"
    );
}

#[test]
fn test_wrong_argument_count() {
    let err = filter_err(Node::call("contains", vec![ident("Name")]));
    assert_eq!(
        err,
        TranslateError::InvalidOperandArity {
            operator: "contains".to_string(),
            expected: "2 arguments".to_string(),
            found: 1,
        }
    );

    let err = filter_err(Node::call("in", vec![ident("Status")]));
    assert!(matches!(
        err,
        TranslateError::InvalidOperandArity { found: 1, .. }
    ));
}

#[test]
fn test_contains_requires_string_argument() {
    let err = filter_err(Node::call("contains", vec![ident("Name"), Node::literal(4)]));
    assert!(matches!(err, TranslateError::InvalidLiteralType { .. }));
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_operator_like_path_is_rejected() {
    let err = filter_err(eq("$where", 1));
    assert!(matches!(err, TranslateError::UnresolvableFieldPath { .. }));
}

#[test]
fn test_clause_node_inside_expression_is_rejected() {
    let err = filter_err(Node::and(
        eq("Size", 4),
        Node::Top {
            value: Box::new(Node::literal(1)),
        },
    ));
    assert!(matches!(err, TranslateError::UnsupportedNodeKind { ref kind, .. } if kind == "Top"));
}
