use bytes::BytesMut;
use predicate_analyzer::analyzer::{Analyzer, ColumnStats, DEFAULT_MAX_EXPR_DEPTH};
use predicate_analyzer::catalog::FunctionCatalog;
use predicate_analyzer::expression::rewrite::{conjunction, conjuncts, push_down_negation};
use predicate_analyzer::expression::{AnalysisError, Expr, Selectivity};
use predicate_analyzer::term::parse_term;
use predicate_analyzer::types::DataType;
use predicate_analyzer::wire::{self, NodeType};
use std::io::{Read, Seek, Write};
use std::sync::Arc;

fn analyzer() -> Analyzer {
    let mut analyzer = Analyzer::new(Arc::new(FunctionCatalog::with_builtins()));
    analyzer.register_column("id", DataType::Int, ColumnStats::with_ndv(2));
    analyzer.register_column("region", DataType::String, ColumnStats::with_ndv(5));
    analyzer.register_column("qty", DataType::Int, ColumnStats::with_ndv(10));
    analyzer.register_column("active", DataType::Boolean, ColumnStats::default());
    analyzer
}

fn analyze(input: &str) -> Expr {
    let mut expr = parse_term(input).unwrap();
    analyzer().analyze(&mut expr).unwrap();
    expr
}

fn assert_close(actual: Selectivity, expected: f64) {
    let value = actual.value().expect("selectivity should be known");
    assert!(
        (value - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        value
    );
}

#[test]
fn test_selectivity_from_column_stats() {
    let and = analyze("and(eq(id, 1), in(region, 'eu', 'us'))");
    assert_close(and.children()[0].selectivity(), 0.5);
    assert_close(and.children()[1].selectivity(), 0.4);
    assert_close(and.selectivity(), 0.2);

    let or = analyze("or(eq(id, 1), in(region, 'eu', 'us'))");
    assert_close(or.selectivity(), 0.7);

    let not = analyze("not(in(qty, 1, 2, 3))");
    assert_close(not.children()[0].selectivity(), 0.3);
    assert_close(not.selectivity(), 0.7);

    // A column without stats makes every enclosing estimate unknown
    let unknown = analyze("and(eq(id, 1), or(active, eq(qty, 4)))");
    assert_eq!(unknown.selectivity(), Selectivity::UNKNOWN);
    assert_eq!(unknown.data_type(), DataType::Boolean);
}

#[test]
fn test_bound_slots() {
    let expr = analyze("and(eq(id, 1), or(in(region, 'eu'), not(lt(qty, 5))))");
    let slots: Vec<&str> = expr
        .as_logical_combinator()
        .unwrap()
        .bound_slots()
        .iter()
        .map(|slot| slot.label())
        .collect();
    assert_eq!(slots, vec!["id", "region", "qty"]);

    // Column compared to column binds nothing
    let expr = analyze("and(eq(id, qty), active)");
    assert!(expr.as_logical_combinator().unwrap().bound_slots().is_empty());
}

#[test]
fn test_negation() {
    let expr = analyze("and(eq(id, 1), not(active))");
    let mut negated = expr.negate();
    assert_eq!(negated.to_sql(), "id != 1 OR active");
    analyzer().analyze(&mut negated).unwrap();
    assert_eq!(negated.data_type(), DataType::Boolean);
    assert_eq!(negated.selectivity(), Selectivity::UNKNOWN);

    let expr = analyze("or(eq(id, 1), in(region, 'eu', 'us'))");
    let mut negated = expr.negate();
    assert_eq!(negated.to_sql(), "id != 1 AND region NOT IN ('eu', 'us')");
    analyzer().analyze(&mut negated).unwrap();
    assert_close(negated.children()[1].selectivity(), 0.6);

    // Original tree is unchanged
    assert_eq!(expr.to_sql(), "id = 1 OR region IN ('eu', 'us')");
    assert!(expr.is_analyzed());
}

#[test]
fn test_normalize_then_analyze() {
    let expr = parse_term("not(or(and(eq(id, 1), active), is_null(region)))").unwrap();
    let mut rewritten = push_down_negation(expr);
    assert_eq!(
        rewritten.to_sql(),
        "(id != 1 OR NOT active) AND region IS NOT NULL"
    );
    analyzer().analyze(&mut rewritten).unwrap();
    assert!(rewritten.is_analyzed());

    let parts: Vec<String> = conjuncts(&rewritten).iter().map(|e| e.to_sql()).collect();
    assert_eq!(parts, vec!["(id != 1 OR NOT active)", "region IS NOT NULL"]);
}

#[test]
fn test_conjunction_of_analyzed_predicates() {
    let mut expr = conjunction(vec![
        parse_term("eq(id, 1)").unwrap(),
        parse_term("in(region, 'eu')").unwrap(),
        parse_term("not(in(qty, 1, 2))").unwrap(),
    ])
    .unwrap();
    analyzer().analyze(&mut expr).unwrap();
    assert_close(expr.selectivity(), 0.5 * 0.2 * 0.8);
    assert_eq!(conjuncts(&expr).len(), 3);
}

#[test]
fn test_analysis_errors() {
    let analyzer = analyzer();

    let mut expr = parse_term("and(id, active)").unwrap();
    let err = analyzer.analyze(&mut expr).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Operand 'id' part of predicate 'id AND active' should return type 'BOOLEAN' but returns type 'INT'."
    );
    assert!(!expr.is_analyzed());

    let mut expr = parse_term("or(active, missing)").unwrap();
    assert_eq!(
        analyzer.analyze(&mut expr),
        Err(AnalysisError::UnknownColumn("missing".to_string()))
    );

    let mut expr = parse_term("not(eq(region, 1))").unwrap();
    assert!(matches!(
        analyzer.analyze(&mut expr),
        Err(AnalysisError::IncomparableOperands { .. })
    ));
}

#[test]
fn test_deep_input_is_rejected() {
    let levels = 200_000;
    let input = format!("{}active{}", "not(".repeat(levels), ")".repeat(levels));
    assert!(parse_term(&input).is_err());

    // Shallow to parse, but the folded AND chain is deeper than the limit
    let operands = vec!["active"; DEFAULT_MAX_EXPR_DEPTH + 100].join(", ");
    let mut expr = parse_term(&format!("and({})", operands)).unwrap();
    assert_eq!(
        analyzer().analyze(&mut expr),
        Err(AnalysisError::ExprTooDeep {
            limit: DEFAULT_MAX_EXPR_DEPTH
        })
    );
    assert!(!expr.is_analyzed());
}

#[test]
fn test_null_operand_is_cast_to_boolean() {
    let expr = analyze("and(null, active)");
    assert_eq!(expr.children()[0].data_type(), DataType::Boolean);
    assert_eq!(expr.to_sql(), "NULL AND active");
    assert_eq!(expr.function().unwrap().symbol(), "CompoundPredicate::AndComputeFn");
}

#[test]
fn test_wire_frame_through_file() {
    let expr = analyze("and(eq(id, 1), not(active))");
    let mut buf = BytesMut::new();
    wire::encode(&expr, &mut buf).unwrap();

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&buf).unwrap();
    file.flush().unwrap();

    file.rewind().unwrap();
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).unwrap();

    let nodes = wire::decode(&contents).unwrap();
    assert_eq!(nodes, wire::tree_to_wire(&expr));
    assert_eq!(nodes.len(), 6);
    assert_eq!(nodes[0].node_type, NodeType::CompoundPred);
    assert_eq!(nodes[0].fn_name.as_deref(), Some("and"));
    assert_eq!(nodes[0].selectivity, -1.0);
    assert_close(nodes[1].selectivity(), 0.5);
    assert_eq!(nodes[4].fn_name.as_deref(), Some("not"));
}
