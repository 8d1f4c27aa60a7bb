use gridcalc::core::graph::{build_dependency_graph, calculation_order};
use gridcalc::core::validator::{validate_result, validate_row};
use gridcalc::{
    CellValue, ColumnDefinition, ColumnType, CustomColumnEngine, Evaluator, GridCalcError,
    RowValue,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::collections::HashMap;

fn col(name: &str, formula: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Number, formula)
}

#[test]
fn test_cycle_raises_named_circular_dependency() {
    let columns = vec![col("a", "b + 1"), col("b", "a + 1")];
    let err = calculation_order(&columns).unwrap_err();
    match err {
        GridCalcError::CircularDependency(name) => assert!(name == "a" || name == "b"),
        other => panic!("expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_three_column_cycle_detected() {
    let columns = vec![col("a", "b"), col("b", "c"), col("c", "a")];
    assert!(matches!(
        calculation_order(&columns),
        Err(GridCalcError::CircularDependency(_))
    ));
}

#[test]
fn test_topological_order_respects_every_edge() {
    let columns = vec![
        col("total", "base + margin + taxes"),
        col("margin", "base * 0.1"),
        col("taxes", "base * 0.2"),
        col("base", "var_p"),
    ];
    let graph = build_dependency_graph(&columns);
    let order = calculation_order(&columns).unwrap();
    let pos = |name: &str| order.iter().position(|n| n == name).unwrap();

    for (source, deps) in &graph {
        for dep in deps {
            assert!(pos(dep) < pos(source));
        }
    }
}

#[test]
fn test_per_column_failure_isolation() {
    let engine = CustomColumnEngine::new();
    let columns = vec![col("a", "1/0_invalid_token"), col("b", "5")];

    let results = engine.calculate_row(&HashMap::new(), &columns).unwrap();
    assert_eq!(results["a"], CellValue::Error);
    assert_eq!(results["a"].to_string(), "#ERR");
    assert_eq!(results["b"], CellValue::Number(Decimal::from(5)));
}

#[test]
fn test_dependency_propagation_example() {
    // cust_b = var_minP + 1, cust_a = cust_b + cust_c, cust_c = cust_b + 1
    let engine = CustomColumnEngine::new();
    let columns = vec![
        col("cust_b", "var_minP + 1"),
        col("cust_a", "cust_b + cust_c"),
        col("cust_c", "cust_b + 1"),
    ];

    let mut row = HashMap::new();
    row.insert("minP".to_string(), RowValue::Number(10.0));

    let results = engine.calculate_row(&row, &columns).unwrap();
    assert_eq!(results["cust_b"], CellValue::Number(Decimal::from(11)));
    assert_eq!(results["cust_c"], CellValue::Number(Decimal::from(12)));
    assert_eq!(results["cust_a"], CellValue::Number(Decimal::from(23)));
}

#[test]
fn test_disabled_builtin_rejected() {
    let evaluator = Evaluator::default();
    let err = evaluator
        .evaluate("parse(\"1+1\")", &HashMap::new())
        .unwrap_err();
    match err {
        GridCalcError::Eval(message) => assert!(message.contains("disabled")),
        other => panic!("expected Eval error, got {:?}", other),
    }
}

#[test]
fn test_precision_preserved_beyond_f64() {
    let evaluator = Evaluator::default();
    let value = evaluator
        .evaluate("123456789012345 + 1", &HashMap::new())
        .unwrap();
    assert_eq!(value, CellValue::Number("123456789012346".parse().unwrap()));
    assert_eq!(value.to_string(), "123456789012346");
}

#[test]
fn test_type_validation_boundaries() {
    assert!(!validate_result(&CellValue::Boolean(true), ColumnType::Number).is_valid);
    assert!(validate_result(&CellValue::Number(Decimal::from(42)), ColumnType::Text).is_valid);
    assert!(validate_result(&CellValue::Text("abc".to_string()), ColumnType::Enum).is_valid);
    assert!(
        !validate_result(
            &CellValue::Number("3.14".parse().unwrap()),
            ColumnType::Boolean
        )
        .is_valid
    );
}

#[test]
fn test_validation_is_advisory_not_blocking() {
    // A NUMBER column producing text still calculates; the validator only
    // annotates the mismatch afterwards
    let engine = CustomColumnEngine::new();
    let columns = vec![col("n", "\"not a number\"")];

    let results = engine.calculate_row(&HashMap::new(), &columns).unwrap();
    assert_eq!(
        results["n"],
        CellValue::Text("not a number".to_string())
    );

    let warnings = validate_row(&columns, &results);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].column, "n");
}

#[test]
fn test_mixed_type_row_data() {
    let engine = CustomColumnEngine::new();
    let columns = vec![
        ColumnDefinition::new("loaded", ColumnType::Boolean, "var_p > 90"),
        ColumnDefinition::new(
            "label",
            ColumnType::Text,
            "CONCAT(var_name, \"/\", var_country)",
        ),
    ];

    let mut row = HashMap::new();
    row.insert("p".to_string(), RowValue::Number(95.5));
    row.insert("name".to_string(), RowValue::Text("GEN1".to_string()));
    row.insert("country".to_string(), RowValue::Text("FR".to_string()));

    let results = engine.calculate_row(&row, &columns).unwrap();
    assert_eq!(results["loaded"], CellValue::Boolean(true));
    assert_eq!(results["label"], CellValue::Text("GEN1/FR".to_string()));
}

#[test]
fn test_recalculation_is_reproducible() {
    let engine = CustomColumnEngine::new();
    let columns = vec![col("x", "var_p * 2"), col("y", "x + 1")];

    let mut row = HashMap::new();
    row.insert("p".to_string(), RowValue::Number(3.0));

    let first = engine.calculate_row(&row, &columns).unwrap();
    let second = engine.calculate_row(&row, &columns).unwrap();
    assert_eq!(first, second);
}
