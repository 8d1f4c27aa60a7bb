//! Core calculation engine with dependency resolution

pub mod alias;
pub mod calculator;
pub mod formula;
pub mod graph;
pub mod validator;

pub use calculator::{ColumnCalculator, ROW_FIELD_PREFIX};
pub use formula::{Evaluator, EvaluatorConfig};

use crate::error::{GridCalcError, GridCalcResult};
use crate::types::{CellValue, ColumnDefinition, RowValue};
use std::collections::{HashMap, HashSet};

/// True when `name` is usable as a custom column name: a formula token
/// (letters, digits, underscore, not starting with a digit) that neither
/// carries the reserved row-field prefix nor shadows a function name.
pub fn is_valid_column_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(ROW_FIELD_PREFIX)
        && !formula::is_reserved_function(name)
}

/// Convenience facade tying the engine together for one table/tab
///
/// Owns the table's [`Evaluator`]; create one per table so evaluator
/// configuration stays isolated between tabs.
pub struct CustomColumnEngine {
    evaluator: Evaluator,
}

impl CustomColumnEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::default(),
        }
    }

    #[must_use]
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self {
            evaluator: Evaluator::new(config),
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Structural pre-flight over a column set, run on definitions change
    /// so the user is warned before seeing a wall of `#ERR` cells
    ///
    /// Checks name validity, name uniqueness, and acyclicity; returns the
    /// calculation order on success. References to nonexistent columns are
    /// not an error here; they surface as `#ERR` per row at evaluation time.
    pub fn check_columns(&self, columns: &[ColumnDefinition]) -> GridCalcResult<Vec<String>> {
        let mut seen = HashSet::new();
        for column in columns {
            if !is_valid_column_name(&column.name) {
                return Err(GridCalcError::Definition(format!(
                    "invalid column name '{}'",
                    column.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(GridCalcError::Definition(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        graph::calculation_order(columns)
    }

    /// Calculate one row: order the columns, then evaluate them in order
    ///
    /// Fails only on a structural error (cycle); per-column evaluation
    /// failures are isolated as `#ERR` markers in the returned map.
    pub fn calculate_row(
        &self,
        line_data: &HashMap<String, RowValue>,
        columns: &[ColumnDefinition],
    ) -> GridCalcResult<HashMap<String, CellValue>> {
        let ordered = self.order_columns(columns)?;
        Ok(ColumnCalculator::new(&self.evaluator).calculate_row(line_data, &ordered))
    }

    /// Calculate many rows against one column set, sorting once
    pub fn calculate_rows(
        &self,
        rows: &[HashMap<String, RowValue>],
        columns: &[ColumnDefinition],
    ) -> GridCalcResult<Vec<HashMap<String, CellValue>>> {
        let ordered = self.order_columns(columns)?;
        let calculator = ColumnCalculator::new(&self.evaluator);
        Ok(rows
            .iter()
            .map(|row| calculator.calculate_row(row, &ordered))
            .collect())
    }

    fn order_columns(
        &self,
        columns: &[ColumnDefinition],
    ) -> GridCalcResult<Vec<ColumnDefinition>> {
        let order = graph::calculation_order(columns)?;
        let by_name: HashMap<&str, &ColumnDefinition> = columns
            .iter()
            .map(|column| (column.name.as_str(), column))
            .collect();
        Ok(order
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).map(|c| (*c).clone()))
            .collect())
    }
}

impl Default for CustomColumnEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;
    use rust_decimal::Decimal;

    fn col(name: &str, formula: &str) -> ColumnDefinition {
        ColumnDefinition::new(name, ColumnType::Number, formula)
    }

    #[test]
    fn test_valid_column_names() {
        assert!(is_valid_column_name("cust_a"));
        assert!(is_valid_column_name("_hidden"));
        assert!(is_valid_column_name("p2"));
    }

    #[test]
    fn test_invalid_column_names() {
        assert!(!is_valid_column_name("2p"));
        assert!(!is_valid_column_name("a-b"));
        assert!(!is_valid_column_name(""));
        assert!(!is_valid_column_name("var_minP")); // reserved row-field prefix
        assert!(!is_valid_column_name("round")); // shadows a builtin
    }

    #[test]
    fn test_check_columns_rejects_duplicates() {
        let engine = CustomColumnEngine::new();
        let columns = vec![col("a", "1"), col("a", "2")];
        assert!(matches!(
            engine.check_columns(&columns),
            Err(GridCalcError::Definition(_))
        ));
    }

    #[test]
    fn test_check_columns_reports_cycle() {
        let engine = CustomColumnEngine::new();
        let columns = vec![col("a", "b"), col("b", "a")];
        assert!(matches!(
            engine.check_columns(&columns),
            Err(GridCalcError::CircularDependency(_))
        ));
    }

    #[test]
    fn test_check_columns_allows_dangling_references() {
        // Unknown names are an evaluation-time #ERR, not a structural error
        let engine = CustomColumnEngine::new();
        let columns = vec![col("a", "no_such_column + 1")];
        assert!(engine.check_columns(&columns).is_ok());
    }

    #[test]
    fn test_calculate_row_orders_columns_itself() {
        let engine = CustomColumnEngine::new();
        // Deliberately out of dependency order
        let columns = vec![col("cust_a", "cust_b * 2"), col("cust_b", "var_p + 1")];

        let mut row = HashMap::new();
        row.insert("p".to_string(), RowValue::Number(1.0));

        let results = engine.calculate_row(&row, &columns).unwrap();
        assert_eq!(results["cust_a"], CellValue::Number(Decimal::from(4)));
    }

    #[test]
    fn test_calculate_rows_shares_order() {
        let engine = CustomColumnEngine::new();
        let columns = vec![col("x", "var_p * 10")];

        let rows: Vec<HashMap<String, RowValue>> = (1..=3)
            .map(|i| {
                let mut row = HashMap::new();
                row.insert("p".to_string(), RowValue::Number(f64::from(i)));
                row
            })
            .collect();

        let results = engine.calculate_rows(&rows, &columns).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2]["x"], CellValue::Number(Decimal::from(30)));
    }

    #[test]
    fn test_cycle_surfaces_from_calculate_row() {
        let engine = CustomColumnEngine::new();
        let columns = vec![col("a", "b + 1"), col("b", "a + 1")];
        let result = engine.calculate_row(&HashMap::new(), &columns);
        assert!(matches!(result, Err(GridCalcError::CircularDependency(_))));
    }
}
