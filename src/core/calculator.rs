//! Per-row column value calculation
//!
//! Evaluates every custom column of one spreadsheet row in dependency order,
//! feeding earlier results back into the scope so later columns can consume
//! them. A single column's failure becomes the `#ERR` marker; it never
//! aborts the row.

use crate::core::formula::Evaluator;
use crate::types::{CellValue, ColumnDefinition, RowValue};
use std::collections::HashMap;
use tracing::debug;

/// Prefix under which row-data fields enter the evaluation scope, keeping
/// them from colliding with column names
pub const ROW_FIELD_PREFIX: &str = "var_";

/// Calculator for one table's custom columns
///
/// Borrows the caller-owned [`Evaluator`]; holds no state between calls, so
/// every invocation is independently reproducible from its inputs.
pub struct ColumnCalculator<'a> {
    evaluator: &'a Evaluator,
}

impl<'a> ColumnCalculator<'a> {
    #[must_use]
    pub fn new(evaluator: &'a Evaluator) -> Self {
        Self { evaluator }
    }

    /// Calculate all columns of one row
    ///
    /// `ordered_columns` must already be in dependency order (see
    /// [`crate::core::graph::calculation_order`]). Row fields are exposed to
    /// formulas as `var_<field>`; each computed column is merged back into
    /// the scope under its own name, as the success value or as the error
    /// marker. A dependent whose evaluation touches a failed column's marker
    /// fails the same way; a dependent that never touches it still succeeds.
    pub fn calculate_row(
        &self,
        line_data: &HashMap<String, RowValue>,
        ordered_columns: &[ColumnDefinition],
    ) -> HashMap<String, CellValue> {
        let mut scope: HashMap<String, CellValue> = line_data
            .iter()
            .map(|(field, value)| {
                (
                    format!("{}{}", ROW_FIELD_PREFIX, field),
                    value.to_cell_value(),
                )
            })
            .collect();

        let mut results = HashMap::with_capacity(ordered_columns.len());

        for column in ordered_columns {
            let value = match self.evaluator.evaluate(&column.formula, &scope) {
                Ok(value) => value,
                Err(err) => {
                    debug!(column = %column.name, error = %err, "column evaluation failed");
                    CellValue::Error
                }
            };
            scope.insert(column.name.clone(), value.clone());
            results.insert(column.name.clone(), value);
        }

        results
    }
}
