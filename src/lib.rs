//! gridcalc - custom-column formula engine for grid study spreadsheets
//!
//! Users define derived spreadsheet columns as textual formulas over row
//! data and other columns. This library resolves inter-column dependencies,
//! detects cycles, evaluates each column per row in a sandboxed decimal
//! expression language, and type-checks the results.
//!
//! # Features
//!
//! - Whole-word dependency detection and topological calculation ordering
//! - Cycle detection naming the offending column
//! - Per-cell failure isolation via the `#ERR` marker
//! - Arbitrary-precision decimal arithmetic (no silent float rounding)
//! - Disabled meta-operations (re-parse, re-evaluate, derivative, units)
//! - Node alias substitution into evaluation-ready formulas
//! - JSON export/import of column definitions
//!
//! # Example
//!
//! ```
//! use gridcalc::{ColumnDefinition, ColumnType, CustomColumnEngine, RowValue};
//! use std::collections::HashMap;
//!
//! let columns = vec![
//!     ColumnDefinition::new("cust_b", ColumnType::Number, "var_minP + 1"),
//!     ColumnDefinition::new("cust_a", ColumnType::Number, "cust_b * 2"),
//! ];
//!
//! let mut row = HashMap::new();
//! row.insert("minP".to_string(), RowValue::Number(10.0));
//!
//! let engine = CustomColumnEngine::new();
//! let results = engine.calculate_row(&row, &columns)?;
//! assert_eq!(results["cust_a"].to_string(), "22");
//! # Ok::<(), gridcalc::GridCalcError>(())
//! ```

pub mod core;
pub mod error;
pub mod export;
pub mod types;

// Re-export commonly used types
pub use crate::core::{
    ColumnCalculator, CustomColumnEngine, Evaluator, EvaluatorConfig, ROW_FIELD_PREFIX,
};
pub use error::{GridCalcError, GridCalcResult};
pub use types::{
    CellValue, ColumnDefinition, ColumnType, NodeAlias, RowValue, SavedColumn, ERROR_MARKER,
};
