use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendered in place of a value when a single cell's calculation fails.
pub const ERROR_MARKER: &str = "#ERR";

//==============================================================================
// Column definitions
//==============================================================================

/// Declared output type of a custom column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Number,
    Boolean,
    Enum,
    Text,
}

/// A user-defined spreadsheet column computed from a formula
///
/// `id` is assigned at creation and never reused. Dependencies on other
/// columns are always derived from `formula` by name matching, never stored.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub id: String,
    pub name: String,
    pub column_type: ColumnType,
    /// Display precision, meaningful only for `ColumnType::Number`
    pub precision: Option<u32>,
    pub formula: String,
}

impl ColumnDefinition {
    pub fn new(
        name: impl Into<String>,
        column_type: ColumnType,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            column_type,
            precision: None,
            formula: formula.into(),
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }
}

//==============================================================================
// Values
//==============================================================================

/// Primitive row-data value as supplied by the network-element fetch layer
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl RowValue {
    /// Convert to the evaluator's value domain. Numbers are widened to
    /// `Decimal` so that row data and formula arithmetic share one numeric
    /// representation; a non-finite number becomes the error marker.
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            RowValue::Number(n) => match Decimal::from_f64(*n) {
                Some(d) => CellValue::Number(d),
                None => CellValue::Error,
            },
            RowValue::Text(s) => CellValue::Text(s.clone()),
            RowValue::Boolean(b) => CellValue::Boolean(*b),
        }
    }
}

/// Value produced by formula evaluation
///
/// `Error` is the `#ERR` sentinel: it stands in for a failed per-cell
/// calculation so one bad column never aborts the rest of the row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(Decimal),
    Text(String),
    Boolean(bool),
    Error,
}

impl CellValue {
    /// Numeric view. Numeric-looking text converts; booleans do not, so the
    /// number/boolean separation enforced by the type validator holds here too.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(d) => Some(*d),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(d) => d.normalize().to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Error => ERROR_MARKER.to_string(),
        }
    }

    /// Strict boolean view (no truthy coercion)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

//==============================================================================
// Node aliases
//==============================================================================

/// Short token standing in for a computation node's full name inside formulas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAlias {
    /// Identifier of the referenced node, externally owned
    pub id: String,
    /// Human label of the node, substituted into evaluation-ready formulas
    pub name: String,
    /// Alias token as typed in formulas (alphanumeric, at most 10 chars)
    pub alias: String,
}

//==============================================================================
// Persisted export format
//==============================================================================

/// One row of the persisted column list (the "save columns" feature)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedColumn {
    pub name: String,
    pub formula: String,
}
