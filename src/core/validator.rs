//! Result type validation for computed column values
//!
//! Advisory only: a mismatch flags the cell to the user but never blocks
//! calculation.

use crate::types::{CellValue, ColumnDefinition, ColumnType};
use std::collections::HashMap;

/// Outcome of checking one value against a declared column type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeValidation {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl TypeValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// A per-column advisory warning over one calculated row
#[derive(Debug, Clone)]
pub struct TypeWarning {
    /// Column name
    pub column: String,
    /// The formula that produced the value
    pub formula: String,
    /// Description of the mismatch
    pub message: String,
}

impl std::fmt::Display for TypeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.column, self.message, self.formula)
    }
}

/// Check an evaluated value against a declared column type
///
/// NUMBER accepts numbers and numeric-looking text but rejects booleans
/// (no 0/1 coercion). BOOLEAN requires an actual boolean. ENUM requires
/// text. TEXT accepts anything representable.
pub fn validate_result(value: &CellValue, declared: ColumnType) -> TypeValidation {
    match declared {
        ColumnType::Number => match value {
            CellValue::Boolean(_) => {
                TypeValidation::invalid("boolean result for a NUMBER column")
            }
            _ => {
                if value.as_number().is_some() {
                    TypeValidation::valid()
                } else {
                    TypeValidation::invalid(format!(
                        "result '{}' is not convertible to a number",
                        value
                    ))
                }
            }
        },
        ColumnType::Boolean => match value {
            CellValue::Boolean(_) => TypeValidation::valid(),
            _ => TypeValidation::invalid(format!("result '{}' is not a boolean", value)),
        },
        ColumnType::Enum => match value {
            CellValue::Text(_) => TypeValidation::valid(),
            _ => TypeValidation::invalid(format!("result '{}' is not an enum string", value)),
        },
        ColumnType::Text => TypeValidation::valid(),
    }
}

/// Validate a full calculated row, producing one warning per mismatched
/// column. Consumed by the UI layer for user-facing annotations.
pub fn validate_row(
    columns: &[ColumnDefinition],
    results: &HashMap<String, CellValue>,
) -> Vec<TypeWarning> {
    let mut warnings = Vec::new();

    for column in columns {
        if let Some(value) = results.get(&column.name) {
            let validation = validate_result(value, column.column_type);
            if let Some(message) = validation.error {
                warnings.push(TypeWarning {
                    column: column.name.clone(),
                    formula: column.formula.clone(),
                    message,
                });
            }
        }
    }

    warnings
}
