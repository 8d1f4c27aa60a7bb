//! Persisted column export format
//!
//! The "save columns" feature serializes an ordered list of
//! `{name, formula}` pairs as JSON. Ids, declared types, and precision are
//! UI-local and deliberately absent: reconstructed definitions recalculate
//! identically given the same row data.

use crate::error::GridCalcResult;
use crate::types::{ColumnDefinition, ColumnType, SavedColumn};

/// Serialize a column set to the persisted JSON list, preserving order
pub fn export_columns(columns: &[ColumnDefinition]) -> GridCalcResult<String> {
    let saved: Vec<SavedColumn> = columns
        .iter()
        .map(|column| SavedColumn {
            name: column.name.clone(),
            formula: column.formula.clone(),
        })
        .collect();
    Ok(serde_json::to_string(&saved)?)
}

/// Reconstruct column definitions from the persisted JSON list
///
/// Fresh ids are assigned; the declared type defaults to TEXT (accepts any
/// result) since the wire format does not carry it.
pub fn import_columns(json: &str) -> GridCalcResult<Vec<ColumnDefinition>> {
    let saved: Vec<SavedColumn> = serde_json::from_str(json)?;
    Ok(saved
        .into_iter()
        .map(|column| ColumnDefinition::new(column.name, ColumnType::Text, column.formula))
        .collect())
}
