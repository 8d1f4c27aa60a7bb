//! Node alias validation and formula rewriting
//!
//! Formulas reference other computation nodes through short alias tokens
//! (`n1.minP`). When the alias set changes, every formula is rewritten into
//! an evaluation-ready form with the alias replaced by the node's current
//! name. The user-authored formula text is never mutated.

use crate::error::{GridCalcError, GridCalcResult};
use crate::types::{ColumnDefinition, NodeAlias};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Maximum length of an alias token
pub const MAX_ALIAS_LEN: usize = 10;

/// Validate an alias set before any substitution
///
/// Constraints: alias tokens at most [`MAX_ALIAS_LEN`] chars, alphanumeric
/// only, pairwise distinct; aliased node names pairwise distinct.
pub fn validate_aliases(aliases: &[NodeAlias]) -> GridCalcResult<()> {
    let mut seen_tokens = HashSet::new();
    let mut seen_names = HashSet::new();

    for alias in aliases {
        if alias.alias.len() > MAX_ALIAS_LEN {
            return Err(GridCalcError::Alias(format!(
                "alias '{}' exceeds {} characters",
                alias.alias, MAX_ALIAS_LEN
            )));
        }
        if alias.alias.is_empty() || !alias.alias.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GridCalcError::Alias(format!(
                "alias '{}' must be non-empty and alphanumeric",
                alias.alias
            )));
        }
        if !seen_tokens.insert(alias.alias.as_str()) {
            return Err(GridCalcError::Alias(format!(
                "duplicate alias '{}'",
                alias.alias
            )));
        }
        if !seen_names.insert(alias.name.as_str()) {
            return Err(GridCalcError::Alias(format!(
                "node '{}' is aliased more than once",
                alias.name
            )));
        }
    }

    Ok(())
}

/// Rewrite one formula: every whole-word `<alias>.` becomes `<node name>.`
///
/// Idempotent under a stable alias set: once substituted, the alias token
/// followed by a dot no longer occurs in the text.
pub fn rewrite_formula(formula: &str, aliases: &[NodeAlias]) -> String {
    let mut rewritten = formula.to_string();

    for alias in aliases {
        let Ok(pattern) = Regex::new(&format!(r"\b{}\.", regex::escape(&alias.alias))) else {
            continue;
        };
        let replacement = format!("{}.", alias.name);
        rewritten = pattern
            .replace_all(&rewritten, regex::NoExpand(&replacement))
            .into_owned();
    }

    rewritten
}

/// Rewrite the full corpus of column definitions for the current alias set
///
/// Validates the alias set first, then returns the evaluation-ready formula
/// per column name. Runs once per alias-set change.
pub fn rewrite_columns(
    columns: &[ColumnDefinition],
    aliases: &[NodeAlias],
) -> GridCalcResult<HashMap<String, String>> {
    validate_aliases(aliases)?;

    let mut rewritten = HashMap::with_capacity(columns.len());
    for column in columns {
        let formula_for_eval = rewrite_formula(&column.formula, aliases);
        if formula_for_eval != column.formula {
            debug!(column = %column.name, "alias substitution applied");
        }
        rewritten.insert(column.name.clone(), formula_for_eval);
    }

    Ok(rewritten)
}
