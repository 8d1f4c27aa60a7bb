//! Formula evaluation: tokenizer, recursive-descent parser, and AST evaluator
//!
//! The entry point is [`Evaluator`], a caller-owned handle constructed from an
//! [`EvaluatorConfig`]. One instance per table/tab keeps disabled-function
//! configuration isolated between contexts; there is no shared global state.

pub mod evaluator;
pub mod parser;
pub mod tokenizer;

mod math;
mod text;

use crate::error::{GridCalcError, GridCalcResult};
use crate::types::CellValue;
use std::collections::{BTreeSet, HashMap};

/// Meta-operations disabled by default: each would let a formula re-enter the
/// evaluator or alter its environment
pub const DISABLED_META_FUNCTIONS: [&str; 7] = [
    "PARSE",
    "EVALUATE",
    "COMPILE",
    "SIMPLIFY",
    "DERIVATIVE",
    "UNIT",
    "CREATEUNIT",
];

/// Functions the evaluator implements
pub const BUILTIN_FUNCTIONS: [&str; 21] = [
    "ABS", "SQRT", "ROUND", "FLOOR", "CEILING", "MOD", "POWER", "EXP", "LN", "LOG", "MIN", "MAX",
    "IF", "AND", "OR", "NOT", "CONCAT", "UPPER", "LOWER", "TRIM", "LEN",
];

/// True when `name` matches a built-in or disabled function (case-insensitive).
/// Column names must not shadow these.
pub fn is_reserved_function(name: &str) -> bool {
    let upper = name.to_uppercase();
    BUILTIN_FUNCTIONS.contains(&upper.as_str()) || DISABLED_META_FUNCTIONS.contains(&upper.as_str())
}

/// Evaluator configuration
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Function names (uppercase) whose invocation fails deterministically
    pub disabled_functions: BTreeSet<String>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            disabled_functions: DISABLED_META_FUNCTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A configured formula evaluator
///
/// Holds no per-call mutable state; one instance can serve many `evaluate`
/// calls across rows.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    #[must_use]
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate a formula string against a flat name-to-value scope
    pub fn evaluate(
        &self,
        formula: &str,
        scope: &HashMap<String, CellValue>,
    ) -> GridCalcResult<CellValue> {
        let tokens =
            tokenizer::tokenize(formula).map_err(|e| GridCalcError::Eval(e.to_string()))?;
        let ast = parser::parse(tokens).map_err(|e| GridCalcError::Eval(e.to_string()))?;
        evaluator::evaluate(&ast, scope, &self.config)
            .map_err(|e| GridCalcError::Eval(e.to_string()))
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_function_names() {
        assert!(is_reserved_function("round"));
        assert!(is_reserved_function("PARSE"));
        assert!(!is_reserved_function("cust_a"));
    }

    #[test]
    fn test_default_config_disables_meta_operations() {
        let config = EvaluatorConfig::default();
        assert!(config.disabled_functions.contains("EVALUATE"));
        assert!(config.disabled_functions.contains("DERIVATIVE"));
    }

    #[test]
    fn test_evaluator_surfaces_tokenize_and_parse_errors() {
        let evaluator = Evaluator::default();
        let scope = HashMap::new();
        assert!(evaluator.evaluate("@nope", &scope).is_err());
        assert!(evaluator.evaluate("1 +", &scope).is_err());
    }

    #[test]
    fn test_per_instance_config_isolation() {
        // A table that additionally bans SQRT must not affect another table
        let mut restricted = EvaluatorConfig::default();
        restricted.disabled_functions.insert("SQRT".to_string());
        let table_a = Evaluator::new(restricted);
        let table_b = Evaluator::default();

        let scope = HashMap::new();
        assert!(table_a.evaluate("SQRT(4)", &scope).is_err());
        assert!(table_b.evaluate("SQRT(4)", &scope).is_ok());
    }
}
