//! AST evaluator
//!
//! Walks a parsed formula against a flat name-to-value scope and produces a
//! [`CellValue`]. Every failure is an [`EvalError`]; the column calculator
//! converts those to the `#ERR` marker so one bad cell never aborts a row.

use super::math;
use super::parser::Expr;
use super::text;
use super::EvaluatorConfig;
use crate::types::CellValue;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Error during evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub(super) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// Evaluate an expression against the given scope
pub fn evaluate(
    expr: &Expr,
    scope: &HashMap<String, CellValue>,
    config: &EvaluatorConfig,
) -> Result<CellValue, EvalError> {
    match expr {
        Expr::Number(n) => Ok(CellValue::Number(*n)),

        Expr::Text(s) => Ok(CellValue::Text(s.clone())),

        Expr::Reference(name) => match scope.get(name) {
            Some(CellValue::Error) => Err(EvalError::new(format!(
                "Reference to failed column: {}",
                name
            ))),
            Some(value) => Ok(value.clone()),
            None => Err(EvalError::new(format!("Unknown identifier: {}", name))),
        },

        Expr::FunctionCall { name, args } => evaluate_function(name, args, scope, config),

        Expr::BinaryOp { op, left, right } => {
            let left_val = evaluate(left, scope, config)?;
            let right_val = evaluate(right, scope, config)?;
            evaluate_binary_op(op, &left_val, &right_val)
        }

        Expr::UnaryOp { op, operand } => {
            let val = evaluate(operand, scope, config)?;
            evaluate_unary_op(op, &val)
        }
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(op: &str, left: &CellValue, right: &CellValue) -> Result<CellValue, EvalError> {
    match op {
        "+" => {
            // Numeric addition when both sides convert; text concatenation
            // when either side is a string that does not
            if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
                checked_arith(l.checked_add(r))
            } else if matches!(left, CellValue::Text(_)) || matches!(right, CellValue::Text(_)) {
                Ok(CellValue::Text(format!("{}{}", left.as_text(), right.as_text())))
            } else {
                Err(EvalError::new("Operands of '+' must be numbers or text"))
            }
        }
        "-" => {
            let (l, r) = numeric_operands(op, left, right)?;
            checked_arith(l.checked_sub(r))
        }
        "*" => {
            let (l, r) = numeric_operands(op, left, right)?;
            checked_arith(l.checked_mul(r))
        }
        "/" => {
            let (l, r) = numeric_operands(op, left, right)?;
            if r.is_zero() {
                Err(EvalError::new("Division by zero"))
            } else {
                checked_arith(l.checked_div(r))
            }
        }
        "^" => {
            let (l, r) = numeric_operands(op, left, right)?;
            math::power(l, r).map(CellValue::Number)
        }

        // Equality is deliberately loose so numeric and string-typed row
        // data compare sensibly
        "=" => Ok(CellValue::Boolean(loose_equal(left, right))),
        "<>" => Ok(CellValue::Boolean(!loose_equal(left, right))),

        "<" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(CellValue::Boolean(l < r))
        }
        ">" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(CellValue::Boolean(l > r))
        }
        "<=" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(CellValue::Boolean(l <= r))
        }
        ">=" => {
            let (l, r) = numeric_operands(op, left, right)?;
            Ok(CellValue::Boolean(l >= r))
        }

        _ => Err(EvalError::new(format!("Unknown operator: {}", op))),
    }
}

/// Loose cross-type equality: numeric comparison when both operands convert
/// to numbers, boolean identity for booleans, textual comparison otherwise.
fn loose_equal(left: &CellValue, right: &CellValue) -> bool {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return l == r;
    }
    match (left, right) {
        (CellValue::Boolean(l), CellValue::Boolean(r)) => l == r,
        _ => left.as_text() == right.as_text(),
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(op: &str, operand: &CellValue) -> Result<CellValue, EvalError> {
    match op {
        "-" => {
            let n = operand
                .as_number()
                .ok_or_else(|| EvalError::new("Operand of unary '-' must be a number"))?;
            Ok(CellValue::Number(-n))
        }
        _ => Err(EvalError::new(format!("Unknown unary operator: {}", op))),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[Expr],
    scope: &HashMap<String, CellValue>,
    config: &EvaluatorConfig,
) -> Result<CellValue, EvalError> {
    let upper_name = name.to_uppercase();

    // Meta-operations (re-parsing, re-evaluation, differentiation, unit
    // creation) would let a formula alter the evaluation environment; they
    // fail deterministically instead of executing
    if config.disabled_functions.contains(&upper_name) {
        return Err(EvalError::new(format!("Function '{}' is disabled", name)));
    }

    let values: Vec<CellValue> = args
        .iter()
        .map(|arg| evaluate(arg, scope, config))
        .collect::<Result<_, _>>()?;

    match upper_name.as_str() {
        "ABS" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Number(numeric_arg(&upper_name, &values[0])?.abs()))
        }
        "SQRT" => {
            require_args(&upper_name, &values, 1)?;
            math::sqrt(numeric_arg(&upper_name, &values[0])?).map(CellValue::Number)
        }
        "ROUND" => {
            require_args(&upper_name, &values, 2)?;
            let value = numeric_arg(&upper_name, &values[0])?;
            let digits = numeric_arg(&upper_name, &values[1])?;
            math::round(value, digits).map(CellValue::Number)
        }
        "FLOOR" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Number(numeric_arg(&upper_name, &values[0])?.floor()))
        }
        "CEILING" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Number(numeric_arg(&upper_name, &values[0])?.ceil()))
        }
        "MOD" => {
            require_args(&upper_name, &values, 2)?;
            let value = numeric_arg(&upper_name, &values[0])?;
            let divisor = numeric_arg(&upper_name, &values[1])?;
            math::modulo(value, divisor).map(CellValue::Number)
        }
        "POWER" => {
            require_args(&upper_name, &values, 2)?;
            let base = numeric_arg(&upper_name, &values[0])?;
            let exponent = numeric_arg(&upper_name, &values[1])?;
            math::power(base, exponent).map(CellValue::Number)
        }
        "EXP" => {
            require_args(&upper_name, &values, 1)?;
            math::exp(numeric_arg(&upper_name, &values[0])?).map(CellValue::Number)
        }
        "LN" => {
            require_args(&upper_name, &values, 1)?;
            math::ln(numeric_arg(&upper_name, &values[0])?).map(CellValue::Number)
        }
        "LOG" => {
            require_args(&upper_name, &values, 1)?;
            math::log10(numeric_arg(&upper_name, &values[0])?).map(CellValue::Number)
        }
        "MIN" | "MAX" => {
            if values.is_empty() {
                return Err(EvalError::new(format!(
                    "{} requires at least one argument",
                    upper_name
                )));
            }
            let mut numbers = Vec::with_capacity(values.len());
            for value in &values {
                numbers.push(numeric_arg(&upper_name, value)?);
            }
            let result = if upper_name == "MIN" {
                numbers.into_iter().min()
            } else {
                numbers.into_iter().max()
            };
            // Non-empty by the check above
            result
                .map(CellValue::Number)
                .ok_or_else(|| EvalError::new(format!("{}: empty argument list", upper_name)))
        }
        "IF" => {
            require_args(&upper_name, &values, 3)?;
            if truthiness(&values[0])? {
                Ok(values[1].clone())
            } else {
                Ok(values[2].clone())
            }
        }
        "AND" => {
            let mut result = true;
            for value in &values {
                result = result && truthiness(value)?;
            }
            Ok(CellValue::Boolean(result))
        }
        "OR" => {
            let mut result = false;
            for value in &values {
                result = result || truthiness(value)?;
            }
            Ok(CellValue::Boolean(result))
        }
        "NOT" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Boolean(!truthiness(&values[0])?))
        }
        "CONCAT" => Ok(CellValue::Text(text::concat(
            values.iter().map(CellValue::as_text).collect(),
        ))),
        "UPPER" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Text(text::upper(&values[0].as_text())))
        }
        "LOWER" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Text(text::lower(&values[0].as_text())))
        }
        "TRIM" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Text(text::trim(&values[0].as_text())))
        }
        "LEN" => {
            require_args(&upper_name, &values, 1)?;
            Ok(CellValue::Number(text::len(&values[0].as_text())))
        }
        _ => Err(EvalError::new(format!("Unknown function: {}", name))),
    }
}

/// Boolean test for conditions: a boolean, or a number tested against zero
fn truthiness(value: &CellValue) -> Result<bool, EvalError> {
    match value {
        CellValue::Boolean(b) => Ok(*b),
        CellValue::Number(n) => Ok(!n.is_zero()),
        _ => Err(EvalError::new("Condition must be a boolean or a number")),
    }
}

fn require_args(name: &str, values: &[CellValue], expected: usize) -> Result<(), EvalError> {
    if values.len() != expected {
        return Err(EvalError::new(format!(
            "{} expects {} argument(s), got {}",
            name,
            expected,
            values.len()
        )));
    }
    Ok(())
}

fn numeric_arg(name: &str, value: &CellValue) -> Result<Decimal, EvalError> {
    value
        .as_number()
        .ok_or_else(|| EvalError::new(format!("{} requires a numeric argument", name)))
}

fn numeric_operands(
    op: &str,
    left: &CellValue,
    right: &CellValue,
) -> Result<(Decimal, Decimal), EvalError> {
    let l = left
        .as_number()
        .ok_or_else(|| EvalError::new(format!("Left operand of '{}' must be a number", op)))?;
    let r = right
        .as_number()
        .ok_or_else(|| EvalError::new(format!("Right operand of '{}' must be a number", op)))?;
    Ok((l, r))
}

fn checked_arith(result: Option<Decimal>) -> Result<CellValue, EvalError> {
    result
        .map(CellValue::Number)
        .ok_or_else(|| EvalError::new("Numeric overflow"))
}
