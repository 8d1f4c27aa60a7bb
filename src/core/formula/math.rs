//! Numeric built-ins over `Decimal` values
//! ROUND, SQRT, MOD, POWER, EXP, LN, LOG

use super::evaluator::EvalError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

pub(super) fn sqrt(value: Decimal) -> Result<Decimal, EvalError> {
    value
        .sqrt()
        .ok_or_else(|| EvalError::new("SQRT: cannot take the square root of a negative number"))
}

pub(super) fn round(value: Decimal, digits: Decimal) -> Result<Decimal, EvalError> {
    let dp = digits
        .to_u32()
        .ok_or_else(|| EvalError::new("ROUND: digits must be a non-negative integer"))?;
    Ok(value.round_dp(dp))
}

pub(super) fn modulo(value: Decimal, divisor: Decimal) -> Result<Decimal, EvalError> {
    if divisor.is_zero() {
        return Err(EvalError::new("MOD: division by zero"));
    }
    value
        .checked_rem(divisor)
        .ok_or_else(|| EvalError::new("MOD: numeric overflow"))
}

pub(super) fn power(base: Decimal, exponent: Decimal) -> Result<Decimal, EvalError> {
    base.checked_powd(exponent)
        .ok_or_else(|| EvalError::new("POWER: result out of range"))
}

pub(super) fn exp(value: Decimal) -> Result<Decimal, EvalError> {
    // exp() overflows the 96-bit mantissa past this point
    if value > Decimal::from(66) {
        return Err(EvalError::new("EXP: result out of range"));
    }
    Ok(value.exp())
}

pub(super) fn ln(value: Decimal) -> Result<Decimal, EvalError> {
    if value <= Decimal::ZERO {
        return Err(EvalError::new("LN: argument must be positive"));
    }
    Ok(value.ln())
}

pub(super) fn log10(value: Decimal) -> Result<Decimal, EvalError> {
    if value <= Decimal::ZERO {
        return Err(EvalError::new("LOG: argument must be positive"));
    }
    Ok(value.log10())
}
