use crate::error::{CalcError, CalcResult};
use crate::key::Operator;

/// Apply a binary operator to two operands.
///
/// Fails when either operand is NaN or infinite, or when dividing by zero.
pub fn apply(a: f64, b: f64, op: Operator) -> CalcResult<f64> {
    if !a.is_finite() || !b.is_finite() {
        return Err(CalcError::NonFinite);
    }

    match op {
        Operator::Add => Ok(a + b),
        Operator::Subtract => Ok(a - b),
        Operator::Multiply => Ok(a * b),
        Operator::Divide if b == 0.0 => Err(CalcError::DivisionByZero),
        Operator::Divide => Ok(a / b),
    }
}

/// `value` percent of `base`, e.g. `percent_of(200.0, 10.0) == 20.0`.
pub fn percent_of(base: f64, value: f64) -> f64 {
    base / 100.0 * value
}
