//! Operator semantics.
//!
//! Arithmetic always works on floats, even for two integers: `1 + 2` is
//! `3.0`. Relational operators compare as floats. Equality never coerces.

use super::value::Value;
use crate::parser::Operator;

/// The operand that made an operator fail its numeric requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Operand {
    Left,
    Right,
}

pub(super) fn binary(op: Operator, lhs: &Value, rhs: &Value) -> Result<Value, Operand> {
    let value = match op {
        Operator::Or => Value::Boolean(lhs.is_truthy() || rhs.is_truthy()),
        Operator::And => Value::Boolean(lhs.is_truthy() && rhs.is_truthy()),
        Operator::Equal => Value::Boolean(lhs == rhs),
        Operator::NotEqual => Value::Boolean(lhs != rhs),
        Operator::Plus => arithmetic(lhs, rhs, |l, r| l + r)?,
        Operator::Minus => arithmetic(lhs, rhs, |l, r| l - r)?,
        Operator::Times => arithmetic(lhs, rhs, |l, r| l * r)?,
        Operator::Divide => arithmetic(lhs, rhs, |l, r| l / r)?,
        Operator::LessThan => relational(lhs, rhs, |l, r| l < r)?,
        Operator::LessThanEqual => relational(lhs, rhs, |l, r| l <= r)?,
        Operator::GreaterThan => relational(lhs, rhs, |l, r| l > r)?,
        Operator::GreaterThanEqual => relational(lhs, rhs, |l, r| l >= r)?,
        Operator::Not => unreachable!("'!' is a prefix operator"),
    };
    Ok(value)
}

/// Returns `None` when the operand is not numeric for `-`.
pub(super) fn unary(op: Operator, operand: &Value) -> Option<Value> {
    match op {
        Operator::Not => Some(Value::Boolean(!operand.is_truthy())),
        Operator::Minus => operand.as_float().map(|f| Value::Float(-f)),
        _ => unreachable!("'{op}' is not a prefix operator"),
    }
}

fn numeric(lhs: &Value, rhs: &Value) -> Result<(f64, f64), Operand> {
    let l = lhs.as_float().ok_or(Operand::Left)?;
    let r = rhs.as_float().ok_or(Operand::Right)?;
    Ok((l, r))
}

fn arithmetic(lhs: &Value, rhs: &Value, op: impl Fn(f64, f64) -> f64) -> Result<Value, Operand> {
    numeric(lhs, rhs).map(|(l, r)| Value::Float(op(l, r)))
}

fn relational(lhs: &Value, rhs: &Value, op: impl Fn(f64, f64) -> bool) -> Result<Value, Operand> {
    numeric(lhs, rhs).map(|(l, r)| Value::Boolean(op(l, r)))
}
