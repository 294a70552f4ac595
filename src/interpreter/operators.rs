//! Strict arithmetic, comparison and equality. No implicit coercion except
//! that `+` stringifies when either side is a string.

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::value::Value;

pub(super) fn binary(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Result<Value, RuntimeErrorKind> {
    match op {
        BinaryOperator::Equal => Ok(Value::Boolean(left == right)),
        BinaryOperator::NotEqual => Ok(Value::Boolean(left != right)),
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Sub => numeric(op, left, right, |a, b| Ok(a - b)),
        BinaryOperator::Mul => numeric(op, left, right, |a, b| Ok(a * b)),
        BinaryOperator::Div => numeric(op, left, right, |a, b| {
            if b == 0.0 {
                Err(RuntimeErrorKind::DivisionByZero)
            } else {
                Ok(a / b)
            }
        }),
        BinaryOperator::Mod => numeric(op, left, right, |a, b| {
            if b == 0.0 {
                Err(RuntimeErrorKind::ModuloByZero)
            } else {
                Ok(a % b)
            }
        }),
        BinaryOperator::Pow => numeric(op, left, right, |a, b| Ok(a.powf(b))),
        BinaryOperator::Less => compare(op, left, right, |a, b| a < b),
        BinaryOperator::LessEqual => compare(op, left, right, |a, b| a <= b),
        BinaryOperator::Greater => compare(op, left, right, |a, b| a > b),
        BinaryOperator::GreaterEqual => compare(op, left, right, |a, b| a >= b),
    }
}

pub(super) fn unary(op: UnaryOperator, operand: &Value) -> Result<Value, RuntimeErrorKind> {
    match (op, operand) {
        (UnaryOperator::Negate, Value::Number(value)) => Ok(Value::Number(-value)),
        (UnaryOperator::Not, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
        (UnaryOperator::Negate, other) => Err(RuntimeErrorKind::OperandType {
            op: op.symbol(),
            expected: "number",
            found: other.type_name(),
        }),
        (UnaryOperator::Not, other) => Err(RuntimeErrorKind::OperandType {
            op: op.symbol(),
            expected: "boolean",
            found: other.type_name(),
        }),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, RuntimeErrorKind> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::String(format!("{left}{right}")))
        }
        _ => Err(mismatch(BinaryOperator::Add, "number or string", left, right)),
    }
}

fn numeric(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    apply: impl FnOnce(f64, f64) -> Result<f64, RuntimeErrorKind>,
) -> Result<Value, RuntimeErrorKind> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => apply(*a, *b).map(Value::Number),
        _ => Err(mismatch(op, "number", left, right)),
    }
}

fn compare(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    apply: impl FnOnce(f64, f64) -> bool,
) -> Result<Value, RuntimeErrorKind> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(apply(*a, *b))),
        _ => Err(mismatch(op, "number", left, right)),
    }
}

fn mismatch(
    op: BinaryOperator,
    expected: &'static str,
    left: &Value,
    right: &Value,
) -> RuntimeErrorKind {
    RuntimeErrorKind::OperandType {
        op: op.symbol(),
        expected,
        found: format!("{} and {}", left.type_name(), right.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::ErrorCategory;

    fn num(value: f64) -> Value {
        Value::Number(value)
    }

    fn text(value: &str) -> Value {
        Value::String(value.to_string())
    }

    #[test]
    fn arithmetic_on_numbers() {
        assert_eq!(binary(BinaryOperator::Sub, &num(5.0), &num(7.0)).unwrap(), num(-2.0));
        assert_eq!(binary(BinaryOperator::Pow, &num(2.0), &num(10.0)).unwrap(), num(1024.0));
        assert_eq!(binary(BinaryOperator::Mod, &num(-7.0), &num(3.0)).unwrap(), num(-1.0));
    }

    #[test]
    fn plus_concatenates_when_either_side_is_a_string() {
        assert_eq!(binary(BinaryOperator::Add, &text("a"), &num(1.0)).unwrap(), text("a1"));
        assert_eq!(binary(BinaryOperator::Add, &num(2.0), &text("b")).unwrap(), text("2b"));
        let error = binary(BinaryOperator::Add, &num(1.0), &Value::Boolean(true)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Operator '+' expects number or string operands, got number and boolean"
        );
    }

    #[test]
    fn comparisons_require_numbers() {
        assert_eq!(
            binary(BinaryOperator::LessEqual, &num(1.0), &num(1.0)).unwrap(),
            Value::Boolean(true)
        );
        let error = binary(BinaryOperator::Less, &text("a"), &text("b")).unwrap_err();
        assert_eq!(error.category(), ErrorCategory::Type);
    }

    #[test]
    fn division_and_modulo_by_zero_fail() {
        assert_eq!(
            binary(BinaryOperator::Div, &num(1.0), &num(0.0)),
            Err(RuntimeErrorKind::DivisionByZero)
        );
        assert_eq!(
            binary(BinaryOperator::Mod, &num(1.0), &num(0.0)),
            Err(RuntimeErrorKind::ModuloByZero)
        );
    }

    #[test]
    fn unary_operators_are_strict() {
        assert_eq!(unary(UnaryOperator::Negate, &num(3.0)).unwrap(), num(-3.0));
        assert_eq!(
            unary(UnaryOperator::Not, &Value::Boolean(true)).unwrap(),
            Value::Boolean(false)
        );
        assert!(unary(UnaryOperator::Not, &num(0.0)).is_err());
        assert!(unary(UnaryOperator::Negate, &text("1")).is_err());
    }
}
