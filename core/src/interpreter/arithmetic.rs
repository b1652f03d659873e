//! Numeric evaluation over a closed operator set. Operands are already
//! resolved values; nothing here interprets source text.

use super::Value;
use crate::ast::{BinaryOperator, Expr, Literal, UnaryOperator};
use crate::error::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Double(d) => Some(Number::Double(*d)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Double(d) => d,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(n) => Value::Int(n),
            Number::Double(d) => Value::Double(d),
        }
    }
}

/// Apply `+ - * / %` to two numeric values. `expression` names the
/// surrounding expression in error messages.
pub fn apply(
    left: &Value,
    operator: BinaryOperator,
    right: &Value,
    expression: &str,
) -> Result<Value, RuntimeError> {
    let span = tracing::trace_span!("binary_op", op = %operator, lhs = %left, rhs = %right);
    let _enter = span.enter();

    let invalid = || RuntimeError::InvalidArithmetic {
        expression: expression.to_string(),
    };
    let (Some(a), Some(b)) = (Number::from_value(left), Number::from_value(right)) else {
        return Err(invalid());
    };

    let result = match (a, b) {
        (Number::Int(a), Number::Int(b)) => integer_op(a, operator, b, expression)?,
        (a, b) => double_op(a.as_f64(), operator, b.as_f64(), expression)?,
    };

    Ok(result.into())
}

fn integer_op(
    a: i64,
    operator: BinaryOperator,
    b: i64,
    expression: &str,
) -> Result<Number, RuntimeError> {
    let checked = match operator {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => {
            if b == 0 {
                return Err(division_by_zero(expression));
            }
            // Inexact integer division produces a double
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                _ => return Ok(Number::Double(a as f64 / b as f64)),
            }
        }
        BinaryOperator::Modulo => {
            if b == 0 {
                return Err(division_by_zero(expression));
            }
            a.checked_rem(b)
        }
        _ => {
            return Err(RuntimeError::InvalidArithmetic {
                expression: expression.to_string(),
            });
        }
    };

    // Overflow widens to a double
    Ok(checked
        .map(Number::Int)
        .unwrap_or_else(|| double_op_unchecked(a as f64, operator, b as f64)))
}

fn double_op(
    a: f64,
    operator: BinaryOperator,
    b: f64,
    expression: &str,
) -> Result<Number, RuntimeError> {
    match operator {
        BinaryOperator::Divide | BinaryOperator::Modulo if b == 0.0 => {
            Err(division_by_zero(expression))
        }
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo => Ok(double_op_unchecked(a, operator, b)),
        _ => Err(RuntimeError::InvalidArithmetic {
            expression: expression.to_string(),
        }),
    }
}

fn double_op_unchecked(a: f64, operator: BinaryOperator, b: f64) -> Number {
    let result = match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide => a / b,
        BinaryOperator::Modulo => a % b,
        _ => f64::NAN,
    };
    Number::Double(result)
}

fn division_by_zero(expression: &str) -> RuntimeError {
    RuntimeError::DivisionByZero {
        expression: expression.to_string(),
    }
}

pub fn negate(value: &Value, expression: &str) -> Result<Value, RuntimeError> {
    match value {
        Value::Int(n) => Ok(n
            .checked_neg()
            .map(Value::Int)
            .unwrap_or(Value::Double(-(*n as f64)))),
        Value::Double(d) => Ok(Value::Double(-d)),
        _ => Err(RuntimeError::InvalidArithmetic {
            expression: expression.to_string(),
        }),
    }
}

/// Evaluate a purely arithmetic expression, resolving names through
/// `lookup`. Any non-arithmetic node is rejected.
pub fn evaluate<F>(expr: &Expr, lookup: &F) -> Result<Value, RuntimeError>
where
    F: Fn(&str) -> Option<Value>,
{
    match expr {
        Expr::Literal { value } => match value {
            Literal::Integer(n) => Ok(Value::Int(*n)),
            Literal::Decimal(d) => Ok(Value::Double(*d)),
            _ => Err(RuntimeError::InvalidArithmetic {
                expression: expr.to_string(),
            }),
        },
        Expr::Identifier { name } => lookup(name).ok_or_else(|| RuntimeError::UnknownVariable {
            name: name.clone(),
        }),
        Expr::Grouping { inner } => evaluate(inner, lookup),
        Expr::Unary {
            operator: UnaryOperator::Negate,
            operand,
        } => negate(&evaluate(operand, lookup)?, &expr.to_string()),
        Expr::Unary { .. } => Err(RuntimeError::InvalidArithmetic {
            expression: expr.to_string(),
        }),
        Expr::BinaryOp {
            left,
            operator,
            right,
        } => {
            let left = evaluate(left, lookup)?;
            let right = evaluate(right, lookup)?;
            apply(&left, *operator, &right, &expr.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_expression_tokens;

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let expr = parse_expression_tokens(&tokenize(source)).expect("expression should parse");
        evaluate(&expr, &|name| match name {
            "x" => Some(Value::Int(5)),
            "half" => Some(Value::Double(0.5)),
            _ => None,
        })
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(eval("2 + 3 * 4"), Ok(Value::Int(14)));
        assert_eq!(eval("(2 + 3) * 4"), Ok(Value::Int(20)));
        assert_eq!(eval("-x + 1"), Ok(Value::Int(-4)));
    }

    #[test]
    fn test_division_rules() {
        assert_eq!(eval("8 / 2"), Ok(Value::Int(4)));
        assert_eq!(eval("7 / 2"), Ok(Value::Double(3.5)));
        assert_eq!(eval("7 % 4"), Ok(Value::Int(3)));
        assert_eq!(eval("x * half"), Ok(Value::Double(2.5)));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval("x / 0"),
            Err(RuntimeError::DivisionByZero {
                expression: "x / 0".to_string()
            })
        );
        assert!(matches!(
            eval("1.5 % 0.0"),
            Err(RuntimeError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_unknown_name_and_non_numeric_operands() {
        assert_eq!(
            eval("y + 1"),
            Err(RuntimeError::UnknownVariable {
                name: "y".to_string()
            })
        );
        assert!(matches!(
            eval("\"a\" * 2"),
            Err(RuntimeError::InvalidArithmetic { .. })
        ));
    }

    #[test]
    fn test_overflow_widens() {
        assert_eq!(
            apply(&Value::Int(i64::MAX), BinaryOperator::Add, &Value::Int(1), "big"),
            Ok(Value::Double(i64::MAX as f64 + 1.0))
        );
    }
}
