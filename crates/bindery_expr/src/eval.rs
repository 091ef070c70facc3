//! Expression evaluation against a model

use std::cmp::Ordering;

use bindery_core::{CallError, Model, Value, ValueType};
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::parser::ParseError;

/// Errors raised while evaluating an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The expression was rejected at parse time
    #[error("expression did not parse ({0})")]
    NotParsed(ParseError),

    /// A model call failed
    #[error(transparent)]
    Call(#[from] CallError),

    #[error("operator '{op}' cannot be applied to {lhs} and {rhs}")]
    InvalidOperands {
        op: BinaryOp,
        lhs: ValueType,
        rhs: ValueType,
    },

    #[error("operator '{op}' cannot be applied to {operand}")]
    InvalidOperand { op: UnaryOp, operand: ValueType },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{0}'")]
    Overflow(BinaryOp),

    #[error("integer overflow in negation")]
    NegationOverflow,
}

/// Evaluate `expr` against `model`
///
/// Calls run left to right. Both operands of `and`/`or` are always
/// evaluated, so every call in a formula runs on every evaluation.
pub fn evaluate(expr: &Expr, model: &mut dyn Model) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(lit) => Ok(lit.to_value()),
        Expr::Call { name, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, model))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(model.call(name, &args)?)
        }
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, model)?;
            unary(*op, value)
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, model)?;
            let rhs = evaluate(rhs, model)?;
            binary(*op, lhs, rhs)
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.truthy())),
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::NegationOverflow),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, other) => Err(EvalError::InvalidOperand {
            op,
            operand: other.value_type(),
        }),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => Ok(Value::Bool(lhs.truthy() && rhs.truthy())),
        BinaryOp::Or => Ok(Value::Bool(lhs.truthy() || rhs.truthy())),
        BinaryOp::Eq => Ok(Value::Bool(equals(&lhs, &rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!equals(&lhs, &rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(&lhs, &rhs).ok_or_else(|| invalid(op, &lhs, &rhs))?;
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, lhs, rhs)
        }
    }
}

fn invalid(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::InvalidOperands {
        op,
        lhs: lhs.value_type(),
        rhs: rhs.value_type(),
    }
}

fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        _ => lhs == rhs,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => lhs.as_float()?.partial_cmp(&rhs.as_float()?),
    }
}

fn arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
                BinaryOp::Div => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result.map(Value::Int).ok_or(EvalError::Overflow(op))
        }
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => Ok(Value::Str(a + &b)),
        (lhs, rhs) => match (lhs.as_float(), rhs.as_float()) {
            (Some(a), Some(b)) => Ok(Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            })),
            _ => Err(invalid(op, &lhs, &rhs)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use bindery_core::BoundModel;

    fn model() -> BoundModel<Vec<String>> {
        BoundModel::new("Probe", Vec::new())
            .bind0("HasSomething", |log: &mut Vec<String>| {
                log.push("HasSomething".into());
                false
            })
            .bind0("GetName", |log: &mut Vec<String>| {
                log.push("GetName".into());
                "hello?"
            })
            .bind1("GetValue", |_: &mut Vec<String>, n: &Value| {
                n.as_int().unwrap_or(0) * 10
            })
    }

    fn eval(source: &str, model: &mut dyn Model) -> Result<Value, EvalError> {
        evaluate(&parse(source).unwrap(), model)
    }

    #[test]
    fn test_logic_evaluates_both_sides() {
        let mut m = model();
        assert_eq!(
            eval("HasSomething() and GetName() == 'hello?'", &mut m),
            Ok(Value::Bool(false))
        );
        assert_eq!(m.data().as_slice(), ["HasSomething", "GetName"]);
        assert_eq!(eval("HasSomething() or 1 > 0", &mut m), Ok(Value::Bool(true)));
        assert_eq!(eval("not HasSomething()", &mut m), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_arithmetic() {
        let mut m = model();
        assert_eq!(eval("GetValue(3) + 1", &mut m), Ok(Value::Int(31)));
        assert_eq!(eval("7 / 2", &mut m), Ok(Value::Int(3)));
        assert_eq!(eval("7 % 4", &mut m), Ok(Value::Int(3)));
        assert_eq!(eval("1 + 0.5", &mut m), Ok(Value::Float(1.5)));
        assert_eq!(eval("-(2 * 3)", &mut m), Ok(Value::Int(-6)));
        assert_eq!(
            eval("GetName() + '!'", &mut m),
            Ok(Value::Str("hello?!".into()))
        );
    }

    #[test]
    fn test_arithmetic_errors() {
        let mut m = model();
        assert_eq!(eval("1 / 0", &mut m), Err(EvalError::DivisionByZero));
        assert_eq!(eval("5 % 0", &mut m), Err(EvalError::DivisionByZero));
        assert_eq!(
            eval("9223372036854775807 + 1", &mut m),
            Err(EvalError::Overflow(BinaryOp::Add))
        );
        assert_eq!(
            eval("-(-9223372036854775807 - 1)", &mut m),
            Err(EvalError::NegationOverflow)
        );
        assert_eq!(
            eval("GetName() - 1", &mut m),
            Err(EvalError::InvalidOperands {
                op: BinaryOp::Sub,
                lhs: ValueType::String,
                rhs: ValueType::Int,
            })
        );
        assert!(matches!(
            eval("-GetName()", &mut m),
            Err(EvalError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_comparisons() {
        let mut m = model();
        assert_eq!(eval("1 == 1.0", &mut m), Ok(Value::Bool(true)));
        assert_eq!(eval("2 >= 2.5", &mut m), Ok(Value::Bool(false)));
        assert_eq!(eval("'a' < 'b'", &mut m), Ok(Value::Bool(true)));
        assert_eq!(eval("'1' == 1", &mut m), Ok(Value::Bool(false)));
        assert_eq!(eval("null == null", &mut m), Ok(Value::Bool(true)));
        assert!(matches!(
            eval("true < 1", &mut m),
            Err(EvalError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn test_call_errors_propagate() {
        let mut m = model();
        assert_eq!(
            eval("Missing()", &mut m),
            Err(EvalError::Call(CallError::MissingMethod("Missing".into())))
        );
        assert!(matches!(
            eval("GetValue()", &mut m),
            Err(EvalError::Call(CallError::Arity { .. }))
        ));
    }
}
