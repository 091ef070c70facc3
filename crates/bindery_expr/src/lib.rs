//! Bindery Expressions
//!
//! A small formula language evaluated against a [`Model`]: boolean logic,
//! comparisons and arithmetic over literals and model method calls. There
//! are no variables, loops or assignment.
//!
//! ```rust
//! use bindery_core::{BoundModel, Value};
//! use bindery_expr::Expression;
//!
//! let mut model = BoundModel::new("Example", ()).bind0("HasSomething", |_: &mut ()| false);
//!
//! let expr = Expression::parse("HasSomething() and 1 > 0");
//! assert_eq!(expr.execute(&mut model), Ok(Value::Bool(false)));
//!
//! let broken = Expression::parse("Foo(1");
//! assert!(broken.has_parse_failed());
//! assert!(broken.execute(&mut model).is_err());
//! ```

pub mod ast;
pub mod eval;
pub mod parser;

use std::fmt;

use bindery_core::{Model, Value};

pub use ast::{BinaryOp, Expr, Literal, UnaryOp};
pub use eval::{evaluate, EvalError};
pub use parser::{parse, ParseError};

/// A compiled expression
///
/// Parsing never fails outright: a rejected source is kept together with its
/// parse error, and every later [`execute`](Self::execute) fails with
/// [`EvalError::NotParsed`].
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    compiled: Result<Expr, ParseError>,
}

impl Expression {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = parser::parse(&source);
        if let Err(err) = &compiled {
            tracing::trace!("Expression {:?} rejected: {}", source, err);
        }
        Self { source, compiled }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_parse_failed(&self) -> bool {
        self.compiled.is_err()
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        self.compiled.as_ref().err()
    }

    pub fn ast(&self) -> Option<&Expr> {
        self.compiled.as_ref().ok()
    }

    /// Evaluate against `model`
    pub fn execute(&self, model: &mut dyn Model) -> Result<Value, EvalError> {
        match &self.compiled {
            Ok(expr) => evaluate(expr, model),
            Err(err) => Err(EvalError::NotParsed(err.clone())),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::BoundModel;

    #[test]
    fn test_parse_failure_persists() {
        let mut model = BoundModel::new("Empty", ());
        let expr = Expression::parse("1 +");
        assert!(expr.has_parse_failed());
        assert!(expr.ast().is_none());

        let err = expr.parse_error().cloned().unwrap();
        for _ in 0..2 {
            assert_eq!(expr.execute(&mut model), Err(EvalError::NotParsed(err.clone())));
        }
    }

    #[test]
    fn test_execute_calls_model() {
        let mut model = BoundModel::new("Counter", 0i64).bind0("Tick", |n: &mut i64| {
            *n += 1;
            *n
        });
        let expr = Expression::parse("Tick() + Tick()");
        assert_eq!(expr.execute(&mut model), Ok(Value::Int(3)));
        assert_eq!(*model.data(), 2);
        assert_eq!(expr.to_string(), "Tick() + Tick()");
    }
}
