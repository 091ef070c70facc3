//! Binding compiler
//!
//! A tag value is resolved once, at attach time, into either a direct
//! reference to a zero-argument model method or a parsed expression.

use bindery_core::{call_shared, with_model, Model, Value, ValueType, WeakModel, WidgetId};
use bindery_expr::{EvalError, Expression, ParseError};

use crate::property::PropertyKind;

/// Outcome of resolving a tag value
#[derive(Debug, Clone)]
pub enum Compiled {
    /// Names a zero-argument model method
    DirectCall(String),
    /// A parsed expression
    Expression(Expression),
    /// Neither a zero-argument method nor a parsable expression
    Invalid {
        expression: Expression,
        error: ParseError,
    },
}

/// Resolve `source` against `model`
///
/// Direct-call resolution wins when `source` is exactly the name of a
/// zero-argument method. Anything else is parsed as an expression.
pub fn compile(source: &str, model: &dyn Model) -> Compiled {
    if model.method_arity(source) == Some(0) {
        return Compiled::DirectCall(source.to_string());
    }

    compile_expression(source)
}

/// Resolve `source` as an expression only
pub fn compile_expression(source: &str) -> Compiled {
    let expression = Expression::parse(source);
    match expression.parse_error().cloned() {
        Some(error) => Compiled::Invalid { expression, error },
        None => Compiled::Expression(expression),
    }
}

/// How a binding produces its value
#[derive(Debug, Clone)]
pub enum Evaluator {
    DirectCall(String),
    Expression(Expression),
}

impl Evaluator {
    /// Evaluate with no arguments against the model
    pub fn evaluate(&self, model: &WeakModel) -> Result<Value, EvalError> {
        match self {
            Evaluator::DirectCall(method) => Ok(call_shared(model, method, &[])?),
            Evaluator::Expression(expression) => with_model(model, |m| expression.execute(m))?,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Evaluator::DirectCall(_))
    }

    /// The tag value this evaluator was compiled from
    pub fn source(&self) -> &str {
        match self {
            Evaluator::DirectCall(method) => method,
            Evaluator::Expression(expression) => expression.source(),
        }
    }
}

/// A compiled widget property binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub widget: WidgetId,
    pub kind: PropertyKind,
    pub evaluator: Evaluator,
    pub expected_type: ValueType,
    pub expected_class: Option<&'static str>,
}

impl Binding {
    pub fn new(widget: WidgetId, kind: PropertyKind, evaluator: Evaluator) -> Self {
        let spec = kind.spec();
        Self {
            widget,
            kind,
            evaluator,
            expected_type: spec.expected_type,
            expected_class: spec.expected_class,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{BoundModel, CallError, SharedModel};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn model() -> BoundModel<()> {
        BoundModel::new("Example", ())
            .bind0("GetName", |_: &mut ()| "hello?")
            .bind0("OnButtonClick", |_: &mut ()| ())
            .bind1("Foo", |_: &mut (), n: &Value| n.clone())
    }

    #[test]
    fn test_direct_call_requires_zero_arity() {
        let m = model();
        assert!(matches!(compile("GetName", &m), Compiled::DirectCall(name) if name == "GetName"));
        assert!(matches!(compile("Foo", &m), Compiled::Invalid { .. }));
        assert!(matches!(compile("Foo(1)", &m), Compiled::Expression(_)));
        assert!(matches!(compile("GetName()", &m), Compiled::Expression(_)));
        assert!(matches!(compile("Missing", &m), Compiled::Invalid { .. }));
    }

    #[test]
    fn test_evaluator_through_weak_model() {
        let shared: SharedModel = Rc::new(RefCell::new(model()));
        let weak = Rc::downgrade(&shared);

        let direct = Evaluator::DirectCall("GetName".into());
        assert_eq!(direct.evaluate(&weak), Ok(Value::from("hello?")));

        let expr = Evaluator::Expression(Expression::parse("Foo(2) * 2"));
        assert_eq!(expr.evaluate(&weak), Ok(Value::Int(4)));
        assert_eq!(expr.source(), "Foo(2) * 2");

        drop(shared);
        assert_eq!(
            direct.evaluate(&weak),
            Err(EvalError::Call(CallError::Released))
        );
        assert_eq!(expr.evaluate(&weak), Err(EvalError::Call(CallError::Released)));
    }

    #[test]
    fn test_binding_carries_expectations() {
        let binding = Binding::new(
            WidgetId::default(),
            PropertyKind::Texture,
            Evaluator::DirectCall("GetIcon".into()),
        );
        assert_eq!(binding.expected_type, ValueType::Object);
        assert_eq!(binding.expected_class, Some("Texture"));
        assert_eq!(binding.tag(), "texture");
    }
}
