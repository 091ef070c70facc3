//! Evaluate a binding and push its result into the widget
//!
//! Every failure leaves the widget's current property value untouched.

use bindery_core::{Value, ValueType, WeakModel, WidgetTree};

use crate::compiler::Binding;
use crate::error::BindError;

/// Run one binding: evaluate, validate, then apply through the fixed setter
pub(crate) fn dispatch(
    binding: &Binding,
    path: &str,
    tree: &mut WidgetTree,
    model: &WeakModel,
) -> Result<(), BindError> {
    let spec = binding.kind.spec();

    let result = binding
        .evaluator
        .evaluate(model)
        .map_err(|error| BindError::Evaluation {
            widget: path.to_string(),
            tag: binding.tag().to_string(),
            value: binding.evaluator.source().to_string(),
            error,
        })?;

    let widget = tree.get(binding.widget).ok_or_else(|| BindError::StaleWidget {
        widget: path.to_string(),
    })?;
    if !widget.exposes(spec.setter) {
        return Err(BindError::MissingSetter {
            widget: path.to_string(),
            tag: binding.tag().to_string(),
            setter: spec.setter,
        });
    }

    let value = coerce(result, binding.expected_type).map_err(|actual| BindError::TypeMismatch {
        widget: path.to_string(),
        tag: binding.tag().to_string(),
        expected: binding.expected_type.name().to_string(),
        actual: actual.name().to_string(),
    })?;

    if let (Some(class), Value::Object(object)) = (binding.expected_class, &value) {
        if !object.is_class(class) {
            return Err(BindError::TypeMismatch {
                widget: path.to_string(),
                tag: binding.tag().to_string(),
                expected: class.to_string(),
                actual: object.class_name().to_string(),
            });
        }
    }

    let journaled = tree.is_journaling().then(|| value.clone());
    let widget = tree.get_mut(binding.widget).ok_or_else(|| BindError::StaleWidget {
        widget: path.to_string(),
    })?;
    if !spec.apply(widget, value) {
        // Only reachable if the table's types and apply fns disagree
        return Err(BindError::MissingSetter {
            widget: path.to_string(),
            tag: binding.tag().to_string(),
            setter: spec.setter,
        });
    }
    if let Some(value) = journaled {
        tree.record(binding.widget, spec.setter, value);
    }
    Ok(())
}

/// Check a result against the expected type
///
/// An int bound to a string property is stringified; every other mismatch
/// returns the actual type.
fn coerce(value: Value, expected: ValueType) -> Result<Value, ValueType> {
    let actual = value.value_type();
    if actual == expected {
        Ok(value)
    } else if expected == ValueType::String && actual == ValueType::Int {
        Ok(Value::Str(value.stringify()))
    } else {
        Err(actual)
    }
}
