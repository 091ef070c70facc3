//! Dynamic values exchanged between models, expressions, and widgets
//!
//! Every model method and every expression produces a [`Value`]. Bindings
//! compare the value's [`ValueType`] against the type a widget property
//! expects before handing it to a setter.

use std::fmt;
use std::rc::Rc;

use crate::model::SharedModel;
use crate::object::ObjectRef;
use crate::widget::WidgetSpec;

/// The runtime type of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Nil,
    Bool,
    Int,
    Float,
    String,
    Object,
    Array,
    Widget,
}

impl ValueType {
    /// Human readable type name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Nil => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "String",
            ValueType::Object => "Object",
            ValueType::Array => "Array",
            ValueType::Widget => "Widget",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(ObjectRef),
    Array(Vec<Value>),
    /// A detached widget, produced by model-expansion methods
    Widget(Box<WidgetItem>),
}

impl Value {
    /// The runtime type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::String,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
            Value::Widget(_) => ValueType::Widget,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; ints are widened to floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Boolean interpretation used by logical operators
    ///
    /// `false`, `0`, `0.0`, `""`, `null` and empty arrays are falsy;
    /// everything else is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Object(_) | Value::Widget(_) => true,
            Value::Array(items) => !items.is_empty(),
        }
    }

    /// Render the value as display text
    pub fn stringify(&self) -> String {
        match self {
            Value::Nil => "<null>".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Str(s) => s.clone(),
            Value::Object(o) => format!("<{}>", o.class_name()),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::stringify).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Widget(item) => format!("<{}:{}>", item.spec.class.name(), item.spec.name),
        }
    }
}

/// A widget description returned from a model-expansion method
///
/// An item carrying its own model is a binding root in its own right: once
/// instantiated, its subtree is bound against that model rather than the
/// model that produced it.
#[derive(Clone)]
pub struct WidgetItem {
    pub spec: WidgetSpec,
    pub model: Option<SharedModel>,
}

impl WidgetItem {
    /// An item with no model; its tags are left unbound
    pub fn new(spec: WidgetSpec) -> Self {
        Self { spec, model: None }
    }

    /// An item whose subtree is bound against `model`
    pub fn bound(spec: WidgetSpec, model: SharedModel) -> Self {
        Self {
            spec,
            model: Some(model),
        }
    }
}

impl fmt::Debug for WidgetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetItem")
            .field("spec", &self.spec)
            .field("bound", &self.model.is_some())
            .finish()
    }
}

impl PartialEq for WidgetItem {
    fn eq(&self, other: &Self) -> bool {
        let same_model = match (&self.model, &other.model) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_model && self.spec == other.spec
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Objects compare by identity
            (Value::Object(a), Value::Object(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Widget(a), Value::Widget(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<Option<ObjectRef>> for Value {
    fn from(value: Option<ObjectRef>) -> Self {
        value.map_or(Value::Nil, Value::Object)
    }
}

impl From<WidgetSpec> for Value {
    fn from(value: WidgetSpec) -> Self {
        Value::Widget(Box::new(WidgetItem::new(value)))
    }
}

impl From<WidgetItem> for Value {
    fn from(value: WidgetItem) -> Self {
        Value::Widget(Box::new(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Texture;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::from(true).value_type(), ValueType::Bool);
        assert_eq!(Value::from(3).value_type(), ValueType::Int);
        assert_eq!(Value::from(0.5).value_type(), ValueType::Float);
        assert_eq!(Value::from("a").value_type(), ValueType::String);
        assert_eq!(Value::Nil.value_type(), ValueType::Nil);
        assert_eq!(Value::from(Texture::shared("icon.png")).value_type(), ValueType::Object);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(Value::from(42).stringify(), "42");
        assert_eq!(Value::from(-7).stringify(), "-7");
        assert_eq!(Value::from(2.0).stringify(), "2.0");
        assert_eq!(Value::from(0.25).stringify(), "0.25");
        assert_eq!(Value::from("hello?").stringify(), "hello?");
        assert_eq!(Value::from(vec![1, 2]).stringify(), "[1, 2]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.truthy());
        assert!(!Value::from(0).truthy());
        assert!(!Value::from("").truthy());
        assert!(Value::from("x").truthy());
        assert!(Value::from(0.1).truthy());
        assert!(Value::from(Texture::shared("a.png")).truthy());
    }

    #[test]
    fn test_widget_items_compare_by_model_identity() {
        use crate::model::BoundModel;
        use crate::widget::WidgetClass;
        use std::cell::RefCell;

        let spec = WidgetSpec::new(WidgetClass::Label, "Item");
        let a: SharedModel = Rc::new(RefCell::new(BoundModel::new("Item", ())));
        let b: SharedModel = Rc::new(RefCell::new(BoundModel::new("Item", ())));

        let bound = Value::from(WidgetItem::bound(spec.clone(), a.clone()));
        assert_eq!(bound, Value::from(WidgetItem::bound(spec.clone(), a)));
        assert_ne!(bound, Value::from(WidgetItem::bound(spec.clone(), b)));
        assert_ne!(bound, Value::from(spec.clone()));
        assert_eq!(bound.stringify(), "<Label:Item>");
    }

    #[test]
    fn test_object_identity_equality() {
        let a = Texture::shared("a.png");
        let b = Texture::shared("a.png");
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }
}
