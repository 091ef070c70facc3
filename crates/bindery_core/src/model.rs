//! Models: objects exposing named methods to bindings
//!
//! A model is the single source of data for one bound widget tree. Bindings
//! never touch model state directly; they only call its methods by name.
//!
//! # Example
//!
//! ```rust
//! use bindery_core::{BoundModel, Model, Value};
//!
//! #[derive(Default)]
//! struct Data {
//!     clicks: i64,
//! }
//!
//! let mut model = BoundModel::new("Counter", Data::default())
//!     .bind0("GetClicks", |d: &mut Data| d.clicks)
//!     .bind0("OnClick", |d: &mut Data| d.clicks += 1)
//!     .bind1("Plus", |d: &mut Data, n: &Value| d.clicks + n.as_int().unwrap_or(0));
//!
//! model.call("OnClick", &[]).unwrap();
//! assert_eq!(model.call("GetClicks", &[]), Ok(Value::Int(1)));
//! assert_eq!(model.call("Plus", &[Value::Int(2)]), Ok(Value::Int(3)));
//! assert_eq!(model.method_arity("Plus"), Some(1));
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::value::{Value, ValueType};

/// Errors raised when calling into a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    /// No method with that name exists on the model
    #[error("method '{0}' does not exist")]
    MissingMethod(String),

    /// The method exists but takes a different number of arguments
    #[error("method '{method}' expects {expected} argument(s), got {actual}")]
    Arity {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// An argument had the wrong type
    #[error("argument {index} of '{method}' is {actual}, expected {expected}")]
    Argument {
        method: String,
        index: usize,
        expected: ValueType,
        actual: ValueType,
    },

    /// The method ran and reported a failure
    #[error("method '{method}' failed: {reason}")]
    Failed { method: String, reason: String },

    /// The model was dropped while something still referenced it
    #[error("model has been released")]
    Released,

    /// The model is already borrowed further up the call stack
    #[error("model is busy (reentrant call)")]
    Busy,
}

/// An object exposing named methods
pub trait Model {
    /// Class name used in diagnostics
    fn class_name(&self) -> &str;

    /// Number of arguments `method` takes, or `None` if it does not exist
    fn method_arity(&self, method: &str) -> Option<usize>;

    fn has_method(&self, method: &str) -> bool {
        self.method_arity(method).is_some()
    }

    /// Invoke `method` with `args`
    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, CallError>;
}

/// Shared model handle, owned by the host
pub type SharedModel = Rc<RefCell<dyn Model>>;

/// Non-owning model handle, held by bindings and event handlers
pub type WeakModel = Weak<RefCell<dyn Model>>;

/// Run `f` with exclusive access to the model behind a weak handle
///
/// Fails with [`CallError::Released`] if the model is gone and with
/// [`CallError::Busy`] if it is already borrowed.
pub fn with_model<R>(
    model: &WeakModel,
    f: impl FnOnce(&mut dyn Model) -> R,
) -> Result<R, CallError> {
    let model = model.upgrade().ok_or(CallError::Released)?;
    let mut guard = model.try_borrow_mut().map_err(|_| CallError::Busy)?;
    Ok(f(&mut *guard))
}

/// Run `f` with shared access to the model behind a weak handle
///
/// Succeeds while the host holds other shared borrows; fails with
/// [`CallError::Busy`] only if the model is mutably borrowed.
pub fn inspect_model<R>(
    model: &WeakModel,
    f: impl FnOnce(&dyn Model) -> R,
) -> Result<R, CallError> {
    let model = model.upgrade().ok_or(CallError::Released)?;
    let guard = model.try_borrow().map_err(|_| CallError::Busy)?;
    Ok(f(&*guard))
}

/// Call a method through a weak model handle
pub fn call_shared(model: &WeakModel, method: &str, args: &[Value]) -> Result<Value, CallError> {
    with_model(model, |m| m.call(method, args))?
}

type MethodFn<T> = Box<dyn Fn(&mut T, &[Value]) -> Result<Value, CallError>>;

struct BoundMethod<T> {
    arity: usize,
    call: MethodFn<T>,
}

/// A model built from user data plus a table of named methods
pub struct BoundModel<T> {
    class_name: String,
    data: T,
    methods: FxHashMap<String, BoundMethod<T>>,
}

impl<T: 'static> BoundModel<T> {
    pub fn new(class_name: impl Into<String>, data: T) -> Self {
        Self {
            class_name: class_name.into(),
            data,
            methods: FxHashMap::default(),
        }
    }

    /// Register a method taking exactly `arity` arguments
    ///
    /// Argument counts are checked before `f` runs. Re-binding a name
    /// replaces the previous method.
    pub fn bind<F>(mut self, name: impl Into<String>, arity: usize, f: F) -> Self
    where
        F: Fn(&mut T, &[Value]) -> Result<Value, CallError> + 'static,
    {
        let name = name.into();
        if self.methods.contains_key(&name) {
            tracing::debug!("Method '{}' rebound on {}", name, self.class_name);
        }
        self.methods.insert(
            name,
            BoundMethod {
                arity,
                call: Box::new(f),
            },
        );
        self
    }

    /// Register a zero-argument method
    pub fn bind0<F, R>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: Into<Value>,
    {
        self.bind(name, 0, move |data, _| Ok(f(data).into()))
    }

    /// Register a one-argument method
    pub fn bind1<F, R>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut T, &Value) -> R + 'static,
        R: Into<Value>,
    {
        self.bind(name, 1, move |data, args| Ok(f(data, &args[0]).into()))
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }
}

impl<T: 'static> Model for BoundModel<T> {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn method_arity(&self, method: &str) -> Option<usize> {
        self.methods.get(method).map(|m| m.arity)
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, CallError> {
        let bound = self
            .methods
            .get(method)
            .ok_or_else(|| CallError::MissingMethod(method.to_string()))?;

        if bound.arity != args.len() {
            return Err(CallError::Arity {
                method: method.to_string(),
                expected: bound.arity,
                actual: args.len(),
            });
        }

        (bound.call)(&mut self.data, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> BoundModel<i64> {
        BoundModel::new("Counter", 0i64)
            .bind0("Get", |n: &mut i64| *n)
            .bind0("Increment", |n: &mut i64| *n += 1)
            .bind("Fail", 0, |_, _| {
                Err(CallError::Failed {
                    method: "Fail".into(),
                    reason: "always".into(),
                })
            })
    }

    #[test]
    fn test_call_and_arity() {
        let mut model = counter();
        assert_eq!(model.call("Increment", &[]), Ok(Value::Nil));
        assert_eq!(model.call("Get", &[]), Ok(Value::Int(1)));
        assert_eq!(
            model.call("Get", &[Value::Int(1)]),
            Err(CallError::Arity {
                method: "Get".into(),
                expected: 0,
                actual: 1
            })
        );
        assert_eq!(
            model.call("Nope", &[]),
            Err(CallError::MissingMethod("Nope".into()))
        );
        assert!(matches!(model.call("Fail", &[]), Err(CallError::Failed { .. })));
    }

    #[test]
    fn test_weak_handle_released() {
        let shared: SharedModel = Rc::new(RefCell::new(counter()));
        let weak = Rc::downgrade(&shared);
        assert_eq!(call_shared(&weak, "Get", &[]), Ok(Value::Int(0)));

        drop(shared);
        assert_eq!(call_shared(&weak, "Get", &[]), Err(CallError::Released));
    }

    #[test]
    fn test_weak_handle_busy() {
        let shared: SharedModel = Rc::new(RefCell::new(counter()));
        let weak = Rc::downgrade(&shared);

        let _guard = shared.borrow_mut();
        assert_eq!(call_shared(&weak, "Get", &[]), Err(CallError::Busy));
        assert_eq!(
            inspect_model(&weak, |m| m.method_arity("Get")),
            Err(CallError::Busy)
        );
    }

    #[test]
    fn test_inspect_alongside_shared_borrow() {
        let shared: SharedModel = Rc::new(RefCell::new(counter()));
        let weak = Rc::downgrade(&shared);

        let _reader = shared.borrow();
        assert_eq!(inspect_model(&weak, |m| m.method_arity("Get")), Ok(Some(0)));
        assert_eq!(call_shared(&weak, "Get", &[]), Err(CallError::Busy));
    }
}
