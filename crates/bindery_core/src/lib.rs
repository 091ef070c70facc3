//! Bindery Core
//!
//! This crate provides the foundational primitives for the Bindery data-binding
//! engine:
//!
//! - **Values**: dynamically typed results of model calls and expressions
//! - **Objects**: class-aware shared references (textures and friends)
//! - **Models**: objects exposing named methods that bindings call into
//! - **Widget Tree**: a generation-checked arena of retained-mode widgets with
//!   fixed setters, activation signals, and an optional dispatch journal
//!
//! # Example
//!
//! ```rust
//! use bindery_core::{BoundModel, Model, Value, WidgetClass, WidgetSpec, WidgetTree};
//!
//! let mut model = BoundModel::new("Example", String::from("hello?"))
//!     .bind0("GetName", |name: &mut String| name.clone());
//! assert_eq!(model.call("GetName", &[]), Ok(Value::from("hello?")));
//!
//! let mut tree = WidgetTree::new();
//! let root = tree
//!     .instantiate(
//!         None,
//!         &WidgetSpec::new(WidgetClass::Container, "Root")
//!             .child(WidgetSpec::new(WidgetClass::Label, "Title").tag("text", "GetName()")),
//!     )
//!     .unwrap();
//! assert_eq!(tree.children(root).len(), 1);
//! ```

pub mod model;
pub mod object;
pub mod tree;
pub mod value;
pub mod widget;

pub use model::{call_shared, inspect_model, with_model, BoundModel, CallError, Model, SharedModel, WeakModel};
pub use object::{AtlasTexture, Object, ObjectRef, Texture};
pub use tree::{SetterCall, TreeError, WidgetId, WidgetTree};
pub use value::{Value, ValueType, WidgetItem};
pub use widget::{
    Setter, SignalCallback, Widget, WidgetClass, WidgetProps, WidgetSpec, PRESSED_SIGNAL,
};
