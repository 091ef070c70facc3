//! Bindery Binding Engine
//!
//! Declarative data binding for a retained-mode widget tree. Widgets carry
//! string tags naming model methods or expressions; the engine compiles them
//! once and pushes fresh values into widget properties on every update.
//!
//! | tag | property | expects |
//! |---|---|---|
//! | `visible` | `set_visible` | bool |
//! | `disabled` | `set_disabled` | bool |
//! | `text` | `set_text` | String (int is stringified) |
//! | `texture` | `set_texture` | Texture object |
//! | `icon` | `set_icon` | Texture object |
//! | `tooltip` | `set_tooltip` | String (int is stringified) |
//! | `progress` | `set_value_no_signal` | float |
//!
//! Two further tags are special: the event tag (`pressed` by default) wires
//! a button's activation to a model method or expression, and the model tag
//! (`datamodel` by default) appends the widgets returned by a model method as
//! children, once, at attach time.
//!
//! # Failure policy
//!
//! No binding failure ever escapes [`BindEngine::update`]. Each is logged via
//! `tracing`, counted in [`UpdateStats`], and leaves the widget's property at
//! its last good value.

pub mod compiler;
pub mod config;
mod dispatch;
pub mod engine;
pub mod error;
pub mod property;
pub mod registry;
mod scanner;
pub mod wiring;

pub use compiler::{compile, Binding, Compiled, Evaluator};
pub use config::{BindConfig, ConfigError, VisibilityMode};
pub use engine::{BindEngine, EngineStats, UpdateStats};
pub use error::{BindError, ErrorKind};
pub use property::{PropertyKind, PropertySpec};
pub use registry::{BindingRegistry, BindingSet};
pub use wiring::{EventBinding, EventHandler};
