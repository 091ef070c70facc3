//! Binding errors and diagnostics
//!
//! Nothing here is ever returned from the update pass. Every error is
//! reported through `tracing` at the point it occurs and counted in the
//! pass statistics; the offending binding is skipped for that cycle.

use std::fmt;

use bindery_core::{Setter, WidgetId};
use bindery_expr::{EvalError, ParseError};
use thiserror::Error;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Event tag names neither a callable nor a parsable expression
    Configuration,
    /// Property tag failed to parse; the binding stays and always fails
    Parse,
    /// A call or expression failed at runtime
    Evaluation,
    /// Result type or class disagrees with the property
    TypeMismatch,
    /// Widget no longer exposes the target setter
    MissingSetter,
    /// Widget was destroyed
    StaleWidget,
    /// Model-driven child expansion failed
    Expansion,
    /// Attach root does not exist
    InvalidRoot,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Parse => "parse",
            ErrorKind::Evaluation => "evaluation",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::MissingSetter => "missing_setter",
            ErrorKind::StaleWidget => "stale_widget",
            ErrorKind::Expansion => "expansion",
            ErrorKind::InvalidRoot => "invalid_root",
        }
    }

    /// Raised while scanning and compiling, as opposed to per update
    pub fn is_compile_time(self) -> bool {
        matches!(
            self,
            ErrorKind::Configuration
                | ErrorKind::Parse
                | ErrorKind::Expansion
                | ErrorKind::InvalidRoot
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A binding failure
///
/// `widget` fields hold the widget's tree path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("{widget}: '{tag}' = {value:?} is neither a zero-argument method nor a valid expression ({error})")]
    Configuration {
        widget: String,
        tag: String,
        value: String,
        error: ParseError,
    },

    #[error("{widget}: '{tag}' = {value:?} failed to parse ({error})")]
    Parse {
        widget: String,
        tag: String,
        value: String,
        error: ParseError,
    },

    #[error("{widget}: '{tag}' = {value:?} failed to evaluate: {error}")]
    Evaluation {
        widget: String,
        tag: String,
        value: String,
        error: EvalError,
    },

    #[error("{widget}: '{tag}' expected {expected}, got {actual}")]
    TypeMismatch {
        widget: String,
        tag: String,
        expected: String,
        actual: String,
    },

    #[error("{widget}: '{tag}' target does not expose {setter}")]
    MissingSetter {
        widget: String,
        tag: String,
        setter: Setter,
    },

    #[error("{widget}: widget no longer exists, dropping its bindings")]
    StaleWidget { widget: String },

    #[error("{widget}: '{tag}' = {value:?} expansion failed: {reason}")]
    Expansion {
        widget: String,
        tag: String,
        value: String,
        reason: String,
    },

    #[error("attach root {0:?} does not exist")]
    InvalidRoot(WidgetId),
}

impl BindError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::Configuration { .. } => ErrorKind::Configuration,
            BindError::Parse { .. } => ErrorKind::Parse,
            BindError::Evaluation { .. } => ErrorKind::Evaluation,
            BindError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            BindError::MissingSetter { .. } => ErrorKind::MissingSetter,
            BindError::StaleWidget { .. } => ErrorKind::StaleWidget,
            BindError::Expansion { .. } => ErrorKind::Expansion,
            BindError::InvalidRoot(_) => ErrorKind::InvalidRoot,
        }
    }

    /// Log the error: compile-time kinds at error, per-update kinds at warn
    pub fn report(&self) {
        let kind = self.kind();
        if kind.is_compile_time() {
            tracing::error!(kind = kind.name(), "{}", self);
        } else {
            tracing::warn!(kind = kind.name(), "{}", self);
        }
    }
}
