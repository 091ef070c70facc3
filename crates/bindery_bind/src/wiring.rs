//! Event wiring
//!
//! Connects a widget's activation signal to a model method or expression,
//! once, at attach time. Handlers are never re-evaluated by the update pass.

use std::rc::Rc;

use bindery_core::{
    call_shared, inspect_model, with_model, Model, WeakModel, WidgetId, WidgetTree,
    PRESSED_SIGNAL,
};
use bindery_expr::{EvalError, Expression};

use crate::compiler::{compile, compile_expression, Compiled};
use crate::error::BindError;

/// What a wired event runs
#[derive(Debug, Clone)]
pub enum EventHandler {
    /// Zero-argument model method
    DirectCall(String),
    /// Expression whose result is discarded
    Expression(Rc<Expression>),
}

impl EventHandler {
    pub fn invoke(&self, model: &WeakModel) -> Result<(), EvalError> {
        match self {
            EventHandler::DirectCall(method) => {
                call_shared(model, method, &[])?;
            }
            EventHandler::Expression(expression) => {
                with_model(model, |m| expression.execute(m))??;
            }
        }
        Ok(())
    }

    pub fn source(&self) -> &str {
        match self {
            EventHandler::DirectCall(method) => method,
            EventHandler::Expression(expression) => expression.source(),
        }
    }
}

/// An activation event connected to a handler
#[derive(Debug, Clone)]
pub struct EventBinding {
    pub widget: WidgetId,
    pub path: String,
    pub event: &'static str,
    pub handler: EventHandler,
}

/// Wire `widget`'s activation signal to `source`
///
/// Returns `Ok(None)` when the widget cannot be activated. An unresolvable
/// `source` is a configuration error and leaves the event unwired.
pub(crate) fn wire_event(
    tree: &mut WidgetTree,
    widget: WidgetId,
    path: &str,
    tag: &str,
    source: &str,
    model: &WeakModel,
) -> Result<Option<EventBinding>, BindError> {
    let Some(node) = tree.get(widget) else {
        return Err(BindError::StaleWidget {
            widget: path.to_string(),
        });
    };
    if !node.class().emits(PRESSED_SIGNAL) {
        tracing::debug!("{}: '{}' ignored, {} cannot be pressed", path, tag, node.class());
        return Ok(None);
    }

    let compiled = inspect_model(model, |m: &dyn Model| compile(source, m))
        .unwrap_or_else(|_| compile_expression(source));
    let handler = match compiled {
        Compiled::DirectCall(method) => EventHandler::DirectCall(method),
        Compiled::Expression(expression) => EventHandler::Expression(Rc::new(expression)),
        Compiled::Invalid { error, .. } => {
            return Err(BindError::Configuration {
                widget: path.to_string(),
                tag: tag.to_string(),
                value: source.to_string(),
                error,
            });
        }
    };

    let callback = {
        let handler = handler.clone();
        let model = model.clone();
        let path = path.to_string();
        Rc::new(move || {
            if let Err(err) = handler.invoke(&model) {
                tracing::warn!(
                    kind = "evaluation",
                    "{}: '{}' handler {:?} failed: {}",
                    path,
                    PRESSED_SIGNAL,
                    handler.source(),
                    err
                );
            }
        })
    };

    if !tree
        .connect(widget, PRESSED_SIGNAL, callback)
        .map_err(|_| BindError::StaleWidget {
            widget: path.to_string(),
        })?
    {
        return Ok(None);
    }

    tracing::debug!("{}: '{}' wired to {:?}", path, tag, handler.source());
    Ok(Some(EventBinding {
        widget,
        path: path.to_string(),
        event: PRESSED_SIGNAL,
        handler,
    }))
}
