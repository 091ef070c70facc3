//! Tree scanner
//!
//! Walks the subtree under the attach root in depth-first post-order
//! (children before their parent, the root last). The visit order is
//! snapshotted up front and used as a worklist, so widgets appended by
//! model-driven expansion during the walk are never visited by it.
//!
//! Per widget, in order: property tags (table order), the event tag, the
//! model-expansion tag, then registration of the widget's bindings.
//! Expanded children that bring their own model are handed back in
//! [`ScanOutput::nested`] rather than bound here.

use bindery_core::{
    call_shared, inspect_model, Model, SharedModel, Value, WeakModel, WidgetId, WidgetTree,
};

use crate::compiler::{compile, compile_expression, Binding, Compiled, Evaluator};
use crate::config::BindConfig;
use crate::error::BindError;
use crate::property::PropertyKind;
use crate::registry::{BindingRegistry, BindingSet};
use crate::wiring::{wire_event, EventBinding};

/// Everything one scan produced
#[derive(Default)]
pub(crate) struct ScanOutput {
    pub registry: BindingRegistry,
    pub events: Vec<EventBinding>,
    pub diagnostics: Vec<BindError>,
    pub widgets_scanned: usize,
    pub expanded_children: usize,
    /// Expanded children that carry their own model, to be bound separately
    pub nested: Vec<(WidgetId, SharedModel)>,
}

pub(crate) struct Scanner<'a> {
    tree: &'a mut WidgetTree,
    model: &'a WeakModel,
    config: &'a BindConfig,
    output: ScanOutput,
}

impl<'a> Scanner<'a> {
    pub fn new(tree: &'a mut WidgetTree, model: &'a WeakModel, config: &'a BindConfig) -> Self {
        Self {
            tree,
            model,
            config,
            output: ScanOutput::default(),
        }
    }

    /// Scan the subtree under `root`
    pub fn scan(mut self, root: WidgetId) -> Result<ScanOutput, BindError> {
        if !self.tree.contains(root) {
            return Err(BindError::InvalidRoot(root));
        }

        let worklist = self.tree.post_order(root);
        for widget in worklist {
            self.visit(widget);
        }

        tracing::debug!(
            "Scanned {} widget(s) under {}: {} bound, {} binding(s), {} event(s), {} expanded, {} error(s)",
            self.output.widgets_scanned,
            self.tree.path(root),
            self.output.registry.len(),
            self.output.registry.binding_count(),
            self.output.events.len(),
            self.output.expanded_children,
            self.output.diagnostics.len(),
        );
        Ok(self.output)
    }

    fn visit(&mut self, widget: WidgetId) {
        let path = self.tree.path(widget);
        let Some(node) = self.tree.get(widget) else {
            return;
        };
        self.output.widgets_scanned += 1;

        let properties: Vec<(PropertyKind, String)> = PropertyKind::ALL
            .iter()
            .filter_map(|&kind| node.tag(kind.tag()).map(|v| (kind, v.to_string())))
            .collect();
        let event = node.tag(&self.config.event_tag).map(str::to_string);
        let expansion = node.tag(&self.config.model_tag).map(str::to_string);

        let mut set = BindingSet::new(widget, path.clone());
        for (kind, source) in properties {
            set.push(self.compile_property(widget, &path, kind, &source));
        }

        if let Some(source) = event {
            match wire_event(self.tree, widget, &path, &self.config.event_tag, &source, self.model) {
                Ok(Some(binding)) => self.output.events.push(binding),
                Ok(None) => {}
                Err(err) => self.fail(err),
            }
        }

        if let Some(method) = expansion {
            match self.expand(widget, &path, &method) {
                Ok(count) => self.output.expanded_children += count,
                Err(err) => self.fail(err),
            }
        }

        self.output.registry.register(set);
    }

    fn resolve(&self, source: &str) -> Compiled {
        inspect_model(self.model, |m: &dyn Model| compile(source, m)).unwrap_or_else(|err| {
            tracing::debug!("Model unavailable while compiling {:?} ({}); parsing as expression", source, err);
            compile_expression(source)
        })
    }

    fn compile_property(
        &mut self,
        widget: WidgetId,
        path: &str,
        kind: PropertyKind,
        source: &str,
    ) -> Binding {
        let evaluator = match self.resolve(source) {
            Compiled::DirectCall(method) => Evaluator::DirectCall(method),
            Compiled::Expression(expression) => Evaluator::Expression(expression),
            Compiled::Invalid { expression, error } => {
                // Kept: every evaluation fails with NotParsed
                self.fail(BindError::Parse {
                    widget: path.to_string(),
                    tag: kind.tag().to_string(),
                    value: source.to_string(),
                    error,
                });
                Evaluator::Expression(expression)
            }
        };
        Binding::new(widget, kind, evaluator)
    }

    /// One-shot model-driven expansion: call `method` and append every
    /// widget description it returns under `widget`
    fn expand(&mut self, widget: WidgetId, path: &str, method: &str) -> Result<usize, BindError> {
        let tag = self.config.model_tag.clone();
        let failure = |reason: String| BindError::Expansion {
            widget: path.to_string(),
            tag: tag.clone(),
            value: method.to_string(),
            reason,
        };

        let items = match call_shared(self.model, method, &[]) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                return Err(failure(format!("expected Array, got {}", other.value_type())));
            }
            Err(err) => return Err(failure(err.to_string())),
        };

        let mut added = 0;
        for item in items {
            match item {
                Value::Widget(item) => {
                    let child = self
                        .tree
                        .instantiate(Some(widget), &item.spec)
                        .map_err(|err| failure(err.to_string()))?;
                    if let Some(model) = item.model {
                        self.output.nested.push((child, model));
                    }
                    added += 1;
                }
                Value::Nil => {}
                other => tracing::debug!(
                    "{}: skipping {} entry returned by {:?}",
                    path,
                    other.value_type(),
                    method
                ),
            }
        }

        tracing::debug!("{}: expanded {} child(ren) from {:?}", path, added, method);
        Ok(added)
    }

    fn fail(&mut self, err: BindError) {
        err.report();
        self.output.diagnostics.push(err);
    }
}
