//! Widget tree management
//!
//! Widgets live in a slotmap arena. A [`WidgetId`] carries a generation, so a
//! handle to a removed widget stays detectably stale even after its slot is
//! reused; every lookup goes through that check.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use thiserror::Error;

use crate::value::Value;
use crate::widget::{Setter, SignalCallback, Widget, WidgetClass, WidgetSpec, PRESSED_SIGNAL};

new_key_type! {
    /// Generation-checked widget handle
    pub struct WidgetId;
}

/// Errors from structural tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The handle refers to a widget that no longer exists
    #[error("widget {0:?} does not exist")]
    Stale(WidgetId),

    /// The child already has a parent
    #[error("widget {0:?} already has a parent")]
    AlreadyParented(WidgetId),

    /// Attaching would make a widget its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: WidgetId, child: WidgetId },
}

/// One recorded setter invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SetterCall {
    pub widget: WidgetId,
    pub setter: Setter,
    pub value: Value,
}

/// Arena-backed widget hierarchy
#[derive(Debug, Default)]
pub struct WidgetTree {
    widgets: SlotMap<WidgetId, Widget>,
    /// Setter journal, only recorded while enabled
    journal: Option<Vec<SetterCall>>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            widgets: SlotMap::with_key(),
            journal: None,
        }
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Create a detached widget
    pub fn create(&mut self, class: WidgetClass, name: impl Into<String>) -> WidgetId {
        self.widgets.insert(Widget::new(class, name))
    }

    /// Append `child` to `parent`'s children
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        if !self.widgets.contains_key(parent) {
            return Err(TreeError::Stale(parent));
        }
        let child_node = self.widgets.get(child).ok_or(TreeError::Stale(child))?;
        if child_node.parent.is_some() {
            return Err(TreeError::AlreadyParented(child));
        }
        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(TreeError::Cycle { parent, child });
        }

        if let Some(node) = self.widgets.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.widgets.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Build widgets from a description, optionally under `parent`
    pub fn instantiate(
        &mut self,
        parent: Option<WidgetId>,
        spec: &WidgetSpec,
    ) -> Result<WidgetId, TreeError> {
        if let Some(parent) = parent {
            if !self.widgets.contains_key(parent) {
                return Err(TreeError::Stale(parent));
            }
        }

        let mut widget = Widget::new(spec.class, spec.name.clone());
        for (name, value) in &spec.tags {
            widget.set_tag(name.clone(), value.clone());
        }
        let id = self.widgets.insert(widget);

        if let Some(parent) = parent {
            self.add_child(parent, id)?;
        }
        for child in &spec.children {
            self.instantiate(Some(id), child)?;
        }
        Ok(id)
    }

    /// Remove a widget and all its descendants
    ///
    /// Outstanding handles to any removed widget become stale.
    pub fn remove(&mut self, id: WidgetId) -> Result<(), TreeError> {
        let parent = self.widgets.get(id).ok_or(TreeError::Stale(id))?.parent;
        if let Some(parent) = parent.and_then(|p| self.widgets.get_mut(p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(widget) = self.widgets.remove(current) {
                stack.extend(widget.children);
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.widgets.get(id).and_then(|w| w.parent)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.widgets.get(id).map_or(&[], |w| w.children.as_slice())
    }

    /// All ancestors of a widget, nearest first
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            result.push(parent);
            current = self.parent(parent);
        }
        result
    }

    /// Find a direct or indirect descendant by name (depth-first)
    pub fn find(&self, root: WidgetId, name: &str) -> Option<WidgetId> {
        self.post_order(root)
            .into_iter()
            .find(|&id| self.widgets.get(id).is_some_and(|w| w.name() == name))
    }

    /// Slash-separated path from the topmost ancestor, e.g. `/Root/Panel/Title`
    ///
    /// Used as the widget's identity in diagnostics.
    pub fn path(&self, id: WidgetId) -> String {
        let Some(widget) = self.widgets.get(id) else {
            return format!("<freed {:?}>", id);
        };

        let mut names: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.widgets.get(a).map(Widget::name))
            .collect();
        names.reverse();
        names.push(widget.name());
        format!("/{}", names.join("/"))
    }

    /// Whether the widget and all its ancestors are visible
    pub fn is_visible_in_tree(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.widgets.get(node) {
                Some(widget) if widget.is_visible() => current = widget.parent,
                _ => return false,
            }
        }
        true
    }

    /// Depth-first post-order listing of `root`'s subtree (children before
    /// their parent, siblings in insertion order), `root` last
    pub fn post_order(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut order = Vec::new();
        if !self.widgets.contains_key(root) {
            return order;
        }

        // (node, children already pushed)
        let mut stack: Vec<(WidgetId, bool)> = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.children(id).iter().rev() {
                stack.push((child, false));
            }
        }
        order
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Connect a callback to a widget signal
    ///
    /// Returns `Ok(false)` if the widget's class does not emit `signal`.
    pub fn connect(
        &mut self,
        id: WidgetId,
        signal: &str,
        callback: SignalCallback,
    ) -> Result<bool, TreeError> {
        let widget = self.widgets.get_mut(id).ok_or(TreeError::Stale(id))?;
        Ok(widget.connect(signal, callback))
    }

    /// Emit `signal` on a widget, invoking every connected callback
    ///
    /// Callbacks are cloned out before running, so a callback may freely
    /// connect further callbacks. Returns the number of callbacks run.
    pub fn emit(&self, id: WidgetId, signal: &str) -> Result<usize, TreeError> {
        let callbacks: SmallVec<[SignalCallback; 1]> = self
            .widgets
            .get(id)
            .ok_or(TreeError::Stale(id))?
            .callbacks(signal);

        for callback in &callbacks {
            callback();
        }
        Ok(callbacks.len())
    }

    /// Simulate a user press: emits `pressed` unless the widget is disabled
    pub fn press(&self, id: WidgetId) -> Result<usize, TreeError> {
        let widget = self.widgets.get(id).ok_or(TreeError::Stale(id))?;
        if widget.is_disabled() {
            tracing::trace!("Ignoring press on disabled widget {}", self.path(id));
            return Ok(0);
        }
        self.emit(id, PRESSED_SIGNAL)
    }

    // =========================================================================
    // JOURNAL
    // =========================================================================

    /// Start recording setter invocations
    pub fn enable_journal(&mut self) {
        self.journal.get_or_insert_with(Vec::new);
    }

    pub fn is_journaling(&self) -> bool {
        self.journal.is_some()
    }

    /// Record a setter invocation (no-op unless journaling)
    pub fn record(&mut self, widget: WidgetId, setter: Setter, value: Value) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(SetterCall {
                widget,
                setter,
                value,
            });
        }
    }

    /// Take all recorded setter calls, leaving the journal enabled but empty
    pub fn take_journal(&mut self) -> Vec<SetterCall> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }
}
