//! Binding registry
//!
//! One [`BindingSet`] per bound widget, kept in discovery order (depth-first
//! post-order, children before their parent). Within a set, direct-call
//! bindings run before expression bindings.

use bindery_core::WidgetId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::compiler::Binding;
use crate::property::PropertyKind;

/// All bindings of one widget
#[derive(Debug, Clone)]
pub struct BindingSet {
    widget: WidgetId,
    /// Tree path captured at scan time; stays valid for diagnostics after the
    /// widget is destroyed
    path: String,
    direct: SmallVec<[Binding; 2]>,
    expressions: SmallVec<[Binding; 2]>,
}

impl BindingSet {
    pub fn new(widget: WidgetId, path: impl Into<String>) -> Self {
        Self {
            widget,
            path: path.into(),
            direct: SmallVec::new(),
            expressions: SmallVec::new(),
        }
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Add a binding to the direct-call or expression sub-list
    pub fn push(&mut self, binding: Binding) {
        if binding.evaluator.is_direct() {
            self.direct.push(binding);
        } else {
            self.expressions.push(binding);
        }
    }

    pub fn direct(&self) -> &[Binding] {
        &self.direct
    }

    pub fn expressions(&self) -> &[Binding] {
        &self.expressions
    }

    /// Bindings in evaluation order: direct calls, then expressions
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.direct.iter().chain(self.expressions.iter())
    }

    pub fn get(&self, kind: PropertyKind) -> Option<&Binding> {
        self.iter().find(|b| b.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.direct.len() + self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.expressions.is_empty()
    }
}

/// Bound widgets in discovery order
#[derive(Debug, Default)]
pub struct BindingRegistry {
    sets: Vec<BindingSet>,
    index: FxHashMap<WidgetId, usize>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget's bindings
    ///
    /// Empty sets are not registered. Returns `false` if the set was empty or
    /// the widget is already registered.
    pub fn register(&mut self, set: BindingSet) -> bool {
        if set.is_empty() {
            return false;
        }
        if self.index.contains_key(&set.widget) {
            tracing::debug!("Widget {} already registered; ignoring duplicate", set.path);
            return false;
        }
        self.index.insert(set.widget, self.sets.len());
        self.sets.push(set);
        true
    }

    pub fn get(&self, widget: WidgetId) -> Option<&BindingSet> {
        self.index.get(&widget).map(|&i| &self.sets[i])
    }

    pub fn contains(&self, widget: WidgetId) -> bool {
        self.index.contains_key(&widget)
    }

    /// Sets in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &BindingSet> {
        self.sets.iter()
    }

    /// Number of bound widgets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total bindings across all widgets
    pub fn binding_count(&self) -> usize {
        self.sets.iter().map(BindingSet::len).sum()
    }

    /// Keep only the sets matching `keep`, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&BindingSet) -> bool) {
        self.sets.retain(|set| keep(set));
        self.reindex();
    }

    pub fn clear(&mut self) {
        self.sets.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, set) in self.sets.iter().enumerate() {
            self.index.insert(set.widget, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Evaluator;
    use bindery_core::{WidgetClass, WidgetTree};
    use bindery_expr::Expression;

    fn ids(n: usize) -> (WidgetTree, Vec<WidgetId>) {
        let mut tree = WidgetTree::new();
        let ids = (0..n)
            .map(|i| tree.create(WidgetClass::Label, format!("W{}", i)))
            .collect();
        (tree, ids)
    }

    fn set_with(widget: WidgetId) -> BindingSet {
        let mut set = BindingSet::new(widget, "/W");
        set.push(Binding::new(
            widget,
            PropertyKind::Text,
            Evaluator::Expression(Expression::parse("GetName()")),
        ));
        set.push(Binding::new(
            widget,
            PropertyKind::Visible,
            Evaluator::DirectCall("IsShown".into()),
        ));
        set
    }

    #[test]
    fn test_direct_calls_first() {
        let (_tree, ids) = ids(1);
        let set = set_with(ids[0]);
        let kinds: Vec<PropertyKind> = set.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![PropertyKind::Visible, PropertyKind::Text]);
        assert_eq!(set.direct().len(), 1);
        assert_eq!(set.expressions().len(), 1);
        assert!(set.get(PropertyKind::Text).is_some());
    }

    #[test]
    fn test_register_once_in_order() {
        let (_tree, ids) = ids(3);
        let mut registry = BindingRegistry::new();
        assert!(registry.register(set_with(ids[2])));
        assert!(registry.register(set_with(ids[0])));
        assert!(!registry.register(set_with(ids[0])));
        assert!(!registry.register(BindingSet::new(ids[1], "/W1")));

        let order: Vec<WidgetId> = registry.iter().map(BindingSet::widget).collect();
        assert_eq!(order, vec![ids[2], ids[0]]);
        assert_eq!(registry.binding_count(), 4);
    }

    #[test]
    fn test_retain_reindexes() {
        let (_tree, ids) = ids(3);
        let mut registry = BindingRegistry::new();
        for &id in &ids {
            registry.register(set_with(id));
        }
        registry.retain(|set| set.widget() != ids[0]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains(ids[0]));
        assert_eq!(registry.get(ids[2]).map(BindingSet::widget), Some(ids[2]));
    }
}
