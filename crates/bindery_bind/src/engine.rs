//! Binding engine and update driver
//!
//! [`BindEngine::attach`] scans a widget subtree once, compiling every
//! recognised tag against the model. [`BindEngine::update`] is then called
//! once per tick by the host and re-evaluates every active binding.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use bindery_bind::BindEngine;
//! use bindery_core::{BoundModel, SharedModel, WidgetClass, WidgetSpec, WidgetTree};
//!
//! let model: SharedModel = Rc::new(RefCell::new(
//!     BoundModel::new("Example", ()).bind0("GetName", |_: &mut ()| "hello?"),
//! ));
//!
//! let mut tree = WidgetTree::new();
//! let root = tree
//!     .instantiate(
//!         None,
//!         &WidgetSpec::new(WidgetClass::Container, "Root")
//!             .child(WidgetSpec::new(WidgetClass::Label, "Title").tag("text", "GetName()")),
//!     )
//!     .unwrap();
//!
//! let mut engine = BindEngine::attach(&model, &mut tree, root).unwrap();
//! engine.update(&mut tree);
//!
//! let title = tree.find(root, "Title").unwrap();
//! assert_eq!(tree.get(title).unwrap().text(), "hello?");
//! ```

use std::rc::Rc;

use bindery_core::{SharedModel, WeakModel, WidgetId, WidgetTree};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::{BindConfig, VisibilityMode};
use crate::dispatch::dispatch;
use crate::error::{BindError, ErrorKind};
use crate::property::PropertyKind;
use crate::registry::BindingRegistry;
use crate::scanner::Scanner;
use crate::wiring::EventBinding;

/// Counters for one update pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Bindings evaluated
    pub evaluated: usize,
    /// Setter calls made
    pub applied: usize,
    /// Non-visibility bindings skipped because their widget was hidden
    pub skipped_hidden: usize,
    /// Binding sets dropped because their widget was destroyed
    pub stale_pruned: usize,
    failures: FxHashMap<ErrorKind, usize>,
}

impl UpdateStats {
    pub fn failures(&self, kind: ErrorKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures.values().sum()
    }

    fn record_failure(&mut self, kind: ErrorKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    fn merge(&mut self, other: &UpdateStats) {
        self.evaluated += other.evaluated;
        self.applied += other.applied;
        self.skipped_hidden += other.skipped_hidden;
        self.stale_pruned += other.stale_pruned;
        for (&kind, &count) in &other.failures {
            *self.failures.entry(kind).or_insert(0) += count;
        }
    }
}

/// Engine-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub bound_widgets: usize,
    pub bindings: usize,
    pub direct_bindings: usize,
    pub expression_bindings: usize,
    pub events_wired: usize,
    pub widgets_scanned: usize,
    pub expanded_children: usize,
    /// Engines attached to expanded children that carry their own model
    pub nested_engines: usize,
    pub compile_errors: usize,
    pub updates_run: u64,
}

/// An engine bound to a model-expanded child, with the model it keeps alive
struct NestedEngine {
    model: SharedModel,
    engine: BindEngine,
}

/// Data-binding engine for one widget subtree and one model
pub struct BindEngine {
    model: WeakModel,
    root: WidgetId,
    config: BindConfig,
    registry: BindingRegistry,
    events: Vec<EventBinding>,
    diagnostics: Vec<BindError>,
    nested: Vec<NestedEngine>,
    widgets_scanned: usize,
    expanded_children: usize,
    updates_run: u64,
    last_update: UpdateStats,
}

impl BindEngine {
    /// Scan `root`'s subtree and compile its bindings with the default config
    pub fn attach(
        model: &SharedModel,
        tree: &mut WidgetTree,
        root: WidgetId,
    ) -> Result<Self, BindError> {
        Self::attach_with_config(model, tree, root, BindConfig::default())
    }

    /// Scan `root`'s subtree and compile its bindings
    ///
    /// Fails only if `root` does not exist. Individual binding failures are
    /// logged and available from [`compile_diagnostics`](Self::compile_diagnostics).
    pub fn attach_with_config(
        model: &SharedModel,
        tree: &mut WidgetTree,
        root: WidgetId,
        config: BindConfig,
    ) -> Result<Self, BindError> {
        let mut engine = Self {
            model: Rc::downgrade(model),
            root,
            config,
            registry: BindingRegistry::new(),
            events: Vec::new(),
            diagnostics: Vec::new(),
            nested: Vec::new(),
            widgets_scanned: 0,
            expanded_children: 0,
            updates_run: 0,
            last_update: UpdateStats::default(),
        };
        engine.rebuild(tree)?;
        Ok(engine)
    }

    /// Discard all bindings and scan again from the same root
    ///
    /// Handlers wired by an earlier scan stay connected; widgets carrying an
    /// event tag are wired again.
    pub fn reattach(&mut self, tree: &mut WidgetTree) -> Result<(), BindError> {
        self.detach();
        self.rebuild(tree)
    }

    /// Drop all bindings; `update` becomes a no-op
    pub fn detach(&mut self) {
        self.registry.clear();
        self.events.clear();
        self.diagnostics.clear();
        self.nested.clear();
        self.widgets_scanned = 0;
        self.expanded_children = 0;
    }

    fn rebuild(&mut self, tree: &mut WidgetTree) -> Result<(), BindError> {
        let output = Scanner::new(tree, &self.model, &self.config).scan(self.root)?;
        self.registry = output.registry;
        self.events = output.events;
        self.diagnostics = output.diagnostics;
        self.widgets_scanned = output.widgets_scanned;
        self.expanded_children = output.expanded_children;

        for (child, model) in output.nested {
            match Self::attach_with_config(&model, tree, child, self.config.clone()) {
                Ok(engine) => self.nested.push(NestedEngine { model, engine }),
                Err(err) => {
                    err.report();
                    self.diagnostics.push(err);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Run one update pass
    ///
    /// Widgets are visited in discovery order; within a widget, direct-call
    /// bindings run before expression bindings. The visibility binding always
    /// runs; every other binding runs only while its widget is visible. A
    /// failing binding is logged and skipped, leaving its property unchanged.
    pub fn update(&mut self, tree: &mut WidgetTree) {
        let _span = tracing::trace_span!("bind_update", widgets = self.registry.len()).entered();

        let mut stats = UpdateStats::default();
        let mut stale: SmallVec<[WidgetId; 4]> = SmallVec::new();

        for set in self.registry.iter() {
            if !tree.contains(set.widget()) {
                let err = BindError::StaleWidget {
                    widget: set.path().to_string(),
                };
                err.report();
                stats.record_failure(err.kind());
                stale.push(set.widget());
                continue;
            }

            for binding in set.iter() {
                if binding.kind != PropertyKind::Visible && !self.is_visible(tree, set.widget()) {
                    stats.skipped_hidden += 1;
                    continue;
                }

                stats.evaluated += 1;
                match dispatch(binding, set.path(), tree, &self.model) {
                    Ok(()) => stats.applied += 1,
                    Err(err) => {
                        err.report();
                        stats.record_failure(err.kind());
                    }
                }
            }
        }

        if !stale.is_empty() {
            stats.stale_pruned = stale.len();
            self.registry.retain(|set| !stale.contains(&set.widget()));
        }

        for nested in &mut self.nested {
            nested.engine.update(tree);
            stats.merge(nested.engine.last_update());
        }
        // A nested root that is gone has nothing left to drive
        self.nested.retain(|nested| tree.contains(nested.engine.root()));

        tracing::trace!(
            evaluated = stats.evaluated,
            applied = stats.applied,
            failures = stats.total_failures(),
            "Update pass complete"
        );
        self.updates_run += 1;
        self.last_update = stats;
    }

    fn is_visible(&self, tree: &WidgetTree, widget: WidgetId) -> bool {
        match self.config.visibility {
            VisibilityMode::InTree => tree.is_visible_in_tree(widget),
            VisibilityMode::SelfOnly => tree.get(widget).is_some_and(|w| w.is_visible()),
        }
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn model(&self) -> &WeakModel {
        &self.model
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Events wired by the last scan
    pub fn events(&self) -> &[EventBinding] {
        &self.events
    }

    /// Errors raised while scanning and compiling
    pub fn compile_diagnostics(&self) -> &[BindError] {
        &self.diagnostics
    }

    /// Engines driving expanded children that carry their own model
    pub fn nested(&self) -> impl Iterator<Item = &BindEngine> {
        self.nested.iter().map(|nested| &nested.engine)
    }

    /// Models owned on behalf of expanded children, in expansion order
    pub fn nested_models(&self) -> impl Iterator<Item = &SharedModel> {
        self.nested.iter().map(|nested| &nested.model)
    }

    /// Counters from the most recent update pass, nested engines included
    pub fn last_update(&self) -> &UpdateStats {
        &self.last_update
    }

    pub fn stats(&self) -> EngineStats {
        let direct_bindings = self.registry.iter().map(|s| s.direct().len()).sum();
        let expression_bindings = self.registry.iter().map(|s| s.expressions().len()).sum();
        EngineStats {
            bound_widgets: self.registry.len(),
            bindings: self.registry.binding_count(),
            direct_bindings,
            expression_bindings,
            events_wired: self.events.len(),
            widgets_scanned: self.widgets_scanned,
            expanded_children: self.expanded_children,
            nested_engines: self.nested.len(),
            compile_errors: self.diagnostics.len(),
            updates_run: self.updates_run,
        }
    }
}

impl std::fmt::Debug for BindEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindEngine")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
