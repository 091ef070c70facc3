//! Widgets, widget classes, and their fixed setters
//!
//! Each [`WidgetClass`] exposes a fixed set of [`Setter`]s and signals. The
//! binding engine checks [`Widget::exposes`] before every dispatch, so a
//! binding aimed at a property the widget does not have fails cleanly
//! instead of writing into nowhere.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::object::ObjectRef;
use crate::tree::WidgetId;

/// Signal emitted by activatable widgets when they are pressed
pub const PRESSED_SIGNAL: &str = "pressed";

/// Callback connected to a widget signal
///
/// Uses Rc since the UI is single-threaded.
pub type SignalCallback = Rc<dyn Fn()>;

/// The fixed property setters a widget may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setter {
    SetVisible,
    SetDisabled,
    SetText,
    SetTexture,
    SetIcon,
    SetTooltip,
    SetValueNoSignal,
}

impl Setter {
    pub fn name(self) -> &'static str {
        match self {
            Setter::SetVisible => "set_visible",
            Setter::SetDisabled => "set_disabled",
            Setter::SetText => "set_text",
            Setter::SetTexture => "set_texture",
            Setter::SetIcon => "set_icon",
            Setter::SetTooltip => "set_tooltip",
            Setter::SetValueNoSignal => "set_value_no_signal",
        }
    }
}

impl fmt::Display for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Widget classes known to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    /// Plain control: visibility and tooltip only
    Control,
    Container,
    Label,
    Button,
    TextureRect,
    ProgressBar,
}

impl WidgetClass {
    pub fn name(self) -> &'static str {
        match self {
            WidgetClass::Control => "Control",
            WidgetClass::Container => "Container",
            WidgetClass::Label => "Label",
            WidgetClass::Button => "Button",
            WidgetClass::TextureRect => "TextureRect",
            WidgetClass::ProgressBar => "ProgressBar",
        }
    }

    /// Whether widgets of this class expose `setter`
    pub fn exposes(self, setter: Setter) -> bool {
        match setter {
            Setter::SetVisible | Setter::SetTooltip => true,
            Setter::SetText => matches!(self, WidgetClass::Label | WidgetClass::Button),
            Setter::SetDisabled | Setter::SetIcon => self == WidgetClass::Button,
            Setter::SetTexture => self == WidgetClass::TextureRect,
            Setter::SetValueNoSignal => self == WidgetClass::ProgressBar,
        }
    }

    /// Whether widgets of this class emit `signal`
    pub fn emits(self, signal: &str) -> bool {
        self == WidgetClass::Button && signal == PRESSED_SIGNAL
    }
}

impl fmt::Display for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settable widget properties
#[derive(Debug, Clone)]
pub struct WidgetProps {
    pub visible: bool,
    pub disabled: bool,
    pub text: String,
    pub tooltip: String,
    pub texture: Option<ObjectRef>,
    pub icon: Option<ObjectRef>,
    pub value: f64,
}

impl Default for WidgetProps {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
            text: String::new(),
            tooltip: String::new(),
            texture: None,
            icon: None,
            value: 0.0,
        }
    }
}

/// A node in the widget tree
pub struct Widget {
    name: String,
    class: WidgetClass,
    tags: IndexMap<String, String>,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    props: WidgetProps,
    signals: FxHashMap<String, SmallVec<[SignalCallback; 1]>>,
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("tags", &self.tags)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("props", &self.props)
            .field(
                "signals",
                &format!("{} connected", self.signals.values().map(|v| v.len()).sum::<usize>()),
            )
            .finish()
    }
}

impl Widget {
    pub fn new(class: WidgetClass, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class,
            tags: IndexMap::new(),
            parent: None,
            children: Vec::new(),
            props: WidgetProps::default(),
            signals: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> WidgetClass {
        self.class
    }

    /// Replace the widget's class (e.g. a host swapping a widget type in place)
    pub fn set_class(&mut self, class: WidgetClass) {
        self.class = class;
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    /// Authored metadata tags, in authoring order
    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Author a tag (host side; the binding engine only reads tags)
    pub fn set_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn exposes(&self, setter: Setter) -> bool {
        self.class.exposes(setter)
    }

    /// The widget's own visibility flag (ancestors are not considered)
    pub fn is_visible(&self) -> bool {
        self.props.visible
    }

    pub fn is_disabled(&self) -> bool {
        self.props.disabled
    }

    pub fn text(&self) -> &str {
        &self.props.text
    }

    pub fn tooltip(&self) -> &str {
        &self.props.tooltip
    }

    pub fn texture(&self) -> Option<&ObjectRef> {
        self.props.texture.as_ref()
    }

    pub fn icon(&self) -> Option<&ObjectRef> {
        self.props.icon.as_ref()
    }

    pub fn value(&self) -> f64 {
        self.props.value
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.props.visible = visible;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.props.disabled = disabled;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.props.text = text.into();
    }

    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.props.tooltip = tooltip.into();
    }

    pub fn set_texture(&mut self, texture: ObjectRef) {
        self.props.texture = Some(texture);
    }

    pub fn set_icon(&mut self, icon: ObjectRef) {
        self.props.icon = Some(icon);
    }

    /// Set the range value without emitting `value_changed`
    pub fn set_value_no_signal(&mut self, value: f64) {
        self.props.value = value;
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Connect `callback` to `signal`
    ///
    /// Returns `false` (and connects nothing) if this widget's class does not
    /// emit the signal.
    pub fn connect(&mut self, signal: &str, callback: SignalCallback) -> bool {
        if !self.class.emits(signal) {
            return false;
        }
        self.signals
            .entry(signal.to_string())
            .or_default()
            .push(callback);
        true
    }

    /// Number of callbacks connected to `signal`
    pub fn connection_count(&self, signal: &str) -> usize {
        self.signals.get(signal).map_or(0, SmallVec::len)
    }

    pub(crate) fn callbacks(&self, signal: &str) -> SmallVec<[SignalCallback; 1]> {
        self.signals.get(signal).cloned().unwrap_or_default()
    }
}

/// A detached widget description that can be instantiated into a tree
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub class: WidgetClass,
    pub name: String,
    pub tags: IndexMap<String, String>,
    pub children: Vec<WidgetSpec>,
}

impl WidgetSpec {
    pub fn new(class: WidgetClass, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
            tags: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Add a metadata tag
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Add a child description
    pub fn child(mut self, child: WidgetSpec) -> Self {
        self.children.push(child);
        self
    }
}
