//! Bindable widget properties
//!
//! Each [`PropertyKind`] maps to one row of a static table: the tag that
//! declares it, the type (and for objects, the class) a result must have,
//! and the setter that receives it. Dispatch goes through the row's typed
//! apply function; there is no lookup of setters by name.

use std::fmt;

use bindery_core::{Setter, Texture, Value, ValueType, Widget};

/// A widget property a tag can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Visible,
    Disabled,
    Text,
    Texture,
    Icon,
    Tooltip,
    Progress,
}

/// One row of the property table
pub struct PropertySpec {
    pub kind: PropertyKind,
    pub tag: &'static str,
    pub expected_type: ValueType,
    /// Required class for object-typed results
    pub expected_class: Option<&'static str>,
    pub setter: Setter,
    apply: fn(&mut Widget, Value) -> bool,
}

impl PropertySpec {
    /// Hand an already validated value to the widget's setter
    ///
    /// Returns `false` if the value is not of the row's type.
    pub fn apply(&self, widget: &mut Widget, value: Value) -> bool {
        (self.apply)(widget, value)
    }
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("expected_type", &self.expected_type)
            .field("expected_class", &self.expected_class)
            .field("setter", &self.setter)
            .finish()
    }
}

/// Table order is scan order for a widget's property tags
static PROPERTY_TABLE: [PropertySpec; 7] = [
    PropertySpec {
        kind: PropertyKind::Visible,
        tag: "visible",
        expected_type: ValueType::Bool,
        expected_class: None,
        setter: Setter::SetVisible,
        apply: |widget, value| match value {
            Value::Bool(visible) => {
                widget.set_visible(visible);
                true
            }
            _ => false,
        },
    },
    PropertySpec {
        kind: PropertyKind::Disabled,
        tag: "disabled",
        expected_type: ValueType::Bool,
        expected_class: None,
        setter: Setter::SetDisabled,
        apply: |widget, value| match value {
            Value::Bool(disabled) => {
                widget.set_disabled(disabled);
                true
            }
            _ => false,
        },
    },
    PropertySpec {
        kind: PropertyKind::Text,
        tag: "text",
        expected_type: ValueType::String,
        expected_class: None,
        setter: Setter::SetText,
        apply: |widget, value| match value {
            Value::Str(text) => {
                widget.set_text(text);
                true
            }
            _ => false,
        },
    },
    PropertySpec {
        kind: PropertyKind::Texture,
        tag: "texture",
        expected_type: ValueType::Object,
        expected_class: Some(Texture::CLASS),
        setter: Setter::SetTexture,
        apply: |widget, value| match value {
            Value::Object(texture) => {
                widget.set_texture(texture);
                true
            }
            _ => false,
        },
    },
    PropertySpec {
        kind: PropertyKind::Icon,
        tag: "icon",
        expected_type: ValueType::Object,
        expected_class: Some(Texture::CLASS),
        setter: Setter::SetIcon,
        apply: |widget, value| match value {
            Value::Object(icon) => {
                widget.set_icon(icon);
                true
            }
            _ => false,
        },
    },
    PropertySpec {
        kind: PropertyKind::Tooltip,
        tag: "tooltip",
        expected_type: ValueType::String,
        expected_class: None,
        setter: Setter::SetTooltip,
        apply: |widget, value| match value {
            Value::Str(tooltip) => {
                widget.set_tooltip(tooltip);
                true
            }
            _ => false,
        },
    },
    PropertySpec {
        kind: PropertyKind::Progress,
        tag: "progress",
        expected_type: ValueType::Float,
        expected_class: None,
        setter: Setter::SetValueNoSignal,
        apply: |widget, value| match value {
            Value::Float(progress) => {
                widget.set_value_no_signal(progress);
                true
            }
            _ => false,
        },
    },
];

impl PropertyKind {
    /// All kinds, in table order
    pub const ALL: [PropertyKind; 7] = [
        PropertyKind::Visible,
        PropertyKind::Disabled,
        PropertyKind::Text,
        PropertyKind::Texture,
        PropertyKind::Icon,
        PropertyKind::Tooltip,
        PropertyKind::Progress,
    ];

    pub fn spec(self) -> &'static PropertySpec {
        &PROPERTY_TABLE[self as usize]
    }

    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        PROPERTY_TABLE.iter().find(|p| p.tag == tag).map(|p| p.kind)
    }

    /// Iterate the property table
    pub fn table() -> impl Iterator<Item = &'static PropertySpec> {
        PROPERTY_TABLE.iter()
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::WidgetClass;

    #[test]
    fn test_table_matches_kinds() {
        for kind in PropertyKind::ALL {
            assert_eq!(kind.spec().kind, kind);
            assert_eq!(PropertyKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(PropertyKind::from_tag("pressed"), None);
    }

    #[test]
    fn test_expected_types() {
        assert_eq!(PropertyKind::Visible.spec().expected_type, ValueType::Bool);
        assert_eq!(PropertyKind::Text.spec().setter, Setter::SetText);
        assert_eq!(PropertyKind::Icon.spec().expected_class, Some("Texture"));
        assert_eq!(PropertyKind::Progress.spec().setter, Setter::SetValueNoSignal);
        assert_eq!(PropertyKind::Tooltip.spec().expected_class, None);
    }

    #[test]
    fn test_apply_rejects_wrong_variant() {
        let mut label = Widget::new(WidgetClass::Label, "Label");
        let text = PropertyKind::Text.spec();
        assert!(!text.apply(&mut label, Value::Int(3)));
        assert_eq!(label.text(), "");
        assert!(text.apply(&mut label, Value::from("hello?")));
        assert_eq!(label.text(), "hello?");
    }
}
