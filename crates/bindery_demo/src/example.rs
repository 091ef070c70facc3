//! The sample model and widget tree

use std::cell::RefCell;
use std::rc::Rc;

use bindery_core::{
    BoundModel, CallError, ObjectRef, SharedModel, Texture, Value, ValueType, WidgetClass,
    WidgetItem, WidgetSpec,
};

/// Model state
pub struct Data {
    pub name: String,
    pub has_something: bool,
    pub clicks: i64,
    pub progress: f64,
    pub icon: ObjectRef,
    pub items: Vec<String>,
    /// Readouts exposed through `GetValue(index)`
    pub values: Vec<i64>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            name: "hello?".to_string(),
            has_something: false,
            clicks: 0,
            progress: 0.0,
            icon: Texture::shared("res://icons/star.png"),
            items: vec!["Iron".to_string(), "Copper".to_string(), "Water".to_string()],
            values: vec![60, 16],
        }
    }
}

pub type ExampleModel = Rc<RefCell<BoundModel<Data>>>;

pub fn model() -> ExampleModel {
    let model = BoundModel::new("DataBindExample", Data::default())
        .bind0("GetName", |d: &mut Data| d.name.clone())
        .bind0("HasSomething", |d: &mut Data| d.has_something)
        .bind0("GetClicks", |d: &mut Data| d.clicks)
        .bind0("GetProgress", |d: &mut Data| d.progress)
        .bind0("GetIcon", |d: &mut Data| d.icon.clone())
        .bind0("OnButtonClick", |d: &mut Data| {
            tracing::info!("Button clicked!!!");
            d.name = "hello!".to_string();
            d.clicks += 1;
            d.progress = (d.progress + 0.25).min(1.0);
            d.has_something = d.clicks >= 2;
        })
        .bind0("GetItems", |d: &mut Data| {
            d.items.iter().map(|name| item(name)).collect::<Vec<_>>()
        })
        .bind("GetValue", 1, |d: &mut Data, args: &[Value]| {
            let index = args[0].as_int().ok_or_else(|| CallError::Argument {
                method: "GetValue".to_string(),
                index: 0,
                expected: ValueType::Int,
                actual: args[0].value_type(),
            })?;
            usize::try_from(index)
                .ok()
                .and_then(|i| d.values.get(i))
                .map(|&v| Value::Int(v))
                .ok_or_else(|| CallError::Failed {
                    method: "GetValue".to_string(),
                    reason: format!("no value at index {}", index),
                })
        });
    Rc::new(RefCell::new(model))
}

/// One row of the item list, bound against its own model
fn item(name: &str) -> WidgetItem {
    let model: SharedModel = Rc::new(RefCell::new(
        BoundModel::new("ItemRow", name.to_string())
            .bind0("GetName", |name: &mut String| name.clone())
            .bind0("GetLength", |name: &mut String| name.chars().count() as i64),
    ));
    let spec = WidgetSpec::new(WidgetClass::Label, name)
        .tag("text", "GetName")
        .tag("tooltip", "GetLength() * 10");
    WidgetItem::bound(spec, model)
}

/// The sample scene
pub fn scene() -> WidgetSpec {
    WidgetSpec::new(WidgetClass::Container, "DataBindExample")
        .child(
            WidgetSpec::new(WidgetClass::Label, "Greeting")
                .tag("visible", "HasSomething() and 1 > 0")
                .tag("text", "GetName()"),
        )
        .child(
            WidgetSpec::new(WidgetClass::Button, "Button")
                .tag("pressed", "OnButtonClick")
                .tag("disabled", "HasSomething()")
                .tag("text", "GetClicks"),
        )
        .child(WidgetSpec::new(WidgetClass::TextureRect, "Icon").tag("texture", "GetIcon()"))
        .child(
            WidgetSpec::new(WidgetClass::ProgressBar, "Progress")
                .tag("progress", "GetProgress")
                .tag("tooltip", "GetClicks() * 25"),
        )
        .child(WidgetSpec::new(WidgetClass::Container, "Items").tag("datamodel", "GetItems"))
        .child(
            WidgetSpec::new(WidgetClass::Label, "Performance")
                .tag("text", "GetValue(0)")
                .tag("tooltip", "GetValue(1) * 2"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_bind::BindEngine;
    use bindery_core::{SharedModel, WidgetTree};

    #[test]
    fn test_sample_scene_binds_cleanly() {
        let model = model();
        let shared: SharedModel = model.clone();
        let mut tree = WidgetTree::new();
        let root = tree.instantiate(None, &scene()).unwrap();

        let mut engine = BindEngine::attach(&shared, &mut tree, root).unwrap();
        assert!(engine.compile_diagnostics().is_empty());
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.stats().expanded_children, 3);
        assert_eq!(engine.stats().nested_engines, 3);

        engine.update(&mut tree);
        assert_eq!(engine.last_update().total_failures(), 0);

        let copper = tree.find(root, "Copper").unwrap();
        assert_eq!(tree.get(copper).unwrap().text(), "Copper");
        assert_eq!(tree.get(copper).unwrap().tooltip(), "60");

        let greeting = tree.find(root, "Greeting").unwrap();
        let performance = tree.find(root, "Performance").unwrap();
        assert!(!tree.get(greeting).unwrap().is_visible());
        assert_eq!(tree.get(performance).unwrap().text(), "60");
        assert_eq!(tree.get(performance).unwrap().tooltip(), "32");
    }

    #[test]
    fn test_two_presses_reveal_greeting_and_disable_button() {
        let model = model();
        let shared: SharedModel = model.clone();
        let mut tree = WidgetTree::new();
        let root = tree.instantiate(None, &scene()).unwrap();
        let mut engine = BindEngine::attach(&shared, &mut tree, root).unwrap();
        let button = tree.find(root, "Button").unwrap();
        let greeting = tree.find(root, "Greeting").unwrap();

        for _ in 0..3 {
            tree.press(button).unwrap();
            engine.update(&mut tree);
        }

        // The third press lands on a disabled button
        assert_eq!(model.borrow().data().clicks, 2);
        assert!(tree.get(button).unwrap().is_disabled());
        assert_eq!(tree.get(button).unwrap().text(), "2");
        assert_eq!(tree.get(greeting).unwrap().text(), "hello!");
    }

    #[test]
    fn test_get_value_out_of_range() {
        use bindery_core::Model;

        let model = model();
        let result = model.borrow_mut().call("GetValue", &[Value::Int(7)]);
        assert!(matches!(result, Err(CallError::Failed { .. })));
    }
}
