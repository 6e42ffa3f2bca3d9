//! UI commands and command batches.

use super::selector::{Property, Selector};
use serde::Serialize;

/// One slot of an item grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSlot {
    pub item_id: String,
    pub quantity: u32,
}

/// One option of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownEntry {
    pub label: String,
    pub value: String,
}

/// A value written to a UI property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UiValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Slots(Vec<ItemSlot>),
    Entries(Vec<DropdownEntry>),
}

impl UiValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UiValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for UiValue {
    fn from(s: &str) -> Self {
        UiValue::Text(s.to_string())
    }
}

impl From<String> for UiValue {
    fn from(s: String) -> Self {
        UiValue::Text(s)
    }
}

impl From<bool> for UiValue {
    fn from(b: bool) -> Self {
        UiValue::Bool(b)
    }
}

impl From<f64> for UiValue {
    fn from(n: f64) -> Self {
        UiValue::Number(n)
    }
}

impl From<Vec<ItemSlot>> for UiValue {
    fn from(slots: Vec<ItemSlot>) -> Self {
        UiValue::Slots(slots)
    }
}

impl From<Vec<DropdownEntry>> for UiValue {
    fn from(entries: Vec<DropdownEntry>) -> Self {
        UiValue::Entries(entries)
    }
}

/// A single UI mutation. Applying the same command twice is a no-op the
/// second time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UiCommand {
    /// Load a layout template by name.
    Append { template: String },
    /// Write one property.
    Set { selector: Selector, value: UiValue },
}

/// An ordered batch of commands sent in one frame.
///
/// Later writes to the same selector win, so batches are applied in emission
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandBatch {
    commands: Vec<UiCommand>,
}

impl CommandBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, template: impl Into<String>) -> &mut Self {
        self.commands.push(UiCommand::Append {
            template: template.into(),
        });
        self
    }

    pub fn set(
        &mut self,
        element: impl Into<String>,
        property: Property,
        value: impl Into<UiValue>,
    ) -> &mut Self {
        self.set_selector(Selector::new(element, property), value)
    }

    fn set_selector(&mut self, selector: Selector, value: impl Into<UiValue>) -> &mut Self {
        self.commands.push(UiCommand::Set {
            selector,
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn commands(&self) -> &[UiCommand] {
        &self.commands
    }

    /// Last value written to `selector` in this batch, if any.
    pub fn value_of(&self, selector: &str) -> Option<&UiValue> {
        self.commands.iter().rev().find_map(|command| match command {
            UiCommand::Set { selector: s, value } if s.to_string() == selector => Some(value),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_serialization_shape() {
        let mut batch = CommandBatch::new();
        batch
            .append("Pages/KitsPage.ui")
            .set("ConfirmPopup", Property::Visible, false)
            .set("BasicKitName", Property::Text, "BASIC KIT");

        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"op": "append", "template": "Pages/KitsPage.ui"},
                {"op": "set", "selector": "#ConfirmPopup.Visible", "value": false},
                {"op": "set", "selector": "#BasicKitName.Text", "value": "BASIC KIT"},
            ])
        );
    }

    #[test]
    fn test_value_of_returns_last_write() {
        let mut batch = CommandBatch::new();
        batch
            .set("BasicStatusLabel", Property::Text, "AVAILABLE")
            .set("BasicStatusLabel", Property::Text, "COOLDOWN: 5m 0s");

        assert_eq!(
            batch.value_of("#BasicStatusLabel.Text").and_then(UiValue::as_text),
            Some("COOLDOWN: 5m 0s")
        );
        assert!(batch.value_of("#VipStatusLabel.Text").is_none());
    }
}
