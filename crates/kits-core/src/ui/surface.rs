//! Client-side model of a rendered page.

use super::command::{CommandBatch, UiCommand, UiValue};
use super::selector::Selector;
use std::collections::BTreeMap;

/// What a client has on screen after applying command batches.
///
/// Used by tests and by the CLI to show the effect of a frame. Writes to
/// selectors the template does not define are kept like any other; the
/// protocol has no notion of a missing element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiSurface {
    template: Option<String>,
    values: BTreeMap<Selector, UiValue>,
}

impl UiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every command in emission order.
    pub fn apply(&mut self, batch: &CommandBatch) {
        for command in batch.commands() {
            match command {
                UiCommand::Append { template } => {
                    self.template = Some(template.clone());
                }
                UiCommand::Set { selector, value } => {
                    self.values.insert(selector.clone(), value.clone());
                }
            }
        }
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn get(&self, selector: &str) -> Option<&UiValue> {
        let selector = Selector::parse(selector).ok()?;
        self.values.get(&selector)
    }

    pub fn text(&self, selector: &str) -> Option<&str> {
        self.get(selector).and_then(UiValue::as_text)
    }

    pub fn flag(&self, selector: &str) -> Option<bool> {
        self.get(selector).and_then(UiValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Property;

    fn sample_batch() -> CommandBatch {
        let mut batch = CommandBatch::new();
        batch
            .append("Pages/KitsPage.ui")
            .set("BasicStatusLabel", Property::Text, "AVAILABLE")
            .set("BasicStatusLabel", Property::TextColor, "#7dd87d")
            .set("ConfirmPopup", Property::Visible, false)
            .set("BasicStatusLabel", Property::Text, "COOLDOWN: 1m 0s");
        batch
    }

    #[test]
    fn test_later_writes_override_earlier() {
        let mut surface = UiSurface::new();
        surface.apply(&sample_batch());

        assert_eq!(surface.template(), Some("Pages/KitsPage.ui"));
        assert_eq!(surface.text("#BasicStatusLabel.Text"), Some("COOLDOWN: 1m 0s"));
        assert_eq!(surface.flag("#ConfirmPopup.Visible"), Some(false));
        assert_eq!(surface.len(), 3);
    }

    #[test]
    fn test_applying_batch_twice_is_idempotent() {
        let batch = sample_batch();

        let mut once = UiSurface::new();
        once.apply(&batch);

        let mut twice = UiSurface::new();
        twice.apply(&batch);
        twice.apply(&batch);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_selector_is_stored_silently() {
        let mut batch = CommandBatch::new();
        batch.set("NoSuchElement", Property::Text, "hello");

        let mut surface = UiSurface::new();
        surface.apply(&batch);
        assert_eq!(surface.text("#NoSuchElement.Text"), Some("hello"));
        assert!(surface.text("not a selector").is_none());
    }
}
