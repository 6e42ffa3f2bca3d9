//! Selector grammar: `#Element.Property` or `#Element.Nested.Property`.

use crate::error::{KitsError, Result};
use serde::Serialize;
use std::fmt;

/// The closed set of properties the core writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Property {
    Text,
    Value,
    Visible,
    TextColor,
    Slots,
    Entries,
}

impl Property {
    /// Property path as it appears after the element id.
    pub fn path(self) -> &'static str {
        match self {
            Property::Text => "Text",
            Property::Value => "Value",
            Property::Visible => "Visible",
            Property::TextColor => "Style.TextColor",
            Property::Slots => "Slots",
            Property::Entries => "Entries",
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        match path {
            "Text" => Some(Property::Text),
            "Value" => Some(Property::Value),
            "Visible" => Some(Property::Visible),
            "Style.TextColor" => Some(Property::TextColor),
            "Slots" => Some(Property::Slots),
            "Entries" => Some(Property::Entries),
            _ => None,
        }
    }
}

/// Address of one property of one template element.
///
/// Element ids are opaque: the core does not know which ids the template
/// defines, and a write to an id the template lacks is simply ignored by the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct Selector {
    element: String,
    property: Property,
}

pub(crate) fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Selector {
    pub fn new(element: impl Into<String>, property: Property) -> Self {
        Self {
            element: element.into(),
            property,
        }
    }

    /// Parses `#Element.Property`, rejecting unknown properties and bad ids.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = raw
            .strip_prefix('#')
            .ok_or_else(|| KitsError::protocol(format!("selector '{}' must start with '#'", raw)))?;
        let (element, path) = body
            .split_once('.')
            .ok_or_else(|| KitsError::protocol(format!("selector '{}' has no property", raw)))?;
        if !is_identifier(element) {
            return Err(KitsError::protocol(format!("selector '{}' has an invalid element id", raw)));
        }
        let property = Property::parse(path)
            .ok_or_else(|| KitsError::protocol(format!("selector '{}' has unknown property '{}'", raw, path)))?;
        Ok(Self::new(element, property))
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn property(&self) -> Property {
        self.property
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.element, self.property.path())
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_and_nested() {
        let s = Selector::parse("#BasicKitName.Text").unwrap();
        assert_eq!(s.element(), "BasicKitName");
        assert_eq!(s.property(), Property::Text);

        let s = Selector::parse("#BasicStatusLabel.Style.TextColor").unwrap();
        assert_eq!(s.property(), Property::TextColor);
        assert_eq!(s.to_string(), "#BasicStatusLabel.Style.TextColor");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Selector::parse("BasicKitName.Text").is_err());
        assert!(Selector::parse("#BasicKitName").is_err());
        assert!(Selector::parse("#Basic Kit.Text").is_err());
        assert!(Selector::parse("#BasicKitName.Color").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let s = Selector::new("ConfirmPopup", Property::Visible);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"#ConfirmPopup.Visible\"");
    }
}
