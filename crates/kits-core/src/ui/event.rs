//! Event bindings and inbound event decoding.
//!
//! A binding tells the client "when this element is activated (or its value
//! changes), send this key". Literal payloads identify buttons; `@`-prefixed
//! keys carry the current value of a property.

use super::selector::Selector;
use crate::error::{KitsError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The client interaction that fires a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerKind {
    Activating,
    ValueChanged,
}

/// Scalar type carried under a payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Number,
    Bool,
}

/// Where the client takes the payload value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PayloadSource {
    /// A fixed string, typically the button's action name.
    Literal(String),
    /// The current value of a property on the client.
    Property(Selector),
}

/// One registered interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBinding {
    pub trigger: TriggerKind,
    /// Target element, as `#ElementId`.
    pub target: String,
    pub key: String,
    pub source: PayloadSource,
    pub kind: ValueKind,
}

/// The bindings a page declared when it was built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventBindings {
    bindings: Vec<EventBinding>,
}

impl EventBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a binding. A key may be bound from several elements but
    /// always with the same value kind; reference keys must start with `@`.
    pub fn bind(&mut self, binding: EventBinding) -> Result<&mut Self> {
        if let PayloadSource::Property(_) = binding.source
            && !binding.key.starts_with('@')
        {
            return Err(KitsError::protocol(format!(
                "value key '{}' must start with '@'",
                binding.key
            )));
        }
        if let Some(kind) = self.kind_of(&binding.key)
            && kind != binding.kind
        {
            return Err(KitsError::protocol(format!(
                "key '{}' already bound as {:?}",
                binding.key, kind
            )));
        }
        self.bindings.push(binding);
        Ok(self)
    }

    /// Binds a button: activating `element` sends `key = action`.
    pub fn bind_action(
        &mut self,
        element: &str,
        key: &str,
        action: impl Into<String>,
    ) -> Result<&mut Self> {
        self.bind(EventBinding {
            trigger: TriggerKind::Activating,
            target: format!("#{}", element),
            key: key.to_string(),
            source: PayloadSource::Literal(action.into()),
            kind: ValueKind::Text,
        })
    }

    /// Binds an input: a value change on `element` sends `key = <selector value>`.
    pub fn bind_value(
        &mut self,
        element: &str,
        key: &str,
        selector: Selector,
        kind: ValueKind,
    ) -> Result<&mut Self> {
        self.bind(EventBinding {
            trigger: TriggerKind::ValueChanged,
            target: format!("#{}", element),
            key: key.to_string(),
            source: PayloadSource::Property(selector),
            kind,
        })
    }

    pub fn bindings(&self) -> &[EventBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.bindings.iter().find(|b| b.key == key).map(|b| b.kind)
    }

    /// Decodes a raw client payload.
    ///
    /// The record holds exactly the bound keys that are present and not null.
    /// Unbound keys are dropped; a bound key with the wrong JSON type is a
    /// protocol error.
    pub fn decode(&self, raw: &Map<String, Value>) -> Result<EventRecord> {
        let mut fields = BTreeMap::new();
        for (key, value) in raw {
            let Some(kind) = self.kind_of(key) else {
                tracing::debug!("Ignoring unbound event key '{}'", key);
                continue;
            };
            let decoded = match (kind, value) {
                (_, Value::Null) => continue,
                (ValueKind::Text, Value::String(s)) => EventValue::Text(s.clone()),
                (ValueKind::Bool, Value::Bool(b)) => EventValue::Bool(*b),
                (ValueKind::Number, Value::Number(n)) => match n.as_f64() {
                    Some(n) => EventValue::Number(n),
                    None => return Err(KitsError::protocol(format!("key '{}' is not a finite number", key))),
                },
                (kind, other) => {
                    return Err(KitsError::protocol(format!(
                        "key '{}' expected {:?}, got {}",
                        key, kind, other
                    )));
                }
            };
            fields.insert(key.clone(), decoded);
        }
        Ok(EventRecord { fields })
    }

    /// Decodes a JSON object given as text.
    pub fn decode_str(&self, raw: &str) -> Result<EventRecord> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(map) => self.decode(&map),
            other => Err(KitsError::protocol(format!("event payload must be an object, got {}", other))),
        }
    }
}

/// A decoded payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// The populated fields of one inbound event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    fields: BTreeMap<String, EventValue>,
}

impl EventRecord {
    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(EventValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key) {
            Some(EventValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(EventValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
