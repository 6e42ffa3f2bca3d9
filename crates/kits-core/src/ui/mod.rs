//! Remote UI protocol.
//!
//! The server never ships markup. It references a template by name and then
//! drives the client with addressed property writes (`command`), and it
//! declares which client interactions should come back as data events
//! (`event`). `surface` is the client-side model of the result.

mod command;
mod event;
mod selector;
mod surface;

pub use command::{CommandBatch, DropdownEntry, ItemSlot, UiCommand, UiValue};
pub use event::{EventBinding, EventBindings, EventRecord, EventValue, PayloadSource, TriggerKind, ValueKind};
pub use selector::{Property, Selector};
pub(crate) use selector::is_identifier;
pub use surface::UiSurface;
