pub mod config;
pub mod in_memory_inventory;
pub mod logging;
pub mod toml_kit_catalog;

pub use crate::config::{KitsConfig, PageConfig};
pub use crate::in_memory_inventory::InMemoryInventory;
pub use crate::toml_kit_catalog::TomlKitCatalog;
