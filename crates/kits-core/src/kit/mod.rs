//! Kit domain models and the catalog seam.
//!
//! Kits are the cooldown-gated actions a player can claim from the kits page.
//! Definitions are immutable once a catalog has been built.

mod catalog;
mod model;

pub use catalog::{KitCatalog, StaticKitCatalog, default_kits};
pub use model::{KitDefinition, KitItem};
