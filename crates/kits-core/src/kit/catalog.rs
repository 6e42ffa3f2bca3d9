//! Kit catalog trait and the in-memory implementation.

use super::model::KitDefinition;
use crate::error::{KitsError, Result};
use crate::ui::is_identifier;
use std::collections::{HashMap, HashSet};

/// Read-only source of kit definitions.
///
/// The catalog is built once at startup and shared by every session. Sessions
/// never mutate it; an id that is not in the catalog is reported back to the
/// player as "kit not found".
pub trait KitCatalog: Send + Sync {
    /// All kits in display order.
    fn kits(&self) -> &[KitDefinition];

    /// Looks up a kit by id.
    fn lookup(&self, kit_id: &str) -> Option<&KitDefinition> {
        self.kits().iter().find(|kit| kit.id == kit_id)
    }
}

/// A catalog backed by a validated, fixed list of kits.
#[derive(Debug, Clone)]
pub struct StaticKitCatalog {
    kits: Vec<KitDefinition>,
}

impl StaticKitCatalog {
    /// Builds a catalog, rejecting empty or duplicate ids and empty stacks.
    ///
    /// Each id must also yield a card prefix that is a valid element
    /// identifier and that no other kit shares, since the prefix names the
    /// card's elements in the template.
    pub fn new(kits: Vec<KitDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut prefixes: HashMap<String, &str> = HashMap::new();
        for kit in &kits {
            if kit.id.trim().is_empty() {
                return Err(KitsError::config("kit id must not be empty"));
            }
            if !seen.insert(kit.id.as_str()) {
                return Err(KitsError::config(format!("duplicate kit id '{}'", kit.id)));
            }
            let prefix = kit.card_prefix();
            if !is_identifier(&prefix) {
                return Err(KitsError::config(format!(
                    "kit id '{}' does not form a valid element name ('{}')",
                    kit.id, prefix
                )));
            }
            if let Some(other) = prefixes.insert(prefix.clone(), kit.id.as_str()) {
                return Err(KitsError::config(format!(
                    "kit ids '{}' and '{}' share the element name '{}'",
                    other, kit.id, prefix
                )));
            }
            if let Some(item) = kit.items.iter().find(|item| item.quantity == 0) {
                return Err(KitsError::config(format!(
                    "kit '{}' grants zero of '{}'",
                    kit.id, item.item_id
                )));
            }
        }
        Ok(Self { kits })
    }
}

impl Default for StaticKitCatalog {
    fn default() -> Self {
        Self { kits: default_kits() }
    }
}

impl KitCatalog for StaticKitCatalog {
    fn kits(&self) -> &[KitDefinition] {
        &self.kits
    }
}

/// The kits shipped when no configuration file is present.
pub fn default_kits() -> Vec<KitDefinition> {
    vec![
        KitDefinition::new(
            "basic",
            "Basic Kit",
            "Starter kit with iron tools",
            5 * 60,
            false,
            "Weapon_Sword_Iron",
        )
        .with_item("Weapon_Sword_Iron", 1)
        .with_item("Tool_Pickaxe_Iron", 1)
        .with_item("Tool_Hatchet_Iron", 1)
        .with_item("Plant_Fruit_Apple", 16)
        .with_item("Furniture_Crude_Torch", 32),
        KitDefinition::new(
            "vip",
            "VIP Kit",
            "Exclusive kit with mithril gear",
            3 * 60,
            true,
            "Weapon_Sword_Mithril",
        )
        .with_item("Weapon_Sword_Mithril", 1)
        .with_item("Tool_Pickaxe_Mithril", 1)
        .with_item("Tool_Hatchet_Mithril", 1)
        .with_item("Plant_Fruit_Apple", 64)
        .with_item("Furniture_Crude_Torch", 64),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_lookup() {
        let catalog = StaticKitCatalog::default();
        assert_eq!(catalog.kits().len(), 2);

        let basic = catalog.lookup("basic").unwrap();
        assert_eq!(basic.cooldown_secs, 300);
        assert_eq!(basic.items.len(), 5);
        assert!(!basic.vip);

        let vip = catalog.lookup("vip").unwrap();
        assert_eq!(vip.cooldown_secs, 180);
        assert!(vip.vip);

        assert!(catalog.lookup("gold").is_none());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let kits = vec![
            KitDefinition::new("basic", "A", "", 10, false, "x"),
            KitDefinition::new("basic", "B", "", 10, false, "x"),
        ];
        let err = StaticKitCatalog::new(kits).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_ids_with_colliding_card_prefix() {
        let kits = vec![
            KitDefinition::new("starter_pack", "A", "", 10, false, "x"),
            KitDefinition::new("starter-pack", "B", "", 10, false, "x"),
        ];
        let err = StaticKitCatalog::new(kits).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("StarterPack"));
    }

    #[test]
    fn test_rejects_ids_that_are_not_element_names() {
        for id in ["vip.gold", "gold kit", "__", "vip#1"] {
            let kits = vec![KitDefinition::new(id, "A", "", 10, false, "x")];
            let err = StaticKitCatalog::new(kits).unwrap_err();
            assert!(err.is_config(), "{} should be rejected", id);
        }
        let kits = vec![KitDefinition::new("vip_gold", "A", "", 10, false, "x")];
        assert!(StaticKitCatalog::new(kits).is_ok());
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let kits = vec![KitDefinition::new("basic", "A", "", 10, false, "x").with_item("Apple", 0)];
        assert!(StaticKitCatalog::new(kits).is_err());
    }
}
