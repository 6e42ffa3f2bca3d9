//! Kit domain models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single item stack granted by a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitItem {
    /// Game item identifier (e.g. "Weapon_Sword_Iron").
    pub item_id: String,
    /// Number of items in the stack.
    pub quantity: u32,
}

impl KitItem {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }

    /// Short label used under the item icon ("Weapon_Sword_Iron" -> "Sword Iron").
    pub fn short_name(&self) -> String {
        let trimmed = ["Weapon_", "Tool_", "Plant_Fruit_", "Furniture_Crude_"]
            .iter()
            .find_map(|prefix| self.item_id.strip_prefix(prefix))
            .unwrap_or(&self.item_id);
        trimmed.replace('_', " ")
    }
}

/// A claimable kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitDefinition {
    /// Stable identifier, also used as the cooldown ledger key.
    pub id: String,
    /// Name shown on the kit card.
    pub display_name: String,
    /// One-line description shown under the name.
    pub description: String,
    /// Minimum seconds between two claims by the same player.
    pub cooldown_secs: u64,
    /// VIP kits get a distinct button label and message color.
    #[serde(default)]
    pub vip: bool,
    /// Item used as the card icon.
    pub icon_item: String,
    /// Item stacks granted on claim, in display order.
    #[serde(default)]
    pub items: Vec<KitItem>,
}

impl KitDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        cooldown_secs: u64,
        vip: bool,
        icon_item: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            cooldown_secs,
            vip,
            icon_item: icon_item.into(),
            items: Vec::new(),
        }
    }

    /// Builder-style helper for adding an item stack.
    pub fn with_item(mut self, item_id: impl Into<String>, quantity: u32) -> Self {
        self.items.push(KitItem::new(item_id, quantity));
        self
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Element-id prefix of this kit's card in the page template.
    ///
    /// `basic` -> `Basic`, `starter_pack` -> `StarterPack`.
    pub fn card_prefix(&self) -> String {
        self.id
            .split(['_', '-'])
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_prefix() {
        let kit = KitDefinition::new("basic", "Basic", "", 60, false, "Weapon_Sword_Iron");
        assert_eq!(kit.card_prefix(), "Basic");

        let kit = KitDefinition::new("starter_pack", "Starter", "", 60, false, "x");
        assert_eq!(kit.card_prefix(), "StarterPack");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(KitItem::new("Weapon_Sword_Iron", 1).short_name(), "Sword Iron");
        assert_eq!(KitItem::new("Plant_Fruit_Apple", 16).short_name(), "Apple");
        assert_eq!(KitItem::new("Furniture_Crude_Torch", 32).short_name(), "Torch");
        assert_eq!(KitItem::new("Ingredient_Stick", 4).short_name(), "Ingredient Stick");
    }
}
