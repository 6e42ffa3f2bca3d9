//! Slot-based inventory kept in memory.

use async_trait::async_trait;
use kits_core::kit::KitItem;
use kits_core::session::{GrantOutcome, PlayerInventory, SubjectId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Default number of slots (hotbar plus backpack).
pub const DEFAULT_CAPACITY: usize = 36;
/// Maximum items per slot.
pub const MAX_STACK: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    item_id: String,
    quantity: u32,
}

/// Reference `PlayerInventory` for the CLI and tests.
///
/// Players must `join` before they count as active. Grants top up existing
/// stacks of the same item first, then fill empty slots; whatever is left
/// is reported back as undelivered.
pub struct InMemoryInventory {
    capacity: usize,
    players: RwLock<HashMap<SubjectId, Vec<Slot>>>,
}

impl InMemoryInventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Marks `subject` online with an empty inventory (keeps an existing one).
    pub async fn join(&self, subject: SubjectId) {
        self.players.write().await.entry(subject).or_default();
    }

    /// Marks `subject` offline and drops their inventory.
    pub async fn leave(&self, subject: &SubjectId) -> bool {
        self.players.write().await.remove(subject).is_some()
    }

    /// Current stacks of `subject`, in slot order.
    pub async fn contents(&self, subject: &SubjectId) -> Vec<KitItem> {
        self.players
            .read()
            .await
            .get(subject)
            .map(|slots| {
                slots
                    .iter()
                    .map(|slot| KitItem::new(slot.item_id.clone(), slot.quantity))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total quantity of `item_id` held by `subject`.
    pub async fn count(&self, subject: &SubjectId, item_id: &str) -> u32 {
        self.contents(subject)
            .await
            .iter()
            .filter(|item| item.item_id == item_id)
            .map(|item| item.quantity)
            .sum()
    }

    /// Adds one stack, returning how many items did not fit.
    fn add(slots: &mut Vec<Slot>, capacity: usize, item: &KitItem) -> u32 {
        let mut left = item.quantity;

        for slot in slots.iter_mut().filter(|s| s.item_id == item.item_id) {
            let room = MAX_STACK.saturating_sub(slot.quantity);
            let moved = room.min(left);
            slot.quantity += moved;
            left -= moved;
            if left == 0 {
                return 0;
            }
        }

        while left > 0 && slots.len() < capacity {
            let moved = left.min(MAX_STACK);
            slots.push(Slot {
                item_id: item.item_id.clone(),
                quantity: moved,
            });
            left -= moved;
        }
        left
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl PlayerInventory for InMemoryInventory {
    async fn is_active(&self, subject: &SubjectId) -> bool {
        self.players.read().await.contains_key(subject)
    }

    async fn grant(&self, subject: &SubjectId, items: &[KitItem]) -> GrantOutcome {
        let mut players = self.players.write().await;
        let Some(slots) = players.get_mut(subject) else {
            return GrantOutcome::Failed {
                reason: format!("{} is not online", subject),
            };
        };

        let requested: u32 = items.iter().map(|item| item.quantity).sum();
        let mut undelivered = Vec::new();
        for item in items {
            let left = Self::add(slots, self.capacity, item);
            if left > 0 {
                undelivered.push(KitItem::new(item.item_id.clone(), left));
            }
        }

        let missing: u32 = undelivered.iter().map(|item| item.quantity).sum();
        if undelivered.is_empty() {
            GrantOutcome::Satisfied
        } else if missing == requested {
            GrantOutcome::Failed {
                reason: "inventory is full".to_string(),
            }
        } else {
            tracing::debug!("[InMemoryInventory] {} short by {} item(s)", subject, missing);
            GrantOutcome::Partial { undelivered }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> SubjectId {
        SubjectId::new("P")
    }

    #[tokio::test]
    async fn test_only_joined_players_are_active() {
        let inventory = InMemoryInventory::default();
        assert!(!inventory.is_active(&player()).await);
        inventory.join(player()).await;
        assert!(inventory.is_active(&player()).await);
        assert!(inventory.leave(&player()).await);
        assert!(!inventory.is_active(&player()).await);
    }

    #[tokio::test]
    async fn test_grant_stacks_and_splits() {
        let inventory = InMemoryInventory::new(4);
        inventory.join(player()).await;

        let outcome = inventory
            .grant(&player(), &[KitItem::new("Plant_Fruit_Apple", 40)])
            .await;
        assert_eq!(outcome, GrantOutcome::Satisfied);

        let outcome = inventory
            .grant(&player(), &[KitItem::new("Plant_Fruit_Apple", 40)])
            .await;
        assert_eq!(outcome, GrantOutcome::Satisfied);

        assert_eq!(inventory.count(&player(), "Plant_Fruit_Apple").await, 80);
        assert_eq!(inventory.contents(&player()).await.len(), 2);
    }

    #[tokio::test]
    async fn test_grant_reports_leftovers() {
        let inventory = InMemoryInventory::new(2);
        inventory.join(player()).await;

        let outcome = inventory
            .grant(
                &player(),
                &[
                    KitItem::new("Weapon_Sword_Iron", 1),
                    KitItem::new("Furniture_Crude_Torch", 100),
                ],
            )
            .await;
        assert_eq!(
            outcome,
            GrantOutcome::Partial {
                undelivered: vec![KitItem::new("Furniture_Crude_Torch", 36)]
            }
        );
    }

    #[tokio::test]
    async fn test_full_inventory_or_offline_player_fails() {
        let inventory = InMemoryInventory::new(1);
        assert!(matches!(
            inventory.grant(&player(), &[KitItem::new("Apple", 1)]).await,
            GrantOutcome::Failed { .. }
        ));

        inventory.join(player()).await;
        inventory.grant(&player(), &[KitItem::new("Stone", 64)]).await;
        assert!(matches!(
            inventory.grant(&player(), &[KitItem::new("Apple", 1)]).await,
            GrantOutcome::Failed { .. }
        ));
    }
}
