//! Inventory collaborator used to deliver kit contents.

use super::identity::SubjectId;
use crate::kit::KitItem;
use async_trait::async_trait;

/// Result of delivering a kit's items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Every stack was delivered.
    Satisfied,
    /// Some stacks (or parts of stacks) did not fit.
    Partial { undelivered: Vec<KitItem> },
    /// Nothing was delivered.
    Failed { reason: String },
}

/// The game-side inventory of active players.
#[async_trait]
pub trait PlayerInventory: Send + Sync {
    /// Whether `subject` is an online player that may open pages.
    async fn is_active(&self, subject: &SubjectId) -> bool;

    /// Adds `items` to the subject's inventory, hotbar first.
    async fn grant(&self, subject: &SubjectId, items: &[KitItem]) -> GrantOutcome;
}
