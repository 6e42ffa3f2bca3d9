//! Page actions and the typed view of a decoded event.

use crate::kit::KitCatalog;
use crate::ui::EventRecord;
use std::collections::HashMap;

pub const KEY_BUTTON: &str = "Button";
pub const KEY_SELECTED_KIT: &str = "@SelectedKit";
pub const KEY_SHOW_POPUP: &str = "@ShowPopup";

const CLAIM_PREFIX: &str = "Claim:";
const CLAIM_SELECTED: &str = "ClaimSelected";
const CLOSE_POPUP: &str = "ClosePopup";

/// Something a button on the kits page asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    /// Claim the kit with this id.
    Claim(String),
    /// Claim whichever kit the selector currently shows.
    ClaimSelected,
    ClosePopup,
}

impl PageAction {
    /// The literal a button sends under [`KEY_BUTTON`].
    pub fn payload(&self) -> String {
        match self {
            PageAction::Claim(kit_id) => format!("{}{}", CLAIM_PREFIX, kit_id),
            PageAction::ClaimSelected => CLAIM_SELECTED.to_string(),
            PageAction::ClosePopup => CLOSE_POPUP.to_string(),
        }
    }
}

/// Button payload -> action, fixed when the page is built.
///
/// Every `Claim:<id>` payload resolves, bound or not, so a claim for a kit
/// missing from the catalog still reaches the page and is rejected there.
/// Other unknown payloads are ignored.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    actions: HashMap<String, PageAction>,
}

impl ActionTable {
    pub fn from_catalog(catalog: &dyn KitCatalog) -> Self {
        let mut table = Self::default();
        for kit in catalog.kits() {
            table.insert(PageAction::Claim(kit.id.clone()));
        }
        table.insert(PageAction::ClaimSelected);
        table.insert(PageAction::ClosePopup);
        table
    }

    fn insert(&mut self, action: PageAction) {
        self.actions.insert(action.payload(), action);
    }

    pub fn resolve(&self, payload: &str) -> Option<PageAction> {
        if let Some(action) = self.actions.get(payload) {
            return Some(action.clone());
        }
        payload
            .strip_prefix(CLAIM_PREFIX)
            .map(|kit_id| PageAction::Claim(kit_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Typed fields of one kits-page event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KitsPageEvent {
    pub button: Option<String>,
    pub selected_kit: Option<String>,
    pub show_popup: Option<bool>,
}

impl From<&EventRecord> for KitsPageEvent {
    fn from(record: &EventRecord) -> Self {
        Self {
            button: record.text(KEY_BUTTON).map(str::to_string),
            selected_kit: record.text(KEY_SELECTED_KIT).map(str::to_string),
            show_popup: record.flag(KEY_SHOW_POPUP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::StaticKitCatalog;

    #[test]
    fn test_table_resolves_payloads() {
        let table = ActionTable::from_catalog(&StaticKitCatalog::default());
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.resolve("Claim:basic"),
            Some(PageAction::Claim("basic".to_string()))
        );
        assert_eq!(table.resolve("ClosePopup"), Some(PageAction::ClosePopup));
        assert!(table.resolve("ClaimBasic").is_none());
    }

    #[test]
    fn test_unknown_claim_ids_still_resolve() {
        let table = ActionTable::from_catalog(&StaticKitCatalog::default());
        assert_eq!(
            table.resolve("Claim:gold"),
            Some(PageAction::Claim("gold".to_string()))
        );
        assert_eq!(table.resolve("Claim:"), Some(PageAction::Claim(String::new())));
    }
}
