//! The kits page: rendering, event handling and the claim flow.

use super::action::{ActionTable, KEY_BUTTON, KEY_SELECTED_KIT, KEY_SHOW_POPUP, KitsPageEvent, PageAction};
use super::frame::ChatMessage;
use super::identity::SubjectId;
use super::inventory::{GrantOutcome, PlayerInventory};
use super::settings::PageSettings;
use crate::cooldown::{CooldownLedger, format_cooldown_label, format_remaining, remaining_secs};
use crate::error::{KitsError, Result};
use crate::kit::{KitCatalog, KitDefinition};
use crate::ui::{
    CommandBatch, DropdownEntry, EventBindings, EventRecord, ItemSlot, Property, Selector, ValueKind,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Item rows per kit card in the template.
pub const MAX_ITEM_SLOTS: usize = 5;

pub const COLOR_AVAILABLE: &str = "#7dd87d";
pub const COLOR_COOLDOWN: &str = "#d87d7d";

const POPUP: &str = "ConfirmPopup";
const POPUP_TITLE: &str = "PopupTitle";
const POPUP_MESSAGE: &str = "PopupMessage";
const POPUP_CLOSE: &str = "BtnPopupClose";
const POPUP_TOGGLE: &str = "PopupToggle";
const KIT_SELECTOR: &str = "KitSelector";
const CLAIM_SELECTED: &str = "BtnClaimSelected";

/// How a claim attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Granted { kit_id: String },
    /// Delivered with leftovers; the cooldown still applies.
    GrantedPartially(KitsError),
    Rejected(KitsError),
}

impl ClaimOutcome {
    pub fn is_granted(&self) -> bool {
        !matches!(self, ClaimOutcome::Rejected(_))
    }
}

/// Result of handling one event: what to push and what to say.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageUpdate {
    pub commands: CommandBatch,
    pub messages: Vec<ChatMessage>,
    pub outcome: Option<ClaimOutcome>,
}

/// The three status fields of one kit card, as last sent.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderedStatus {
    label: String,
    color: &'static str,
    button: String,
}

/// Mutable UI state of one open page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub popup_visible: bool,
    /// Whether a successful claim opens the confirmation popup.
    pub popup_on_claim: bool,
    pub selected_kit: Option<String>,
    pub last_claimed_kit: Option<String>,
    rendered: HashMap<String, RenderedStatus>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            popup_visible: false,
            popup_on_claim: true,
            selected_kit: None,
            last_claimed_kit: None,
            rendered: HashMap::new(),
        }
    }
}

/// One subject's kits page.
///
/// Owned by a single session task; nothing here is shared except the ledger,
/// catalog and inventory handles.
pub struct KitsPage {
    subject: SubjectId,
    catalog: Arc<dyn KitCatalog>,
    ledger: Arc<CooldownLedger>,
    inventory: Arc<dyn PlayerInventory>,
    settings: PageSettings,
    actions: ActionTable,
    state: PageState,
}

impl KitsPage {
    pub fn new(
        subject: SubjectId,
        catalog: Arc<dyn KitCatalog>,
        ledger: Arc<CooldownLedger>,
        inventory: Arc<dyn PlayerInventory>,
        settings: PageSettings,
    ) -> Self {
        let actions = ActionTable::from_catalog(catalog.as_ref());
        Self {
            subject,
            catalog,
            ledger,
            inventory,
            settings,
            actions,
            state: PageState::default(),
        }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Full initial render plus the bindings the client must register.
    pub fn build(&mut self) -> Result<(CommandBatch, EventBindings)> {
        let mut batch = CommandBatch::new();
        batch.append(self.settings.template.clone());

        let kits = self.catalog.kits().to_vec();
        for kit in &kits {
            self.render_card(&mut batch, kit);
        }

        if self.state.selected_kit.is_none() {
            self.state.selected_kit = kits.first().map(|kit| kit.id.clone());
        }
        let entries: Vec<DropdownEntry> = kits
            .iter()
            .map(|kit| DropdownEntry {
                label: kit.display_name.clone(),
                value: kit.id.clone(),
            })
            .collect();
        batch.set(KIT_SELECTOR, Property::Entries, entries);
        if let Some(selected) = &self.state.selected_kit {
            batch.set(KIT_SELECTOR, Property::Value, selected.clone());
        }
        batch.set(POPUP_TOGGLE, Property::Value, self.state.popup_on_claim);
        batch.set(POPUP, Property::Visible, self.state.popup_visible);

        Ok((batch, self.bindings(&kits)?))
    }

    fn bindings(&self, kits: &[KitDefinition]) -> Result<EventBindings> {
        let mut bindings = EventBindings::new();
        for kit in kits {
            bindings.bind_action(
                &format!("BtnClaim{}", kit.card_prefix()),
                KEY_BUTTON,
                PageAction::Claim(kit.id.clone()).payload(),
            )?;
        }
        bindings.bind_action(CLAIM_SELECTED, KEY_BUTTON, PageAction::ClaimSelected.payload())?;
        bindings.bind_action(POPUP_CLOSE, KEY_BUTTON, PageAction::ClosePopup.payload())?;
        bindings.bind_value(
            KIT_SELECTOR,
            KEY_SELECTED_KIT,
            Selector::new(KIT_SELECTOR, Property::Value),
            ValueKind::Text,
        )?;
        bindings.bind_value(
            POPUP_TOGGLE,
            KEY_SHOW_POPUP,
            Selector::new(POPUP_TOGGLE, Property::Value),
            ValueKind::Bool,
        )?;
        Ok(bindings)
    }

    fn render_card(&mut self, batch: &mut CommandBatch, kit: &KitDefinition) {
        let prefix = kit.card_prefix();
        batch
            .set(
                format!("{}KitIcon", prefix),
                Property::Slots,
                vec![ItemSlot {
                    item_id: kit.icon_item.clone(),
                    quantity: 1,
                }],
            )
            .set(format!("{}KitName", prefix), Property::Text, kit.display_name.to_uppercase())
            .set(format!("{}KitDescription", prefix), Property::Text, kit.description.clone())
            .set(
                format!("{}CooldownValue", prefix),
                Property::Text,
                format_cooldown_label(kit.cooldown_secs),
            );

        self.state.rendered.remove(&kit.id);
        let remaining = self.remaining_secs(kit);
        self.push_status(batch, kit, remaining);

        for (i, item) in kit.items.iter().take(MAX_ITEM_SLOTS).enumerate() {
            let slot = format!("{}Item{}", prefix, i + 1);
            batch
                .set(
                    format!("{}Grid", slot),
                    Property::Slots,
                    vec![ItemSlot {
                        item_id: item.item_id.clone(),
                        quantity: item.quantity,
                    }],
                )
                .set(format!("{}Qty", slot), Property::Text, format!("x{}", item.quantity));
        }
        for i in kit.items.len()..MAX_ITEM_SLOTS {
            batch.set(format!("{}Item{}", prefix, i + 1), Property::Visible, false);
        }
    }

    fn remaining_secs(&self, kit: &KitDefinition) -> u64 {
        remaining_secs(self.ledger.remaining(&self.subject, &kit.id, kit.cooldown()))
    }

    fn status_for(kit: &KitDefinition, remaining: u64) -> RenderedStatus {
        if remaining == 0 {
            RenderedStatus {
                label: "AVAILABLE".to_string(),
                color: COLOR_AVAILABLE,
                button: if kit.vip { "CLAIM VIP KIT" } else { "CLAIM KIT" }.to_string(),
            }
        } else {
            let formatted = format_remaining(remaining);
            RenderedStatus {
                label: format!("COOLDOWN: {}", formatted),
                color: COLOR_COOLDOWN,
                button: formatted,
            }
        }
    }

    /// Writes the status fields that differ from what the client last got.
    fn push_status(&mut self, batch: &mut CommandBatch, kit: &KitDefinition, remaining: u64) {
        let next = Self::status_for(kit, remaining);
        let prefix = kit.card_prefix();
        let previous = self.state.rendered.get(&kit.id);

        if previous.map(|p| &p.label) != Some(&next.label) {
            batch.set(format!("{}StatusLabel", prefix), Property::Text, next.label.clone());
        }
        if previous.map(|p| p.color) != Some(next.color) {
            batch.set(format!("{}StatusLabel", prefix), Property::TextColor, next.color);
        }
        if previous.map(|p| &p.button) != Some(&next.button) {
            batch.set(format!("BtnClaim{}", prefix), Property::Text, next.button.clone());
        }
        self.state.rendered.insert(kit.id.clone(), next);
    }

    /// Minimal diff of every kit's status since the last emission.
    pub fn refresh(&mut self) -> CommandBatch {
        let mut batch = CommandBatch::new();
        for kit in self.catalog.kits().to_vec() {
            let remaining = self.remaining_secs(&kit);
            self.push_status(&mut batch, &kit, remaining);
        }
        batch
    }

    /// Applies value fields first, then runs the button action if any.
    pub async fn handle_event(&mut self, record: &EventRecord) -> PageUpdate {
        let event = KitsPageEvent::from(record);
        let mut update = PageUpdate::default();

        // Kept even when unknown, so ClaimSelected rejects it instead of
        // claiming the previous selection.
        if let Some(kit_id) = event.selected_kit {
            if self.catalog.lookup(&kit_id).is_none() {
                tracing::debug!("[KitsPage] {} selected unknown kit '{}'", self.subject, kit_id);
            }
            self.state.selected_kit = Some(kit_id);
        }
        if let Some(show) = event.show_popup {
            self.state.popup_on_claim = show;
        }

        let Some(button) = event.button else {
            return update;
        };
        let Some(action) = self.actions.resolve(&button) else {
            tracing::debug!("[KitsPage] Ignoring unbound action '{}'", button);
            return update;
        };

        match action {
            PageAction::Claim(kit_id) => {
                let outcome = self.claim(&kit_id, &mut update).await;
                update.outcome = Some(outcome);
            }
            PageAction::ClaimSelected => match self.state.selected_kit.clone() {
                Some(kit_id) => {
                    let outcome = self.claim(&kit_id, &mut update).await;
                    update.outcome = Some(outcome);
                }
                None => update.messages.push(ChatMessage::error("Select a kit first!")),
            },
            PageAction::ClosePopup => {
                self.state.popup_visible = false;
                update.commands.set(POPUP, Property::Visible, false);
            }
        }
        update
    }

    async fn claim(&mut self, kit_id: &str, update: &mut PageUpdate) -> ClaimOutcome {
        let Some(kit) = self.catalog.lookup(kit_id).cloned() else {
            tracing::debug!("[KitsPage] {} tried unknown kit '{}'", self.subject, kit_id);
            update.messages.push(ChatMessage::error("Kit not found!"));
            return ClaimOutcome::Rejected(KitsError::not_found("Kit", kit_id));
        };

        let Some(reservation) = self.ledger.reserve(&self.subject, &kit.id, kit.cooldown()) else {
            let remaining = self.remaining_secs(&kit);
            tracing::debug!(
                "[KitsPage] {} tried '{}' with {}s left",
                self.subject,
                kit.id,
                remaining
            );
            update.messages.push(ChatMessage::error(format!(
                "Wait {} before using this kit again!",
                format_remaining(remaining)
            )));
            return ClaimOutcome::Rejected(KitsError::on_cooldown(&kit.id, remaining));
        };

        let outcome = match tokio::time::timeout(
            self.settings.grant_timeout,
            self.inventory.grant(&self.subject, &kit.items),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => GrantOutcome::Failed {
                reason: format!("inventory did not answer within {:?}", self.settings.grant_timeout),
            },
        };

        match outcome {
            GrantOutcome::Failed { reason } => {
                self.ledger.rollback(reservation);
                tracing::warn!("[KitsPage] Grant of '{}' to {} failed: {}", kit.id, self.subject, reason);
                update.messages.push(ChatMessage::error(
                    "Could not deliver the kit. Check your inventory!",
                ));
                ClaimOutcome::Rejected(KitsError::grant_failed(&kit.id, reason))
            }
            GrantOutcome::Satisfied => {
                tracing::info!("[KitsPage] {} claimed '{}'", self.subject, kit.id);
                self.on_granted(&kit, update);
                ClaimOutcome::Granted { kit_id: kit.id }
            }
            GrantOutcome::Partial { undelivered } => {
                tracing::warn!(
                    "[KitsPage] {} claimed '{}' but {} stacks did not fit",
                    self.subject,
                    kit.id,
                    undelivered.len()
                );
                self.on_granted(&kit, update);
                let names: Vec<String> = undelivered
                    .iter()
                    .map(|item| format!("{} x{}", item.short_name(), item.quantity))
                    .collect();
                update.messages.push(ChatMessage::error(format!(
                    "Inventory full, not delivered: {}",
                    names.join(", ")
                )));
                ClaimOutcome::GrantedPartially(KitsError::GrantIncomplete {
                    kit_id: kit.id,
                    undelivered: undelivered.len(),
                })
            }
        }
    }

    fn on_granted(&mut self, kit: &KitDefinition, update: &mut PageUpdate) {
        self.state.last_claimed_kit = Some(kit.id.clone());

        if self.state.popup_on_claim {
            self.state.popup_visible = true;
            update
                .commands
                .set(POPUP, Property::Visible, true)
                .set(POPUP_TITLE, Property::Text, "KIT CLAIMED!")
                .set(
                    POPUP_MESSAGE,
                    Property::Text,
                    format!("You received the {} successfully!", kit.display_name),
                );
        }

        self.push_status(&mut update.commands, kit, kit.cooldown_secs);

        let text = format!("You received the {}!", kit.display_name);
        update.messages.push(if kit.vip {
            ChatMessage::vip(text)
        } else {
            ChatMessage::success(text)
        });
    }
}

impl std::fmt::Debug for KitsPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitsPage")
            .field("subject", &self.subject)
            .field("state", &self.state)
            .finish()
    }
}
