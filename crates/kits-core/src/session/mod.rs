//! Page sessions.
//!
//! - `identity`: subject, session and page-kind ids
//! - `frame`: outbound frames, the `PageSink` seam and the lifetime gate
//! - `inventory`: the `PlayerInventory` collaborator
//! - `action`: button actions and the typed event view
//! - `page`: the kits page itself (render, diff, claim flow)

mod action;
mod frame;
mod identity;
mod inventory;
mod page;
mod settings;

pub use action::{ActionTable, KEY_BUTTON, KEY_SELECTED_KIT, KEY_SHOW_POPUP, KitsPageEvent, PageAction};
pub use frame::{
    CHAT_PREFIX, COLOR_ERROR, COLOR_SUCCESS, COLOR_VIP, ChatMessage, LifetimeGate, PageFrame, PageSink,
};
pub use identity::{PageKind, SessionId, SessionKey, SubjectId};
pub use inventory::{GrantOutcome, PlayerInventory};
pub use page::{COLOR_AVAILABLE, COLOR_COOLDOWN, ClaimOutcome, KitsPage, MAX_ITEM_SLOTS, PageState, PageUpdate};
pub use settings::{DEFAULT_GRANT_TIMEOUT, DEFAULT_TEMPLATE, PageSettings};
