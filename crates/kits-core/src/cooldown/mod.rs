//! Cooldown tracking.
//!
//! - `clock`: time source seam (`Clock`, `SystemClock`, `ManualClock`)
//! - `ledger`: per-(subject, kit) last-claim store with atomic claims
//! - `format`: human-readable remaining-time and cooldown labels

mod clock;
mod format;
mod ledger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{format_cooldown_label, format_remaining, remaining_secs};
pub use ledger::{CooldownLedger, Reservation};
