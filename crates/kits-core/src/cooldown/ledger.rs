//! Cooldown ledger shared by every session.

use super::clock::Clock;
use crate::session::SubjectId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type LedgerKey = (SubjectId, String);

/// Last-claim timestamps keyed by (subject, kit).
///
/// Every read-and-stamp happens under one mutex, so two concurrent claims for
/// the same key can never both succeed. The ledger does not know the catalog:
/// callers pass the cooldown duration of the kit they are asking about.
pub struct CooldownLedger {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<LedgerKey, DateTime<Utc>>>,
}

/// Proof of a successful claim that can be undone if the grant fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    subject: SubjectId,
    kit_id: String,
    stamped_at: DateTime<Utc>,
    previous: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn stamped_at(&self) -> DateTime<Utc> {
        self.stamped_at
    }
}

impl CooldownLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<LedgerKey, DateTime<Utc>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key(subject: &SubjectId, kit_id: &str) -> LedgerKey {
        (subject.clone(), kit_id.to_string())
    }

    fn remaining_at(
        last: Option<&DateTime<Utc>>,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Duration {
        let Some(last) = last else {
            return Duration::ZERO;
        };
        let cooldown = chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::MAX);
        let ends_at = last.checked_add_signed(cooldown).unwrap_or(DateTime::<Utc>::MAX_UTC);
        (ends_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    /// Time left before `subject` may claim `kit_id` again.
    pub fn remaining(&self, subject: &SubjectId, kit_id: &str, cooldown: Duration) -> Duration {
        let now = self.clock.now();
        let entries = self.entries();
        Self::remaining_at(entries.get(&Self::key(subject, kit_id)), cooldown, now)
    }

    /// Stamps `now` for the key if and only if no cooldown is pending.
    pub fn try_claim(&self, subject: &SubjectId, kit_id: &str, cooldown: Duration) -> bool {
        self.reserve(subject, kit_id, cooldown).is_some()
    }

    /// Like [`try_claim`](Self::try_claim) but keeps enough to roll the claim back.
    pub fn reserve(
        &self,
        subject: &SubjectId,
        kit_id: &str,
        cooldown: Duration,
    ) -> Option<Reservation> {
        let now = self.clock.now();
        let key = Self::key(subject, kit_id);
        let mut entries = self.entries();

        if !Self::remaining_at(entries.get(&key), cooldown, now).is_zero() {
            return None;
        }

        // Never move a stamp backwards, even if the clock did.
        let stamped_at = entries.get(&key).map_or(now, |last| now.max(*last));
        let previous = entries.insert(key, stamped_at);

        Some(Reservation {
            subject: subject.clone(),
            kit_id: kit_id.to_string(),
            stamped_at,
            previous,
        })
    }

    /// Undoes a reservation whose grant never happened.
    ///
    /// Only restores the previous stamp when the entry still carries this
    /// reservation's stamp; returns whether anything changed.
    pub fn rollback(&self, reservation: Reservation) -> bool {
        let key = Self::key(&reservation.subject, &reservation.kit_id);
        let mut entries = self.entries();
        if entries.get(&key) != Some(&reservation.stamped_at) {
            return false;
        }
        match reservation.previous {
            Some(previous) => {
                entries.insert(key, previous);
            }
            None => {
                entries.remove(&key);
            }
        }
        true
    }

    pub fn last_claimed_at(&self, subject: &SubjectId, kit_id: &str) -> Option<DateTime<Utc>> {
        self.entries().get(&Self::key(subject, kit_id)).copied()
    }

    /// Administrative clear of one kit for one subject.
    pub fn clear(&self, subject: &SubjectId, kit_id: &str) -> bool {
        self.entries().remove(&Self::key(subject, kit_id)).is_some()
    }

    /// Administrative clear of every kit for one subject.
    pub fn clear_subject(&self, subject: &SubjectId) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(owner, _), _| owner != subject);
        before - entries.len()
    }
}

impl std::fmt::Debug for CooldownLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownLedger")
            .field("entries", &self.entries().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::ManualClock;
    use std::sync::Barrier;
    use std::thread;

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    fn ledger() -> (Arc<ManualClock>, CooldownLedger) {
        let clock = Arc::new(ManualClock::default());
        let ledger = CooldownLedger::new(clock.clone());
        (clock, ledger)
    }

    fn player() -> SubjectId {
        SubjectId::new("P")
    }

    #[test]
    fn test_unknown_key_has_no_cooldown() {
        let (_, ledger) = ledger();
        assert_eq!(ledger.remaining(&player(), "basic", FIVE_MINUTES), Duration::ZERO);
        assert!(ledger.last_claimed_at(&player(), "basic").is_none());
    }

    #[test]
    fn test_claim_sets_full_cooldown() {
        let (_, ledger) = ledger();
        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        assert_eq!(ledger.remaining(&player(), "basic", FIVE_MINUTES), FIVE_MINUTES);
    }

    #[test]
    fn test_claim_rejected_while_on_cooldown() {
        let (clock, ledger) = ledger();
        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));

        clock.advance(Duration::from_secs(100));
        let before = ledger.remaining(&player(), "basic", FIVE_MINUTES);
        assert_eq!(before, Duration::from_secs(200));

        assert!(!ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        assert_eq!(ledger.remaining(&player(), "basic", FIVE_MINUTES), before);
    }

    #[test]
    fn test_claim_allowed_after_cooldown_elapses() {
        let (clock, ledger) = ledger();
        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        clock.advance(FIVE_MINUTES);
        assert_eq!(ledger.remaining(&player(), "basic", FIVE_MINUTES), Duration::ZERO);
        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        assert_eq!(ledger.remaining(&player(), "basic", FIVE_MINUTES), FIVE_MINUTES);
    }

    #[test]
    fn test_keys_are_independent() {
        let (_, ledger) = ledger();
        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        assert!(ledger.try_claim(&player(), "vip", FIVE_MINUTES));
        assert!(ledger.try_claim(&SubjectId::new("Q"), "basic", FIVE_MINUTES));
    }

    #[test]
    fn test_rollback_restores_previous_state() {
        let (clock, ledger) = ledger();
        let reservation = ledger.reserve(&player(), "basic", FIVE_MINUTES).unwrap();
        assert!(ledger.rollback(reservation));
        assert!(ledger.last_claimed_at(&player(), "basic").is_none());

        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        let first = ledger.last_claimed_at(&player(), "basic").unwrap();
        clock.advance(FIVE_MINUTES);
        let second = ledger.reserve(&player(), "basic", FIVE_MINUTES).unwrap();
        assert!(ledger.rollback(second));
        assert_eq!(ledger.last_claimed_at(&player(), "basic"), Some(first));
    }

    #[test]
    fn test_stale_rollback_is_ignored() {
        let (clock, ledger) = ledger();
        let stale = ledger.reserve(&player(), "basic", FIVE_MINUTES).unwrap();
        clock.advance(FIVE_MINUTES);
        assert!(ledger.try_claim(&player(), "basic", FIVE_MINUTES));
        let current = ledger.last_claimed_at(&player(), "basic");

        assert!(!ledger.rollback(stale));
        assert_eq!(ledger.last_claimed_at(&player(), "basic"), current);
    }

    #[test]
    fn test_clear_subject() {
        let (_, ledger) = ledger();
        ledger.try_claim(&player(), "basic", FIVE_MINUTES);
        ledger.try_claim(&player(), "vip", FIVE_MINUTES);
        ledger.try_claim(&SubjectId::new("Q"), "basic", FIVE_MINUTES);

        assert_eq!(ledger.clear_subject(&player()), 2);
        assert_eq!(ledger.remaining(&player(), "vip", FIVE_MINUTES), Duration::ZERO);
        assert_eq!(
            ledger.remaining(&SubjectId::new("Q"), "basic", FIVE_MINUTES),
            FIVE_MINUTES
        );
        assert!(ledger.clear(&SubjectId::new("Q"), "basic"));
        assert!(!ledger.clear(&SubjectId::new("Q"), "basic"));
    }

    #[test]
    fn test_concurrent_claims_yield_exactly_one_success() {
        const CLAIMERS: usize = 16;
        let (_, ledger) = ledger();
        let ledger = Arc::new(ledger);
        let barrier = Arc::new(Barrier::new(CLAIMERS));

        let handles: Vec<_> = (0..CLAIMERS)
            .map(|_| {
                let ledger = ledger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    ledger.try_claim(&SubjectId::new("P"), "basic", FIVE_MINUTES)
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(successes, 1);
    }
}
