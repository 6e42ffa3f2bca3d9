//! Kits service implementation.
//!
//! `KitsService` is built once at startup and owns everything sessions
//! share: the catalog, the cooldown ledger, the inventory collaborator, the
//! scheduler and the registry of open sessions.

use crate::session::{SessionHandle, SessionRegistry};
use anyhow::{Context, Result};
use kits_core::cooldown::CooldownLedger;
use kits_core::error::KitsError;
use kits_core::kit::KitCatalog;
use kits_core::scheduler::Scheduler;
use kits_core::session::{
    ClaimOutcome, KitsPage, PageKind, PageSettings, PageSink, PlayerInventory, SessionId, SessionKey,
    SubjectId,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for opening kits pages and routing their events.
///
/// # Thread Safety
///
/// Every field is shared through `Arc`; the service itself is usually held
/// as `Arc<KitsService>` and used from many tasks at once.
pub struct KitsService {
    /// Kit definitions shown on every page
    catalog: Arc<dyn KitCatalog>,
    /// Cooldowns shared by all sessions
    ledger: Arc<CooldownLedger>,
    /// Game-side inventory used for the active check and for grants
    inventory: Arc<dyn PlayerInventory>,
    /// Runs each session's refresh task
    scheduler: Arc<dyn Scheduler>,
    /// Template and timing applied to new pages
    settings: PageSettings,
    /// Open sessions
    registry: Arc<SessionRegistry>,
}

impl KitsService {
    /// Creates a new `KitsService`.
    pub fn new(
        catalog: Arc<dyn KitCatalog>,
        ledger: Arc<CooldownLedger>,
        inventory: Arc<dyn PlayerInventory>,
        scheduler: Arc<dyn Scheduler>,
        settings: PageSettings,
    ) -> Self {
        Self {
            catalog,
            ledger,
            inventory,
            scheduler,
            settings,
            registry: Arc::new(SessionRegistry::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn KitCatalog> {
        &self.catalog
    }

    pub fn ledger(&self) -> &Arc<CooldownLedger> {
        &self.ledger
    }

    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Opens a page for `subject`, delivering frames to `sink`.
    ///
    /// A session already open for the same subject and page kind is dismissed
    /// first; it receives its `Closed` frame before the new `Open` frame is
    /// sent to the new sink.
    ///
    /// # Errors
    ///
    /// Fails with `KitsError::NotFound` ("Player") if `subject` is not an
    /// active player, or if the `Open` frame cannot be delivered.
    pub async fn open_page(
        &self,
        subject: SubjectId,
        kind: PageKind,
        sink: Arc<dyn PageSink>,
    ) -> Result<SessionId> {
        if !self.inventory.is_active(&subject).await {
            tracing::warn!("[KitsService] Refusing to open {} page for inactive {}", kind.as_str(), subject);
            return Err(KitsError::not_found("Player", subject.as_str()).into());
        }

        let key = SessionKey::new(subject.clone(), kind);
        if let Some(previous) = self.registry.get_by_key(&key).await {
            tracing::info!("[KitsService] Superseding session {} for {}", previous.id(), key);
            self.registry.remove(&previous.id()).await;
            previous.dismiss().await;
        }

        let page = match kind {
            PageKind::Kits => KitsPage::new(
                subject,
                self.catalog.clone(),
                self.ledger.clone(),
                self.inventory.clone(),
                self.settings.clone(),
            ),
        };
        let handle = SessionHandle::spawn(key, page, sink, self.scheduler.clone())
            .context("Failed to open page")?;
        let session_id = handle.id();

        // A concurrent open for the same key may have won the race in between.
        if let Some(displaced) = self.registry.insert(Arc::new(handle)).await {
            tracing::info!("[KitsService] Superseding session {}", displaced.id());
            displaced.dismiss().await;
        }
        Ok(session_id)
    }

    async fn session(&self, session_id: &SessionId) -> Result<Arc<SessionHandle>> {
        self.registry
            .get(session_id)
            .await
            .ok_or_else(|| KitsError::not_found("Session", session_id.to_string()).into())
    }

    /// Routes a raw client event to its session and waits for the result.
    ///
    /// Returns the claim outcome when the event was a claim. Rejected claims
    /// are `Ok(Some(ClaimOutcome::Rejected(..)))`, not errors; errors are
    /// reserved for unknown sessions and malformed payloads.
    pub async fn handle_event(
        &self,
        session_id: &SessionId,
        raw: Map<String, Value>,
    ) -> Result<Option<ClaimOutcome>> {
        let session = self.session(session_id).await?;
        let outcome = session.handle_event(raw).await?;
        if let Some(ClaimOutcome::Rejected(reason)) = &outcome {
            if reason.is_player_facing() {
                tracing::debug!("[KitsService] Claim rejected in {}: {}", session_id, reason);
            } else {
                tracing::warn!("[KitsService] Claim failed in {}: {}", session_id, reason);
            }
        }
        Ok(outcome)
    }

    /// Dismisses a session: cancels its tasks and sends `Closed`.
    pub async fn dismiss(&self, session_id: &SessionId) -> Result<()> {
        let session = self
            .registry
            .remove(session_id)
            .await
            .ok_or_else(|| KitsError::not_found("Session", session_id.to_string()))?;
        session.dismiss().await;
        Ok(())
    }

    /// Id of the session currently open for `subject`, if any.
    pub async fn session_for(&self, subject: &SubjectId, kind: PageKind) -> Option<SessionId> {
        self.registry
            .get_by_key(&SessionKey::new(subject.clone(), kind))
            .await
            .map(|handle| handle.id())
    }

    pub async fn open_sessions(&self) -> usize {
        self.registry.len().await
    }

    /// Remaining cooldown of `kit_id` for `subject`.
    pub fn remaining(&self, subject: &SubjectId, kit_id: &str) -> Result<Duration> {
        let kit = self
            .catalog
            .lookup(kit_id)
            .ok_or_else(|| KitsError::not_found("Kit", kit_id))?;
        Ok(self.ledger.remaining(subject, &kit.id, kit.cooldown()))
    }

    /// Administrative clear: one kit, or every kit when `kit_id` is `None`.
    /// Returns how many cooldowns were removed.
    pub fn clear_cooldowns(&self, subject: &SubjectId, kit_id: Option<&str>) -> usize {
        let cleared = match kit_id {
            Some(kit_id) => usize::from(self.ledger.clear(subject, kit_id)),
            None => self.ledger.clear_subject(subject),
        };
        tracing::info!("[KitsService] Cleared {} cooldown(s) for {}", cleared, subject);
        cleared
    }

    /// Dismisses every open session.
    pub async fn shutdown(&self) {
        let sessions = self.registry.drain().await;
        tracing::info!("[KitsService] Shutting down {} session(s)", sessions.len());
        for session in sessions {
            session.dismiss().await;
        }
    }
}
