//! Per-session actor.
//!
//! Each open page runs as one tokio task that owns its `KitsPage` and drains
//! a mailbox serially. Client events, refresh ticks and dismissal all arrive
//! through that mailbox, so page state is never touched concurrently.

use kits_core::error::{KitsError, Result};
use kits_core::scheduler::{Scheduler, SessionTasks, TaskPurpose};
use kits_core::session::{
    ClaimOutcome, KitsPage, LifetimeGate, PageFrame, PageSink, SessionId, SessionKey,
};
use kits_core::ui::{CommandBatch, EventBindings};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Reply to a client event: the claim outcome, if the event was a claim.
pub type EventReply = Result<Option<ClaimOutcome>>;

enum SessionMessage {
    Event {
        raw: Map<String, Value>,
        reply: oneshot::Sender<EventReply>,
    },
    Tick,
    Dismiss {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running session actor.
pub struct SessionHandle {
    id: SessionId,
    key: SessionKey,
    mailbox: mpsc::UnboundedSender<SessionMessage>,
    gate: Arc<LifetimeGate>,
    sink: Arc<dyn PageSink>,
    tasks: Arc<SessionTasks>,
}

struct SessionActor {
    id: SessionId,
    page: KitsPage,
    bindings: EventBindings,
    gate: Arc<LifetimeGate>,
    sink: Arc<dyn PageSink>,
    tasks: Arc<SessionTasks>,
}

impl SessionHandle {
    /// Renders the page, sends the `Open` frame, starts the refresh task and
    /// spawns the actor. Must be called inside a tokio runtime.
    pub fn spawn(
        key: SessionKey,
        mut page: KitsPage,
        sink: Arc<dyn PageSink>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self> {
        let id = SessionId::new();
        let (commands, bindings) = page.build()?;
        let gate = Arc::new(LifetimeGate::new());

        gate.deliver(
            sink.as_ref(),
            PageFrame::Open {
                session_id: id,
                commands,
                bindings: bindings.clone(),
            },
        )?;

        let (mailbox, inbox) = mpsc::unbounded_channel();
        let tasks = Arc::new(SessionTasks::new(scheduler));

        // Ticks hold only a weak sender, so a forgotten session still winds
        // down once every handle is gone.
        let tick_gate = gate.clone();
        let tick_mailbox = mailbox.downgrade();
        tasks.schedule(
            TaskPurpose::CooldownRefresh,
            page.settings().refresh_interval,
            Arc::new(move || {
                if !tick_gate.is_open() {
                    return Ok(());
                }
                let mailbox = tick_mailbox
                    .upgrade()
                    .ok_or_else(|| KitsError::session_closed("mailbox dropped"))?;
                mailbox
                    .send(SessionMessage::Tick)
                    .map_err(|_| KitsError::session_closed("actor stopped"))
            }),
        )?;

        let actor = SessionActor {
            id,
            page,
            bindings,
            gate: gate.clone(),
            sink: sink.clone(),
            tasks: tasks.clone(),
        };
        tokio::spawn(actor.run(inbox));

        tracing::info!("[Session] Opened {} for {}", id, key);
        Ok(Self {
            id,
            key,
            mailbox,
            gate,
            sink,
            tasks,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }

    /// Number of scheduled tasks still owned by the session.
    pub fn active_tasks(&self) -> usize {
        self.tasks.active()
    }

    fn closed(&self) -> KitsError {
        KitsError::session_closed(self.id.to_string())
    }

    /// Forwards a raw client event and waits for the actor to process it.
    pub async fn handle_event(&self, raw: Map<String, Value>) -> EventReply {
        if !self.gate.is_open() {
            return Err(self.closed());
        }
        let (reply, response) = oneshot::channel();
        self.mailbox
            .send(SessionMessage::Event { raw, reply })
            .map_err(|_| self.closed())?;
        response.await.map_err(|_| self.closed())?
    }

    /// Ends the session. Returns false if it had already ended.
    ///
    /// When this returns, the `Closed` frame has been delivered, every task is
    /// cancelled and the actor has stopped; no frame follows `Closed`.
    pub async fn dismiss(&self) -> bool {
        let closed = match self
            .gate
            .close_with(self.sink.as_ref(), PageFrame::Closed { session_id: self.id })
        {
            Ok(closed) => closed,
            Err(e) => {
                tracing::debug!("[Session] Closed frame for {} not delivered: {}", self.id, e);
                true
            }
        };
        if !closed {
            return false;
        }
        self.tasks.cancel_all();

        let (reply, ack) = oneshot::channel();
        if self.mailbox.send(SessionMessage::Dismiss { reply }).is_ok() {
            let _ = ack.await;
        }
        tracing::info!("[Session] Dismissed {} for {}", self.id, self.key);
        true
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("open", &self.is_open())
            .finish()
    }
}

impl SessionActor {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<SessionMessage>) {
        while let Some(message) = inbox.recv().await {
            match message {
                SessionMessage::Event { raw, reply } => {
                    let result = self.handle_event(raw).await;
                    let _ = reply.send(result);
                }
                SessionMessage::Tick => self.tick(),
                SessionMessage::Dismiss { reply } => {
                    let _ = reply.send(());
                    break;
                }
            }
        }
        self.tasks.cancel_all();
        self.gate.close();
        tracing::debug!("[Session] Actor for {} stopped", self.id);
    }

    async fn handle_event(&mut self, raw: Map<String, Value>) -> EventReply {
        if !self.gate.is_open() {
            return Err(KitsError::session_closed(self.id.to_string()));
        }
        let record = self.bindings.decode(&raw)?;
        let update = self.page.handle_event(&record).await;

        self.emit_update(update.commands);
        for message in update.messages {
            self.emit(PageFrame::Message { message });
        }
        Ok(update.outcome)
    }

    fn tick(&mut self) {
        if !self.gate.is_open() {
            return;
        }
        let commands = self.page.refresh();
        self.emit_update(commands);
    }

    fn emit_update(&self, commands: CommandBatch) {
        if commands.is_empty() {
            return;
        }
        self.emit(PageFrame::Update {
            session_id: self.id,
            commands,
        });
    }

    fn emit(&self, frame: PageFrame) {
        if let Err(e) = self.gate.deliver(self.sink.as_ref(), frame) {
            tracing::warn!("[Session] Failed to deliver frame for {}: {}", self.id, e);
        }
    }
}
