use crate::error::{KitsError, Result};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Body of a repeating task. Returning an error skips this tick only.
pub type TickFn = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// What a session task is for. A session owns at most one task per purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskPurpose {
    /// Pushes remaining-cooldown updates to the open page.
    CooldownRefresh,
}

impl TaskPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPurpose::CooldownRefresh => "cooldown_refresh",
        }
    }
}

/// Handle to one scheduled task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    purpose: TaskPurpose,
    token: CancellationToken,
}

impl TaskHandle {
    pub fn new(purpose: TaskPurpose, token: CancellationToken) -> Self {
        Self { purpose, token }
    }

    pub fn purpose(&self) -> TaskPurpose {
        self.purpose
    }

    /// Stops the task. The tick body is never invoked again once this returns.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Runs repeating callbacks until their token is cancelled.
pub trait Scheduler: Send + Sync {
    /// Invokes `tick` every `interval`, first after one full interval, until
    /// `token` is cancelled.
    fn schedule_repeating(
        &self,
        purpose: TaskPurpose,
        interval: Duration,
        token: CancellationToken,
        tick: TickFn,
    ) -> TaskHandle;
}

/// Runs one tick, logging failures instead of stopping the task.
///
/// A panicking tick is caught and logged too; the task keeps its schedule.
pub(crate) fn run_tick(purpose: TaskPurpose, tick: &TickFn) {
    match panic::catch_unwind(AssertUnwindSafe(|| tick())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("[Scheduler] {} tick failed: {}", purpose.as_str(), e),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("[Scheduler] {} tick panicked: {}", purpose.as_str(), message);
        }
    }
}

/// The tasks owned by one session.
///
/// Every task runs on a child of the session's root token, so `cancel_all`
/// stops all of them at once and nothing can be scheduled afterwards.
pub struct SessionTasks {
    scheduler: Arc<dyn Scheduler>,
    root: CancellationToken,
    tasks: Mutex<HashMap<TaskPurpose, TaskHandle>>,
}

impl SessionTasks {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            root: CancellationToken::new(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<TaskPurpose, TaskHandle>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Schedules `tick`, replacing any running task with the same purpose.
    pub fn schedule(&self, purpose: TaskPurpose, interval: Duration, tick: TickFn) -> Result<TaskHandle> {
        let mut tasks = self.tasks();
        if self.root.is_cancelled() {
            return Err(KitsError::session_closed(format!(
                "cannot schedule {} after dismiss",
                purpose.as_str()
            )));
        }
        if let Some(previous) = tasks.remove(&purpose) {
            tracing::debug!("[SessionTasks] Replacing {} task", purpose.as_str());
            previous.cancel();
        }
        let handle = self
            .scheduler
            .schedule_repeating(purpose, interval, self.root.child_token(), tick);
        tasks.insert(purpose, handle.clone());
        Ok(handle)
    }

    /// Cancels the task with this purpose, if any.
    pub fn cancel(&self, purpose: TaskPurpose) -> bool {
        match self.tasks().remove(&purpose) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every task of the session, now and in the future.
    pub fn cancel_all(&self) {
        let mut tasks = self.tasks();
        self.root.cancel();
        tasks.clear();
    }

    pub fn is_cancelled(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Number of live tasks.
    pub fn active(&self) -> usize {
        self.tasks().values().filter(|h| !h.is_cancelled()).count()
    }
}

impl std::fmt::Debug for SessionTasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTasks")
            .field("cancelled", &self.is_cancelled())
            .field("active", &self.active())
            .finish()
    }
}
