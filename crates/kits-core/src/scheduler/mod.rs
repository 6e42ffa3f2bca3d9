//! Session-scoped periodic tasks.
//!
//! - `task`: the `Scheduler` seam, task handles and the per-session `SessionTasks` supervisor
//! - `runtime`: `TokioScheduler`, backed by `tokio::time::interval`
//! - `manual`: `ManualScheduler`, driven by virtual time in tests and tools

mod manual;
mod runtime;
mod task;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;
pub use task::{Scheduler, SessionTasks, TaskHandle, TaskPurpose, TickFn};

use std::time::Duration;

/// Default interval of the cooldown refresh task.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);
