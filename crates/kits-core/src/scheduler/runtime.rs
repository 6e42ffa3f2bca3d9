use super::task::{Scheduler, TaskHandle, TaskPurpose, TickFn, run_tick};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Spawns one tokio task per scheduled callback.
///
/// Ticks are fixed-delay: a late tick pushes the following ones back rather
/// than bursting to catch up. Must be used from inside a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(
        &self,
        purpose: TaskPurpose,
        interval: Duration,
        token: CancellationToken,
        tick: TickFn,
    ) -> TaskHandle {
        let handle = TaskHandle::new(purpose, token.clone());
        let interval = interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!("[Scheduler] {} started ({:?} interval)", purpose.as_str(), interval);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if token.is_cancelled() {
                            break;
                        }
                        run_tick(purpose, &tick);
                    }
                }
            }

            tracing::debug!("[Scheduler] {} stopped", purpose.as_str());
        });

        handle
    }
}
