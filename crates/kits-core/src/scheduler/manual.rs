use super::task::{Scheduler, TaskHandle, TaskPurpose, TickFn, run_tick};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct ManualTask {
    purpose: TaskPurpose,
    interval: Duration,
    due: Duration,
    token: CancellationToken,
    tick: TickFn,
}

#[derive(Default)]
struct State {
    now: Duration,
    tasks: Vec<ManualTask>,
}

/// A scheduler that only fires when [`advance`](ManualScheduler::advance) is called.
///
/// Ticks run on the caller's thread, in due order, with the internal lock
/// released so a tick may schedule or cancel other tasks.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<State>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Virtual time elapsed since creation.
    pub fn elapsed(&self) -> Duration {
        self.state().now
    }

    /// Number of tasks that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.state()
            .tasks
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    /// Moves virtual time forward, firing every tick that falls due.
    /// Returns the number of ticks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state().now + by;
        let mut fired = 0;

        loop {
            let next = {
                let mut state = self.state();
                state.tasks.retain(|t| !t.token.is_cancelled());
                let index = state
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| t.due)
                    .map(|(i, _)| i);
                index.map(|i| {
                    let task = &mut state.tasks[i];
                    let due = task.due;
                    task.due += task.interval;
                    let next = (task.purpose, task.tick.clone());
                    state.now = due;
                    next
                })
            };

            let Some((purpose, tick)) = next else {
                break;
            };
            run_tick(purpose, &tick);
            fired += 1;
        }

        self.state().now = target;
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        purpose: TaskPurpose,
        interval: Duration,
        token: CancellationToken,
        tick: TickFn,
    ) -> TaskHandle {
        // A zero interval would fire forever within one advance.
        let interval = interval.max(Duration::from_millis(1));
        let mut state = self.state();
        let due = state.now + interval;
        state.tasks.push(ManualTask {
            purpose,
            interval,
            due,
            token: token.clone(),
            tick,
        });
        TaskHandle::new(purpose, token)
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("elapsed", &self.elapsed())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_advance_fires_due_ticks_in_order() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for (name, secs) in [("fast", 1), ("slow", 3)] {
            let log = log.clone();
            scheduler.schedule_repeating(
                TaskPurpose::CooldownRefresh,
                Duration::from_secs(secs),
                CancellationToken::new(),
                Arc::new(move || {
                    log.lock().unwrap().push(name);
                    Ok(())
                }),
            );
        }

        assert_eq!(scheduler.advance(Duration::from_millis(999)), 0);
        assert_eq!(scheduler.advance(Duration::from_secs(3)), 4);
        assert_eq!(*log.lock().unwrap(), vec!["fast", "fast", "fast", "slow"]);
        assert_eq!(scheduler.elapsed(), Duration::from_millis(3999));
    }

    #[test]
    fn test_cancelled_task_never_fires() {
        let scheduler = ManualScheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = scheduler.schedule_repeating(
            TaskPurpose::CooldownRefresh,
            Duration::from_secs(1),
            CancellationToken::new(),
            Arc::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        handle.cancel();
        assert_eq!(scheduler.advance(Duration::from_secs(10)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_tick_can_cancel_itself() {
        let scheduler = ManualScheduler::new();
        let token = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));
        let (c, t) = (count.clone(), token.clone());
        scheduler.schedule_repeating(
            TaskPurpose::CooldownRefresh,
            Duration::from_secs(1),
            token,
            Arc::new(move || {
                if c.fetch_add(1, Ordering::SeqCst) == 1 {
                    t.cancel();
                }
                Ok(())
            }),
        );

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
