//! Dynamic-wake timer loop
//!
//! A [`DueWorker`] exposes the earliest pending due time and a way to drain
//! everything that is due. [`run_due_loop`] sleeps exactly until that due
//! time, or until its [`WakeSignal`] is raised, and never polls on a fixed
//! interval except as the idle fallback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{sleep, timeout};

use super::error::EventError;

/// Level-triggered wake-up for a due loop.
///
/// Raising it while nobody waits stores a single permit, so any number of
/// signals before the loop consumes them collapse into one wake.
#[derive(Clone, Default)]
pub struct WakeSignal {
    notify: Arc<Notify>,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self) {
        self.notify.notify_one();
    }

    /// Wait for a signal; `true` if one arrived before `limit` elapsed
    pub async fn wait(&self, limit: Duration) -> bool {
        timeout(limit, self.notify.notified()).await.is_ok()
    }
}

/// One queue of due work driven by [`run_due_loop`]
#[async_trait]
pub trait DueWorker: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &'static str;

    /// Earliest pending due time, re-read from the store every cycle
    async fn next_due(&self) -> Result<Option<DateTime<Utc>>, EventError>;

    /// Process everything due at or before `now`; returns how many items ran
    async fn process_due(&self, now: DateTime<Utc>) -> Result<usize, EventError>;
}

/// Timing knobs for [`run_due_loop`]
#[derive(Debug, Clone, Copy)]
pub struct LoopTiming {
    /// Fallback re-check while nothing is pending
    pub idle_recheck: Duration,
    /// Pause after a failed cycle
    pub fault_pause: Duration,
}

/// Where one cycle of the loop ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing pending; waited for a signal or the idle fallback
    Idle,
    /// A signal arrived before the armed due time
    Rearmed,
    /// The due time passed and this many items were processed
    Fired(usize),
}

/// Run one cycle: wait for the next due time (or a wake), then drain.
pub async fn run_cycle<W: DueWorker + ?Sized>(
    worker: &W,
    wake: &WakeSignal,
    timing: LoopTiming,
) -> Result<CycleOutcome, EventError> {
    let Some(due_at) = worker.next_due().await? else {
        debug!("[{}] idle, re-checking in {:?}", worker.name(), timing.idle_recheck);
        wake.wait(timing.idle_recheck).await;
        return Ok(CycleOutcome::Idle);
    };

    let now = Utc::now();
    if due_at > now {
        let wait = (due_at - now).to_std().unwrap_or(Duration::ZERO);
        debug!("[{}] armed for {due_at} ({wait:?})", worker.name());
        if wake.wait(wait).await {
            debug!("[{}] woken before {due_at}, re-evaluating", worker.name());
            return Ok(CycleOutcome::Rearmed);
        }
    }

    let processed = worker.process_due(Utc::now()).await?;
    Ok(CycleOutcome::Fired(processed))
}

/// Drive a worker forever. Failed cycles are logged, followed by a short
/// pause, and never end the loop.
pub async fn run_due_loop<W: DueWorker + ?Sized>(
    worker: Arc<W>,
    wake: WakeSignal,
    timing: LoopTiming,
) {
    info!("⏰ {} loop started", worker.name());

    loop {
        match run_cycle(worker.as_ref(), &wake, timing).await {
            Ok(CycleOutcome::Fired(count)) if count > 0 => {
                info!("⏰ {} processed {count} due item(s)", worker.name());
            }
            Ok(_) => {}
            Err(e) => {
                error!("{} cycle failed: {e}", worker.name());
                sleep(timing.fault_pause).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Worker backed by a plain list of due times
    #[derive(Default)]
    struct ListWorker {
        due: Mutex<Vec<DateTime<Utc>>>,
        processed: AtomicUsize,
        fail_next: Mutex<bool>,
    }

    #[async_trait]
    impl DueWorker for ListWorker {
        fn name(&self) -> &'static str {
            "test"
        }

        async fn next_due(&self) -> Result<Option<DateTime<Utc>>, EventError> {
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(EventError::Corrupt("boom".to_string()));
            }
            Ok(self.due.lock().unwrap().iter().min().copied())
        }

        async fn process_due(&self, now: DateTime<Utc>) -> Result<usize, EventError> {
            let mut due = self.due.lock().unwrap();
            let before = due.len();
            due.retain(|at| *at > now);
            let fired = before - due.len();
            self.processed.fetch_add(fired, Ordering::SeqCst);
            Ok(fired)
        }
    }

    fn timing() -> LoopTiming {
        LoopTiming {
            idle_recheck: Duration::from_millis(50),
            fault_pause: Duration::from_millis(10),
        }
    }

    fn in_ms(ms: i64) -> DateTime<Utc> {
        Utc::now() + chrono::Duration::milliseconds(ms)
    }

    #[tokio::test]
    async fn test_signals_collapse_into_one_wake() {
        let wake = WakeSignal::new();
        wake.wake();
        wake.wake();
        wake.wake();

        assert!(wake.wait(Duration::from_millis(10)).await);
        assert!(!wake.wait(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_idle_cycle_waits_for_fallback() {
        let worker = ListWorker::default();
        let wake = WakeSignal::new();

        let started = std::time::Instant::now();
        let outcome = run_cycle(&worker, &wake, timing()).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Idle);
        assert!(started.elapsed() >= Duration::from_millis(45));
    }

    #[tokio::test]
    async fn test_overdue_item_fires_immediately() {
        let worker = ListWorker::default();
        worker.due.lock().unwrap().push(in_ms(-1000));

        let outcome = run_cycle(&worker, &WakeSignal::new(), timing()).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Fired(1));
    }

    #[tokio::test]
    async fn test_fires_at_due_time_not_before() {
        let worker = ListWorker::default();
        let due = in_ms(150);
        worker.due.lock().unwrap().push(due);

        let wake = WakeSignal::new();
        let mut fired = 0;
        for _ in 0..5 {
            if let CycleOutcome::Fired(n) = run_cycle(&worker, &wake, timing()).await.unwrap() {
                fired += n;
                if fired > 0 {
                    break;
                }
            }
        }
        assert_eq!(fired, 1);
        assert!(Utc::now() >= due);
    }

    #[tokio::test]
    async fn test_wake_rearms_before_old_due_time() {
        let worker = Arc::new(ListWorker::default());
        worker.due.lock().unwrap().push(in_ms(60_000));
        let wake = WakeSignal::new();

        let cycle = {
            let worker = worker.clone();
            let wake = wake.clone();
            tokio::spawn(async move { run_cycle(worker.as_ref(), &wake, timing()).await })
        };

        sleep(Duration::from_millis(20)).await;
        worker.due.lock().unwrap().push(in_ms(-1));
        wake.wake();

        let outcome = timeout(Duration::from_secs(1), cycle)
            .await
            .expect("cycle should end well before the old due time")
            .unwrap()
            .unwrap();
        assert_eq!(outcome, CycleOutcome::Rearmed);

        // The next cycle picks up the earlier item right away
        let outcome = run_cycle(worker.as_ref(), &wake, timing()).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Fired(1));
    }

    #[tokio::test]
    async fn test_loop_survives_faults() {
        let worker = Arc::new(ListWorker::default());
        *worker.fail_next.lock().unwrap() = true;
        worker.due.lock().unwrap().push(in_ms(-1));

        let handle = tokio::spawn(run_due_loop(worker.clone(), WakeSignal::new(), timing()));
        sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(worker.processed.load(Ordering::SeqCst), 1);
    }
}
