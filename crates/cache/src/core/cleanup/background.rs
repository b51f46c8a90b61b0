//! Periodic sweeping

use crate::config::CacheConfig;
use crate::errors::Result;
use crate::types::now_millis;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::ExpirySweep;

/// How a failed sweep is retried before waiting for the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(30),
        }
    }
}

/// What the scheduler has done so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupStatus {
    pub scheduled: bool,
    /// Completed sweeps
    pub runs: u64,
    pub last_removed: usize,
    /// End of the last completed sweep, ms since the epoch
    pub last_run: Option<i64>,
    pub consecutive_failures: u32,
}

struct SchedulerState {
    status: CleanupStatus,
    shutdown: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

/// Runs an [`ExpirySweep`] on a fixed interval until cancelled
///
/// The first sweep happens one interval after [`CleanupScheduler::schedule`].
/// Dropping the scheduler stops the periodic task.
pub struct CleanupScheduler {
    source: Arc<dyn ExpirySweep>,
    retry: RetryPolicy,
    state: Arc<Mutex<SchedulerState>>,
}

impl CleanupScheduler {
    pub fn new(source: Arc<dyn ExpirySweep>) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
            state: Arc::new(Mutex::new(SchedulerState {
                status: CleanupStatus::default(),
                shutdown: None,
                handle: None,
            })),
        }
    }

    /// A scheduler that is already running when `config` asks for automatic cleanup
    ///
    /// Must be called inside a Tokio runtime.
    pub fn for_config(source: Arc<dyn ExpirySweep>, config: &CacheConfig) -> Self {
        let scheduler = Self::new(source);
        if config.auto_clean_expired {
            scheduler.schedule(config.cleanup_interval());
        } else {
            debug!("Automatic cleanup disabled by configuration");
        }
        scheduler
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start sweeping every `interval`, replacing any previous schedule
    pub fn schedule(&self, interval: Duration) {
        let shutdown = CancellationToken::new();
        {
            let mut state = self.state.lock();
            if let Some(previous) = state.shutdown.take() {
                previous.cancel();
            }
            state.shutdown = Some(shutdown.clone());
            state.status.scheduled = true;
        }

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let retry = self.retry;
        let handle = tokio::spawn(run(source, state, retry, interval, shutdown));
        self.state.lock().handle = Some(handle);

        info!(interval_ms = interval.as_millis() as u64, "Cache cleanup scheduled");
    }

    /// Stop the periodic task; a sweep in progress stops at its next entry
    ///
    /// Returns without waiting; use [`CleanupScheduler::join`] to wait for the task to end.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(shutdown) = state.shutdown.take() {
            shutdown.cancel();
            info!("Cache cleanup cancelled");
        }
        state.status.scheduled = false;
    }

    /// Run one sweep now, outside the schedule and without retries
    pub async fn trigger_now(&self) -> Result<usize> {
        info!("Running immediate cache cleanup");
        sweep_once(self.source.as_ref(), &self.state, &CancellationToken::new()).await
    }

    pub fn status(&self) -> CleanupStatus {
        self.state.lock().status.clone()
    }

    pub fn is_scheduled(&self) -> bool {
        self.state.lock().status.scheduled
    }

    /// Wait for the periodic task to finish after [`CleanupScheduler::cancel`] or shutdown
    pub async fn join(&self) {
        let handle = self.state.lock().handle.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Cache cleanup task ended abnormally");
            }
        }
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        if let Some(shutdown) = self.state.lock().shutdown.take() {
            shutdown.cancel();
        }
    }
}

impl std::fmt::Debug for CleanupScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupScheduler")
            .field("retry", &self.retry)
            .field("status", &self.status())
            .finish()
    }
}

async fn run(
    source: Arc<dyn ExpirySweep>,
    state: Arc<Mutex<SchedulerState>>,
    retry: RetryPolicy,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // Skip the first immediate tick
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("Cache cleanup task shutting down");
                break;
            }

            _ = interval.tick() => {
                sweep_with_retry(source.as_ref(), &state, retry, &shutdown).await;
            }
        }
    }
}

async fn sweep_with_retry(
    source: &dyn ExpirySweep,
    state: &Mutex<SchedulerState>,
    retry: RetryPolicy,
    shutdown: &CancellationToken,
) {
    let mut attempt = 0;
    loop {
        if sweep_once(source, state, shutdown).await.is_ok() {
            return;
        }
        if attempt >= retry.max_retries {
            error!(attempts = attempt + 1, "Cache cleanup failed; waiting for the next run");
            return;
        }
        attempt += 1;

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(retry.retry_delay) => {}
        }
    }
}

async fn sweep_once(
    source: &dyn ExpirySweep,
    state: &Mutex<SchedulerState>,
    cancel: &CancellationToken,
) -> Result<usize> {
    match source.sweep_expired(cancel).await {
        Ok(removed) => {
            let mut state = state.lock();
            state.status.runs += 1;
            state.status.last_removed = removed;
            state.status.last_run = Some(now_millis());
            state.status.consecutive_failures = 0;
            info!(removed, "Automatic cache cleanup completed");
            Ok(removed)
        }
        Err(e) => {
            let failures = {
                let mut state = state.lock();
                state.status.consecutive_failures += 1;
                state.status.consecutive_failures
            };
            warn!(error = %e, failures, "Automatic cache cleanup failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CacheError, RecoveryHint};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` calls, then reports `removed`
    struct FakeSweep {
        calls: AtomicUsize,
        failures: usize,
        removed: usize,
    }

    impl FakeSweep {
        fn new(failures: usize, removed: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failures,
                removed,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExpirySweep for FakeSweep {
        async fn sweep_expired(&self, _cancel: &CancellationToken) -> Result<usize> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(CacheError::io(
                    "/cache",
                    "list metadata",
                    std::io::Error::other("disk gone"),
                ));
            }
            Ok(self.removed)
        }
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            retry_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_after_one_interval() {
        let sweep = FakeSweep::new(0, 2);
        let scheduler = CleanupScheduler::new(sweep.clone());
        scheduler.schedule(Duration::from_secs(60));
        assert!(scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sweep.calls(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(sweep.calls(), 1);

        let status = scheduler.status();
        assert_eq!(status.runs, 1);
        assert_eq!(status.last_removed, 2);
        assert!(status.last_run.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let sweep = FakeSweep::new(2, 1);
        let scheduler = CleanupScheduler::new(sweep.clone()).with_retry_policy(fast_retry(3));
        scheduler.schedule(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(sweep.calls(), 3);
        let status = scheduler.status();
        assert_eq!(status.runs, 1);
        assert_eq!(status.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let sweep = FakeSweep::new(usize::MAX, 0);
        let scheduler = CleanupScheduler::new(sweep.clone()).with_retry_policy(fast_retry(2));
        scheduler.schedule(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(sweep.calls(), 3);
        let status = scheduler.status();
        assert_eq!(status.runs, 0);
        assert_eq!(status.consecutive_failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_runs() {
        let sweep = FakeSweep::new(0, 0);
        let scheduler = CleanupScheduler::new(sweep.clone());
        scheduler.schedule(Duration::from_secs(10));
        scheduler.cancel();
        assert!(!scheduler.is_scheduled());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sweep.calls(), 0);
    }

    /// Takes `duration` per sweep and ignores cancellation
    struct SlowSweep {
        duration: Duration,
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    #[async_trait]
    impl ExpirySweep for SlowSweep {
        async fn sweep_expired(&self, _cancel: &CancellationToken) -> Result<usize> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.duration).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_waits_for_sweep_in_progress() {
        let sweep = Arc::new(SlowSweep {
            duration: Duration::from_millis(300),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        });
        let scheduler = CleanupScheduler::new(sweep.clone());
        scheduler.schedule(Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(sweep.started.load(Ordering::SeqCst), 1);
        assert_eq!(sweep.finished.load(Ordering::SeqCst), 0);

        scheduler.cancel();
        scheduler.join().await;

        assert_eq!(sweep.finished.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.status().runs, 1);
        assert!(!scheduler.is_scheduled());
    }

    #[tokio::test]
    async fn test_trigger_now_updates_status() {
        let sweep = FakeSweep::new(1, 4);
        let scheduler = CleanupScheduler::new(sweep.clone());

        let err = scheduler.trigger_now().await.unwrap_err();
        assert!(matches!(
            err.recovery_hint(),
            RecoveryHint::Retry { .. }
        ));
        assert_eq!(scheduler.status().consecutive_failures, 1);

        assert_eq!(scheduler.trigger_now().await.unwrap(), 4);
        assert_eq!(scheduler.status().runs, 1);
        assert!(!scheduler.is_scheduled());
    }

    #[tokio::test]
    async fn test_for_config_honours_auto_clean() {
        let sweep = FakeSweep::new(0, 0);
        let scheduler = CleanupScheduler::for_config(sweep.clone(), &CacheConfig::permanent());
        assert!(!scheduler.is_scheduled());

        let scheduler = CleanupScheduler::for_config(sweep, &CacheConfig::default());
        assert!(scheduler.is_scheduled());
    }
}
