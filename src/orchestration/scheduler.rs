//! Periodic driver for the auto-progress worker.
//!
//! Runs in a single spawned task. Ticks never overlap: with `MissedTickBehavior::Skip` a
//! run that outlasts the period swallows the missed ticks instead of queueing them. The
//! first run happens one full period after spawn. Stopping waits for an in-flight run to
//! finish. A zero period is raised to [`MIN_PERIOD`].

use super::AutoProgressWorker;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Shortest accepted tick period
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Runtime statistics for the scheduler
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Worker runs started
    pub ticks: AtomicU64,
    /// Bookings changed across all runs
    pub bookings_progressed: AtomicU64,
    /// Runs aborted by a scan failure
    pub failed_runs: AtomicU64,
}

impl SchedulerStats {
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn bookings_progressed(&self) -> u64 {
        self.bookings_progressed.load(Ordering::Relaxed)
    }

    pub fn failed_runs(&self) -> u64 {
        self.failed_runs.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct AutoProgressScheduler {
    worker: AutoProgressWorker,
    period: Duration,
    limit: usize,
    performed_by: Option<i64>,
}

impl AutoProgressScheduler {
    pub fn new(worker: AutoProgressWorker, period: Duration, limit: usize) -> Self {
        let period = if period < MIN_PERIOD {
            warn!(requested = ?period, used = ?MIN_PERIOD, "Scheduler period too short, raised");
            MIN_PERIOD
        } else {
            period
        };
        Self {
            worker,
            period,
            limit,
            performed_by: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Attribute simulated transitions to a user instead of the system
    pub fn performed_by(mut self, user_id: Option<i64>) -> Self {
        self.performed_by = user_id;
        self
    }

    /// Start the tick loop on the current runtime
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let stats = Arc::new(SchedulerStats::default());
        let is_running = Arc::new(AtomicBool::new(true));

        info!(
            period_secs = self.period.as_secs(),
            limit = self.limit,
            "Starting auto-progress scheduler"
        );

        let task_stats = stats.clone();
        let task_running = is_running.clone();
        let join = tokio::spawn(async move {
            let _running = RunningFlag(task_running);
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                task_stats.ticks.fetch_add(1, Ordering::Relaxed);
                debug!("Auto-progress tick");

                match self
                    .worker
                    .auto_progress_eligible(self.performed_by, self.limit)
                    .await
                {
                    Ok(progressed) => {
                        task_stats
                            .bookings_progressed
                            .fetch_add(progressed as u64, Ordering::Relaxed);
                    }
                    Err(e) => {
                        task_stats.failed_runs.fetch_add(1, Ordering::Relaxed);
                        error!(error = %e, "Auto-progress run failed");
                    }
                }
            }

            info!("Auto-progress scheduler stopped");
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            join,
            stats,
            is_running,
        }
    }
}

/// Clears the running flag when the tick loop exits, including by panic
struct RunningFlag(Arc<AtomicBool>);

impl Drop for RunningFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Control handle for a spawned scheduler. Dropping it also stops the loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
    stats: Arc<SchedulerStats>,
    is_running: Arc<AtomicBool>,
}

impl SchedulerHandle {
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Signal shutdown and wait for the loop to exit
    pub async fn stop(self) {
        info!("Stopping auto-progress scheduler");
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "Auto-progress scheduler task ended abnormally");
        }
    }
}
