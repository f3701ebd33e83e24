use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use veriguard_application::VerificationCacheService;

/// Shortest interval accepted between two sweeps.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the background task that periodically sweeps the verification
/// cache.
///
/// The first sweep runs one full interval after [`CacheSweeper::start`].
#[derive(Debug)]
pub struct CacheSweeper {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CacheSweeper {
    /// Spawns the sweep task on the current tokio runtime.
    #[must_use]
    pub fn start(cache: VerificationCacheService, interval: Duration) -> Self {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let task = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "verification cache sweeper started");

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        cache.sweep();
                    }
                }
            }

            debug!("verification cache sweeper stopped");
        });

        Self { shutdown_tx, task }
    }

    /// Signals the task to stop and waits until it has exited.
    ///
    /// A sweep already in progress completes first; no sweep starts afterwards.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);

        if let Err(error) = self.task.await {
            warn!(%error, "verification cache sweeper task failed");
        }
    }
}
