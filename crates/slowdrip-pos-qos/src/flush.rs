//! Periodic QoS flush.
//!
//! Spawns a tokio task that calls [`Aggregator::flush`] on a fixed cadence
//! until shut down. Missed ticks are skipped rather than bunched up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::config::MIN_FLUSH_INTERVAL;
use crate::error::{ConfigError, Result};

/// Handle to a running flush loop.
pub struct FlushTask {
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FlushTask {
    /// Start flushing `aggregator` every `cadence`. The first flush happens
    /// one full period after start.
    ///
    /// Fails if `cadence` is below the flush floor. Must be called from
    /// within a tokio runtime.
    pub fn spawn(aggregator: Arc<Aggregator>, cadence: Duration) -> Result<Self> {
        if cadence < MIN_FLUSH_INTERVAL {
            return Err(ConfigError::FlushIntervalTooSmall {
                got: cadence,
                min: MIN_FLUSH_INTERVAL,
            });
        }

        let (tx, mut rx) = watch::channel(false);
        let worker = tokio::spawn(async move {
            info!(cadence_ms = cadence.as_millis() as u64, "qos flush started");
            let mut ticker = time::interval_at(Instant::now() + cadence, cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        aggregator.flush();
                    }
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("qos flush stopping");
        });

        Ok(Self {
            shutdown: tx,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Start flushing at the aggregator's configured interval.
    pub fn spawn_configured(aggregator: Arc<Aggregator>) -> Result<Self> {
        let cadence = aggregator.config().flush_interval;
        Self::spawn(aggregator, cadence)
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// Returns the worker's failure if it panicked. Later calls return `Ok`.
    pub async fn shutdown(&self) -> std::result::Result<(), JoinError> {
        // Err means the loop already exited and dropped its receiver.
        let _ = self.shutdown.send(true);
        let Some(handle) = self.worker.lock().await.take() else {
            return Ok(());
        };
        handle.await.map_err(|err| {
            warn!(%err, "qos flush worker failed");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slowdrip_pos_core::SegmentObservation;
    use std::time::UNIX_EPOCH;

    fn observation() -> SegmentObservation {
        let t = UNIX_EPOCH + Duration::from_secs(10);
        SegmentObservation {
            path: "live/stream".to_string(),
            seq: 1,
            size: 42,
            deadline: t,
            recv: t,
            commit: [1; 32],
            meta: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_flushes_on_cadence() {
        let agg = Arc::new(Aggregator::default());
        agg.record(&observation());

        let task = FlushTask::spawn(Arc::clone(&agg), Duration::from_secs(10)).unwrap();
        tokio::task::yield_now().await;
        assert!(agg.last_flush().is_none(), "no flush before the first period");

        time::sleep(Duration::from_secs(11)).await;
        assert!(agg.last_flush().is_some());

        task.shutdown().await.unwrap();
        task.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_flushing() {
        let agg = Arc::new(Aggregator::default());
        let task = FlushTask::spawn_configured(Arc::clone(&agg)).unwrap();
        task.shutdown().await.unwrap();

        time::sleep(Duration::from_secs(60)).await;
        assert!(agg.last_flush().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_below_floor_is_refused() {
        let agg = Arc::new(Aggregator::default());

        for cadence in [Duration::ZERO, MIN_FLUSH_INTERVAL - Duration::from_millis(1)] {
            let err = FlushTask::spawn(Arc::clone(&agg), cadence).err();
            assert_eq!(
                err,
                Some(ConfigError::FlushIntervalTooSmall {
                    got: cadence,
                    min: MIN_FLUSH_INTERVAL,
                })
            );
        }

        let task = FlushTask::spawn(Arc::clone(&agg), MIN_FLUSH_INTERVAL).unwrap();
        time::sleep(MIN_FLUSH_INTERVAL * 2).await;
        assert!(agg.last_flush().is_some());
        task.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_reports_worker_panic() {
        let (tx, _rx) = watch::channel(false);
        let task = FlushTask {
            shutdown: tx,
            worker: Mutex::new(Some(tokio::spawn(async { panic!("flush blew up") }))),
        };

        let err = task.shutdown().await.unwrap_err();
        assert!(err.is_panic());
        task.shutdown().await.unwrap();
    }
}
