// Periodic background refresh, independent of request traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::downloader::Fetcher;

pub struct RefreshScheduler {
    fetcher: Arc<Fetcher>,
    interval: Duration,
    shutdown_token: CancellationToken,
}

impl RefreshScheduler {
    /// `interval` must be non-zero.
    pub fn new(fetcher: Arc<Fetcher>, interval: Duration, shutdown_token: CancellationToken) -> Self {
        Self {
            fetcher,
            interval,
            shutdown_token,
        }
    }

    /// Spawn the refresh loop. It runs until the shutdown token is cancelled.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        // First tick one full interval from now; startup warms the cache itself.
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("image refresh scheduled every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            debug!("scheduled image refresh");
            tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                result = self.fetcher.download() => {
                    if let Err(e) = result {
                        warn!("Failed to update image: {}", e);
                    }
                }
            }
        }

        info!("image refresh scheduler stopped");
    }
}

/// Wait for a spawned scheduler to exit. Returns `false` if it panicked.
pub async fn join_scheduler(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!("image refresh scheduler ended abnormally: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_scheduler_reports_clean_exit() {
        let handle = tokio::spawn(async {});
        assert!(join_scheduler(handle).await);
    }

    #[tokio::test]
    async fn test_join_scheduler_reports_panic() {
        let handle = tokio::spawn(async { panic!("refresh loop crashed") });
        assert!(!join_scheduler(handle).await);
    }
}
