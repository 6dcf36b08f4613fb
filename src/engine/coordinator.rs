use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::cache::ImageCache;
use super::downloader::Fetcher;
use crate::error::FetchError;

/// Outcome of the most recent request-path fetch.
#[derive(Default)]
struct LastAttempt {
    generation: u64,
    failure: Option<String>,
}

/// Request-path entry point: makes sure a fresh artifact exists before it is served.
pub struct CacheCoordinator {
    cache: Arc<ImageCache>,
    fetcher: Arc<Fetcher>,
    generation: AtomicU64,
    refresh_lock: Mutex<LastAttempt>,
}

impl CacheCoordinator {
    pub fn new(cache: Arc<ImageCache>, fetcher: Arc<Fetcher>) -> Self {
        Self {
            cache,
            fetcher,
            generation: AtomicU64::new(0),
            refresh_lock: Mutex::new(LastAttempt::default()),
        }
    }

    /// Create the cache directory and refetch the artifact if it is stale.
    ///
    /// A fresh artifact costs one `stat` and nothing else. Callers that queue
    /// up behind an in-flight fetch take its outcome, success or failure,
    /// instead of fetching again.
    pub async fn ensure_fresh(&self) -> Result<(), FetchError> {
        self.cache.ensure_dir().await?;

        if !self.cache.is_stale().await {
            return Ok(());
        }

        let seen = self.generation.load(Ordering::Acquire);
        let mut last = self.refresh_lock.lock().await;

        if last.generation != seen {
            debug!("sharing outcome of concurrent fetch #{}", last.generation);
            return match &last.failure {
                None => Ok(()),
                Some(message) => Err(FetchError::Shared(message.clone())),
            };
        }

        // Double-check after acquiring the lock; the scheduler may have refreshed.
        if !self.cache.is_stale().await {
            debug!("artifact refreshed while waiting");
            return Ok(());
        }

        match self.cache.age().await {
            Some(age) => debug!(
                "artifact stale (age {:?} > {:?}), refetching",
                age,
                self.cache.max_age()
            ),
            None => debug!("artifact missing, fetching"),
        }

        let result = self.fetcher.download().await;

        last.generation += 1;
        last.failure = result.as_ref().err().map(ToString::to_string);
        self.generation.store(last.generation, Ordering::Release);

        result
    }
}
