// Wires cache, fetcher, coordinator and scheduler together from one config.

use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::cache::ImageCache;
use super::coordinator::CacheCoordinator;
use super::downloader::Fetcher;
use super::scheduler::RefreshScheduler;
use super::stats::{FetchSnapshot, FetchStats};
use crate::config::ImageCacheConfig;
use crate::detect::image::content_type_for;
use crate::error::FetchError;
use crate::source::http_source::HttpImageSource;
use crate::source::traits::ImageSource;

/// Cached image bytes ready to be sent.
pub struct ServedImage {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

pub struct ImageService {
    config: ImageCacheConfig,
    cache: Arc<ImageCache>,
    fetcher: Arc<Fetcher>,
    coordinator: CacheCoordinator,
    stats: Arc<FetchStats>,
}

impl ImageService {
    pub fn new(config: ImageCacheConfig, source: Arc<dyn ImageSource>) -> Self {
        let cache = Arc::new(ImageCache::new(&config));
        let stats = Arc::new(FetchStats::new());
        let fetcher = Arc::new(Fetcher::new(source, cache.clone(), stats.clone()));
        let coordinator = CacheCoordinator::new(cache.clone(), fetcher.clone());

        Self {
            config,
            cache,
            fetcher,
            coordinator,
            stats,
        }
    }

    /// Service backed by an HTTP source at `config.source_url`.
    pub fn http(config: ImageCacheConfig) -> Result<Self, FetchError> {
        let source = HttpImageSource::new(config.source_url.clone(), config.fetch_timeout)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub async fn ensure_fresh(&self) -> Result<(), FetchError> {
        self.coordinator.ensure_fresh().await
    }

    /// Unconditional refresh, bypassing the freshness check.
    pub async fn download(&self) -> Result<(), FetchError> {
        self.fetcher.download().await
    }

    pub async fn is_stale(&self) -> bool {
        self.cache.is_stale().await
    }

    /// Load the artifact as it is on disk, without checking freshness.
    pub async fn load(&self) -> std::io::Result<ServedImage> {
        let bytes = self.cache.read().await?;
        let content_type = content_type_for(self.cache.path(), &bytes);
        Ok(ServedImage {
            bytes,
            content_type,
        })
    }

    /// Start the periodic refresh; it stops when `shutdown_token` is cancelled.
    pub fn spawn_scheduler(&self, shutdown_token: CancellationToken) -> JoinHandle<()> {
        RefreshScheduler::new(
            self.fetcher.clone(),
            self.config.refresh_interval,
            shutdown_token,
        )
        .spawn()
    }

    pub fn stats(&self) -> FetchSnapshot {
        self.stats.snapshot()
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }
}
