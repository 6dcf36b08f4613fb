// On-disk single-slot image cache: artifact location, age and freshness.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use tracing::debug;

use crate::config::ImageCacheConfig;
use crate::error::FetchError;

pub struct ImageCache {
    dir: PathBuf,
    path: PathBuf,
    max_age: Duration,
}

impl ImageCache {
    pub fn new(config: &ImageCacheConfig) -> Self {
        Self {
            dir: config.cache_dir().to_path_buf(),
            path: config.image_path(),
            max_age: config.max_age,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Create the cache directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), FetchError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| FetchError::CacheDir {
                path: self.dir.clone(),
                source,
            })
    }

    /// Last modification time of the artifact, or `None` if it is absent.
    ///
    /// Any metadata error, including the file vanishing mid-check, reads as absent.
    pub async fn modified_at(&self) -> Option<SystemTime> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => match meta.modified() {
                Ok(modified) => Some(modified),
                Err(e) => {
                    debug!("mtime unavailable for {}: {}", self.path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!("stat failed for {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Age of the artifact, or `None` if it is absent.
    pub async fn age(&self) -> Option<Duration> {
        let modified = self.modified_at().await?;
        Some(age_at(modified, SystemTime::now()))
    }

    /// Whether the artifact must be refetched before it is served.
    pub async fn is_stale(&self) -> bool {
        let modified = self.modified_at().await;
        is_stale_at(modified, SystemTime::now(), self.max_age)
    }

    /// Read the whole artifact.
    pub async fn read(&self) -> io::Result<Bytes> {
        tokio::fs::read(&self.path).await.map(Bytes::from)
    }
}

/// Age of a file modified at `modified`, observed at `now`.
/// A timestamp in the future counts as age zero.
pub fn age_at(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Absent artifacts are always stale; present ones once their age exceeds `max_age`.
pub fn is_stale_at(modified: Option<SystemTime>, now: SystemTime, max_age: Duration) -> bool {
    match modified {
        None => true,
        Some(modified) => age_at(modified, now) > max_age,
    }
}
