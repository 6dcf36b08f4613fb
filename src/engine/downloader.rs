// Fetcher: pulls the image from its source and atomically replaces the artifact.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::cache::ImageCache;
use super::stats::FetchStats;
use crate::error::FetchError;
use crate::source::traits::ImageSource;

pub struct Fetcher {
    source: Arc<dyn ImageSource>,
    cache: Arc<ImageCache>,
    stats: Arc<FetchStats>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn ImageSource>, cache: Arc<ImageCache>, stats: Arc<FetchStats>) -> Self {
        Self {
            source,
            cache,
            stats,
        }
    }

    /// Fetch the image and replace the artifact, whatever its current age.
    ///
    /// On failure the previous artifact (if any) is left untouched.
    pub async fn download(&self) -> Result<(), FetchError> {
        let t0 = Instant::now();
        self.stats.record_attempt();

        let result = self.fetch_and_replace().await;
        let elapsed = t0.elapsed();

        match result {
            Ok(len) => {
                self.stats.record_success(len, elapsed);
                info!(
                    "image refreshed from {} ({} bytes) in {:?}",
                    self.source.describe(),
                    len,
                    elapsed
                );
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure(elapsed);
                warn!(
                    "image refresh from {} failed after {:?}: {}",
                    self.source.describe(),
                    elapsed,
                    e
                );
                Err(e)
            }
        }
    }

    async fn fetch_and_replace(&self) -> Result<u64, FetchError> {
        let image = self.source.fetch().await?;
        if let Some(content_type) = &image.content_type {
            debug!("upstream content-type={}", content_type);
        }

        let len = image.bytes.len() as u64;
        let dir = self.cache.dir().to_path_buf();
        let path = self.cache.path().to_path_buf();

        tokio::task::spawn_blocking(move || replace_file(&dir, &path, &image.bytes)).await??;
        Ok(len)
    }
}

/// Write `data` to a temp file in `dir`, then rename it over `path`.
///
/// Readers see either the previous file or the complete new one.
fn replace_file(dir: &Path, path: &Path, data: &[u8]) -> Result<(), FetchError> {
    let write_error = |source| FetchError::Write {
        path: PathBuf::from(path),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".image-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(write_error)?;
    tmp.write_all(data).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
