use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Address the HTTP server listens on.
pub const LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Directory holding the cached image.
pub const CACHE_DIR: &str = "/app/cache";

/// File name of the cached image inside [`CACHE_DIR`].
pub const IMAGE_FILE_NAME: &str = "current.jpg";

/// Remote endpoint that returns a random picture.
pub const IMAGE_SOURCE_URL: &str = "https://picsum.photos/1200";

/// Age after which the cached image is refetched on demand (60 minutes).
pub const STALENESS_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Period of the unconditional background refresh (60 minutes).
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Upper bound for a single outbound image request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of a todo, counted in characters.
pub const MAX_TODO_LENGTH: usize = 140;

/// Settings shared by every piece of the image cache.
#[derive(Debug, Clone)]
pub struct ImageCacheConfig {
    /// Directory created on demand before each freshness check.
    pub cache_dir: PathBuf,
    /// Name of the artifact file inside `cache_dir`.
    pub file_name: String,
    /// URL the fetcher downloads from.
    pub source_url: String,
    /// Artifacts older than this are refetched on the request path.
    pub max_age: Duration,
    /// Period of the background refresh.
    pub refresh_interval: Duration,
    /// Timeout applied to each outbound request.
    pub fetch_timeout: Duration,
}

impl ImageCacheConfig {
    /// Config rooted at `cache_dir`, everything else at reference values.
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn image_path(&self) -> PathBuf {
        self.cache_dir.join(&self.file_name)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(CACHE_DIR),
            file_name: IMAGE_FILE_NAME.to_string(),
            source_url: IMAGE_SOURCE_URL.to_string(),
            max_age: STALENESS_THRESHOLD,
            refresh_interval: REFRESH_INTERVAL,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}

/// PostgreSQL connection parameters, read from `POSTGRES_*` variables.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    /// Read the connection parameters from the environment.
    ///
    /// Unset variables are treated as empty strings.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            host: get("POSTGRES_HOST"),
            user: get("POSTGRES_USER"),
            password: get("POSTGRES_PASSWORD"),
            database: get("POSTGRES_DB"),
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new().ssl_mode(PgSslMode::Disable);
        if !self.host.is_empty() {
            options = options.host(&self.host);
        }
        if !self.user.is_empty() {
            options = options.username(&self.user);
        }
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if !self.database.is_empty() {
            options = options.database(&self.database);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_image_path() {
        let config = ImageCacheConfig::default();
        assert_eq!(config.image_path(), PathBuf::from("/app/cache/current.jpg"));
        assert_eq!(config.max_age, Duration::from_secs(3600));
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_with_cache_dir_keeps_reference_values() {
        let config = ImageCacheConfig::with_cache_dir("/tmp/x");
        assert_eq!(config.image_path(), PathBuf::from("/tmp/x/current.jpg"));
        assert_eq!(config.source_url, IMAGE_SOURCE_URL);
    }

    #[test]
    fn test_database_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_USER", "app"),
            ("POSTGRES_DB", "todos"),
        ]
        .into_iter()
        .collect();

        let config = DatabaseConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.host, "db");
        assert_eq!(config.user, "app");
        assert_eq!(config.password, "");
        assert_eq!(config.database, "todos");
    }
}
