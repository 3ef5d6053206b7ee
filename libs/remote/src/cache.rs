//! Time-boxed read-through cache for remote documents.
//!
//! Entries are JSON files named after their key. A fresh entry is served
//! from disk; otherwise the document is fetched and written back. When the
//! fetch fails, a stale entry is still preferred over an error.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::RemoteError;

/// Default lifetime of a cache entry (one week).
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// File-backed cache.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// Create a cache rooted at `dir` whose entries stay fresh for `ttl`.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Create a cache with the default one-week lifetime.
    pub fn with_default_ttl(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, DEFAULT_TTL)
    }

    /// Path of the file backing `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Return the cached value for `key`, fetching it when missing or stale.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T, RemoteError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let path = self.entry_path(key);

        if self.is_fresh(&path).await {
            match read_entry(&path).await {
                Ok(value) => {
                    debug!(key, "Loaded from cache");
                    return Ok(value);
                }
                Err(e) => warn!(key, error = %e, "Ignoring unreadable cache entry"),
            }
        }

        match fetch().await {
            Ok(value) => {
                if let Err(e) = self.write_entry(&path, &value).await {
                    warn!(key, error = %e, "Failed to write cache entry");
                } else {
                    debug!(key, "Wrote cache entry");
                }
                Ok(value)
            }
            Err(fetch_err) => {
                warn!(key, error = %fetch_err, "Could not refresh cache entry");
                match read_entry(&path).await {
                    Ok(value) => Ok(value),
                    Err(_) => Err(fetch_err),
                }
            }
        }
    }

    async fn is_fresh(&self, path: &Path) -> bool {
        let Ok(meta) = tokio::fs::metadata(path).await else {
            return false;
        };
        let Ok(modified) = meta.modified() else {
            return false;
        };
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age < self.ttl)
            .unwrap_or(!self.ttl.is_zero())
    }

    async fn write_entry<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), RemoteError> {
        let cache_err = |source| RemoteError::Cache {
            path: path.to_path_buf(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(cache_err)?;
        let contents = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(path, contents).await.map_err(cache_err)
    }
}

async fn read_entry<T: DeserializeOwned>(path: &Path) -> Result<T, RemoteError> {
    let contents = tokio::fs::read(path).await.map_err(|source| RemoteError::Cache {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&contents)?)
}
