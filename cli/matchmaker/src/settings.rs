//! Environment-driven settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use matchmaker_remote::bga::{BgaConfig, DEFAULT_BASE_URL};
use matchmaker_remote::FileCache;

const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Settings read from `MATCHMAKER_*` variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Remote service URL.
    pub base_url: String,

    /// Fixed pause before every remote call.
    pub request_delay: Duration,

    /// Where the game catalog and option schemas are cached. `None` disables
    /// the cache.
    pub cache_dir: Option<PathBuf>,

    /// How long cached documents stay fresh.
    pub cache_ttl: Duration,

    /// Log level (trace, debug, info, warn, error) when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let number = |key: &str, default: u64| -> Result<u64> {
            match var(key) {
                Some(s) => s
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a whole number, got {s:?}")),
                None => Ok(default),
            }
        };

        let base_url = var("MATCHMAKER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_delay = Duration::from_millis(number(
            "MATCHMAKER_REQUEST_DELAY_MS",
            DEFAULT_REQUEST_DELAY_MS,
        )?);

        let cache_dir = var("MATCHMAKER_CACHE_DIR").map(PathBuf::from).or_else(|| {
            ProjectDirs::from("com", "matchmaker", "matchmaker")
                .map(|dirs| dirs.cache_dir().to_path_buf())
        });

        let cache_ttl = Duration::from_secs(number(
            "MATCHMAKER_CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
        )?);

        let log_level = var("MATCHMAKER_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match var("MATCHMAKER_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            base_url,
            request_delay,
            cache_dir,
            cache_ttl,
            log_level,
            log_format,
        })
    }

    pub fn remote(&self) -> BgaConfig {
        BgaConfig {
            base_url: self.base_url.clone(),
            request_delay: self.request_delay,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn cache(&self) -> Option<FileCache> {
        self.cache_dir
            .as_ref()
            .map(|dir| FileCache::new(dir, self.cache_ttl))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn try_settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    fn settings(vars: &[(&str, &str)]) -> Settings {
        try_settings(vars).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.request_delay, Duration::from_secs(1));
        assert_eq!(settings.cache_ttl, Duration::from_secs(604_800));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("MATCHMAKER_BASE_URL", "http://localhost:9000"),
            ("MATCHMAKER_REQUEST_DELAY_MS", "0"),
            ("MATCHMAKER_CACHE_DIR", "/tmp/mm-cache"),
            ("MATCHMAKER_CACHE_TTL_SECS", "60"),
            ("MATCHMAKER_LOG_FORMAT", "json"),
        ]);
        assert_eq!(settings.remote().base_url, "http://localhost:9000");
        assert_eq!(settings.remote().request_delay, Duration::ZERO);
        assert_eq!(settings.cache_dir, Some(PathBuf::from("/tmp/mm-cache")));
        assert_eq!(
            settings.cache().unwrap().entry_path("game-list"),
            PathBuf::from("/tmp/mm-cache/game-list.json")
        );
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[rstest]
    #[case("MATCHMAKER_REQUEST_DELAY_MS", "soon")]
    #[case("MATCHMAKER_CACHE_TTL_SECS", "-5")]
    fn test_unparseable_numbers_are_rejected(#[case] key: &str, #[case] value: &str) {
        let err = try_settings(&[(key, value)]).unwrap_err();
        assert!(err.to_string().contains(key), "{err}");
    }
}
