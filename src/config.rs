// File: src/config.rs
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://assets.checkpoint321.com/poe/translations/";
pub const DEFAULT_SITE_URL: &str = "https://wealthyexile.com/";

/// Runtime knobs. `Default` gives the production values; the CLI overrides
/// individual fields and the store's `translation_url_prefix` overrides
/// `base_url` at load time.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Asset host prefix; dictionaries live at `{base_url}{language}.json`.
    pub base_url: String,
    pub freshness_window: Duration,
    pub debounce: Duration,
    pub version_cache_ttl: Duration,
    pub http_timeout: Duration,
    pub store_path: PathBuf,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            freshness_window: Duration::from_secs(30 * 60),
            debounce: Duration::from_millis(300),
            version_cache_ttl: Duration::from_secs(5 * 60),
            http_timeout: Duration::from_secs(10),
            store_path: default_store_path(),
        }
    }
}

impl OverlayConfig {
    pub fn version_url(&self) -> String {
        join_url(&self.base_url, "version.json")
    }
}

pub fn default_store_path() -> PathBuf {
    let mut path = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("exile-zh");
    path.push("store.bin");
    path
}

/// `prefix` + `file`, tolerating a missing trailing slash on the prefix.
pub fn join_url(prefix: &str, file: &str) -> String {
    if prefix.ends_with('/') {
        format!("{prefix}{file}")
    } else {
        format!("{prefix}/{file}")
    }
}
