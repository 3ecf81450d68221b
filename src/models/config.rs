//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Desktop User-Agent sent with every portal request. Some embed hosts
/// refuse to serve the player to mobile agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

const DEFAULT_BASE_URL: &str = "https://www.faselhds.life";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Portal base origin; the site moves domains regularly, so this is
    /// user-configurable and persisted.
    pub base_url: String,
    /// User-Agent header for all portal/embed requests.
    pub user_agent: String,
    /// Directory downloads are written into.
    pub download_dir: PathBuf,
    /// Embed resolution deadline in seconds.
    pub resolve_timeout_secs: u64,
    /// Concurrent episode download cap.
    pub max_parallel_downloads: usize,
    /// Per-segment fetch retries before the episode fails.
    pub segment_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            download_dir: dirs::download_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("anigrab"),
            resolve_timeout_secs: 20,
            max_parallel_downloads: 3,
            segment_retries: 3,
        }
    }
}

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anigrab")
}

/// Get the data directory path (download/history records, cookies).
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anigrab")
}

/// Load configuration from file, falling back to defaults.
pub fn load_config() -> Config {
    let config_path = config_dir().join("config.toml");

    if config_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str(&content) {
                return config;
            }
        }
    }

    Config::default()
}

/// Persist configuration to file.
pub fn save_config(config: &Config) -> crate::Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let content = toml::to_string_pretty(config)
        .map_err(|e| crate::Error::other(format!("failed to serialize config: {e}")))?;
    std::fs::write(dir.join("config.toml"), content)?;
    Ok(())
}
