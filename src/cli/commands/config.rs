//! Config command implementation.

use crate::models::config::{self, Config};
use crate::utils::fs::ensure_directory;
use crate::{Error, Result};
use colored::Colorize;
use std::path::PathBuf;
use url::Url;

/// Print the active configuration.
pub async fn show() -> Result<()> {
    let config = config::load_config();

    println!("{}", "⚙ Configuration".bold().cyan());
    println!("  {} {}", "Base URL:".bold(), config.base_url);
    println!("  {} {}", "Download dir:".bold(), config.download_dir.display());
    println!(
        "  {} {}s",
        "Resolve timeout:".bold(),
        config.resolve_timeout_secs
    );
    println!(
        "  {} {}",
        "Parallel downloads:".bold(),
        config.max_parallel_downloads
    );
    println!("  {} {}", "Segment retries:".bold(), config.segment_retries);
    println!();
    println!(
        "  {} {}",
        "File:".dimmed(),
        config::config_dir().join("config.toml").display()
    );
    Ok(())
}

/// Change the portal base URL. The portal hops domains regularly, so this
/// is the first thing to try when every request starts failing.
pub async fn set_base_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;
    if parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(url.to_string()));
    }

    let mut config = config::load_config();
    config.base_url = url.trim_end_matches('/').to_string();
    save(config)
}

/// Change the directory downloads are written into. The directory must
/// already exist so a typo does not silently scatter files.
pub async fn set_download_dir(dir: &str) -> Result<()> {
    let path = PathBuf::from(dir);
    ensure_directory(&path)?;

    let mut config = config::load_config();
    config.download_dir = path;
    save(config)
}

fn save(config: Config) -> Result<()> {
    config::save_config(&config)?;
    println!("{}", "Configuration saved.".green());
    Ok(())
}
