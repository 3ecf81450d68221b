//! Downloads command implementation: inspect and manage download records.

use super::download::run_one;
use super::Context;
use crate::models::download::DownloadState;
use crate::utils::fs::format_bytes;
use crate::{Error, Result};
use colored::Colorize;

/// List all download records, most recently updated first.
pub async fn list() -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.download_store()?;

    let records = store.all();
    if records.is_empty() {
        println!("No downloads.");
        return Ok(());
    }

    println!(
        "{:<12} {:<5} {:<10} {:<30} {}",
        "State".bold(),
        "%".bold(),
        "Size".bold(),
        "Series".bold(),
        "Episode URL".bold()
    );
    println!("{}", "-".repeat(110));

    for record in records {
        let state = match record.state {
            DownloadState::Completed => "completed".green(),
            DownloadState::Failed => "failed".red(),
            DownloadState::Paused => "paused".yellow(),
            DownloadState::Downloading => "downloading".cyan(),
            DownloadState::Queued => "queued".normal(),
            DownloadState::NotDownloaded => "pending".dimmed(),
        };
        println!(
            "{:<12} {:<5} {:<10} {:<30} {}",
            state,
            record.progress,
            format_bytes(record.bytes_written),
            truncate(&record.series_title, 28),
            record.episode_url
        );
    }

    Ok(())
}

/// Resume a paused download from its last completed segment.
pub async fn resume(url: &str) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.download_store()?;

    let record = store
        .get(url)
        .ok_or_else(|| Error::RecordNotFound(url.to_string()))?;
    if record.state != DownloadState::Paused {
        return Err(Error::other(format!(
            "download is {:?}, only paused downloads can be resumed",
            record.state
        )));
    }

    println!(
        "{}",
        format!("▶ Resuming from segment {}...", record.segments_done)
            .bold()
            .cyan()
    );
    run_one(&ctx, store, url).await
}

/// Resume every paused download, capped at the configured parallelism.
pub async fn resume_all() -> Result<()> {
    use futures::stream::{self, StreamExt};

    let ctx = Context::new()?;
    let store = ctx.download_store()?;

    let paused: Vec<String> = store
        .all()
        .into_iter()
        .filter(|r| r.state == DownloadState::Paused)
        .map(|r| r.episode_url)
        .collect();
    if paused.is_empty() {
        println!("No paused downloads.");
        return Ok(());
    }

    println!(
        "{}",
        format!("▶ Resuming {} downloads...", paused.len())
            .bold()
            .cyan()
    );

    let downloader = std::sync::Arc::new(crate::core::downloader::Downloader::new(
        ctx.http.clone(),
        store,
        ctx.config.segment_retries,
    ));

    let outcomes: Vec<(String, Result<DownloadState>)> = stream::iter(paused)
        .map(|url| {
            let downloader = downloader.clone();
            async move {
                let outcome = downloader
                    .run(&url, crate::core::downloader::CancelFlag::new(), None)
                    .await;
                (url, outcome)
            }
        })
        .buffer_unordered(ctx.config.max_parallel_downloads)
        .collect()
        .await;

    for (url, outcome) in outcomes {
        match outcome {
            Ok(DownloadState::Completed) => println!("  {} {url}", "done".green()),
            Ok(state) => println!("  {} {url}", format!("{state:?}").to_lowercase().yellow()),
            Err(err) => println!("  {} {url}: {err}", "failed".red()),
        }
    }
    Ok(())
}

/// Re-queue a failed download from scratch.
pub async fn retry(url: &str) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.download_store()?;

    let mut record = store
        .get(url)
        .ok_or_else(|| Error::RecordNotFound(url.to_string()))?;
    if record.state != DownloadState::Failed {
        return Err(Error::other(format!(
            "download is {:?}, only failed downloads can be retried",
            record.state
        )));
    }

    record.state = DownloadState::NotDownloaded;
    record.progress = 0;
    record.set_resume_point(0, 0);
    record.transition(DownloadState::Queued)?;
    store.upsert(record)?;

    println!("{}", "▶ Retrying download...".bold().cyan());
    run_one(&ctx, store, url).await
}

/// Drop a download record, keeping any file on disk.
pub async fn remove(url: &str) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.download_store()?;

    let record = store.remove(url)?;
    println!("Removed record for {}", record.episode_url);
    if let Some(path) = record.local_path {
        println!("File kept at {}", path.dimmed());
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
