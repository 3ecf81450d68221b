//! Download command implementation.

use super::resolve::resolve_videos;
use super::Context;
use crate::core::downloader::{CancelFlag, Downloader};
use crate::models::download::{DownloadRecord, DownloadState};
use crate::services::source::parse_details;
use crate::store::DownloadStore;
use crate::utils::fs::episode_output_path;
use crate::{Error, Result};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Download one or more episodes as local files.
///
/// A single episode gets a progress bar and Ctrl-C pausing; a batch runs
/// with concurrency capped by the configured parallel download limit.
pub async fn download(urls: &[String], quality: Option<&str>) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.download_store()?;

    if let [url] = urls {
        queue_episode(&ctx, &store, url, quality).await?;
        return run_one(&ctx, store, url).await;
    }

    for url in urls {
        println!("{}", format!("⏬ Queueing {url}...").bold().cyan());
        if let Err(err) = queue_episode(&ctx, &store, url, quality).await {
            println!("  {} {err}", "skipped:".yellow());
        }
    }

    let queued: Vec<String> = store
        .all()
        .into_iter()
        .filter(|r| {
            urls.contains(&r.episode_url)
                && matches!(r.state, DownloadState::Queued | DownloadState::Paused)
        })
        .map(|r| r.episode_url)
        .collect();
    if queued.is_empty() {
        return Err(Error::other("nothing to download"));
    }

    let downloader = Arc::new(Downloader::new(
        ctx.http.clone(),
        store,
        ctx.config.segment_retries,
    ));
    let outcomes: Vec<(String, Result<DownloadState>)> = stream::iter(queued)
        .map(|url| {
            let downloader = downloader.clone();
            async move {
                let outcome = downloader.run(&url, CancelFlag::new(), None).await;
                (url, outcome)
            }
        })
        .buffer_unordered(ctx.config.max_parallel_downloads)
        .collect()
        .await;

    let mut failed = 0;
    for (url, outcome) in outcomes {
        match outcome {
            Ok(DownloadState::Completed) => println!("  {} {url}", "done".green()),
            Ok(state) => println!("  {} {url}", format!("{state:?}").to_lowercase().yellow()),
            Err(err) => {
                failed += 1;
                println!("  {} {url}: {err}", "failed".red());
            }
        }
    }
    if failed > 0 {
        return Err(Error::other(format!("{failed} downloads failed")));
    }
    Ok(())
}

/// Resolve an episode's stream and leave a Queued (or resumable Paused)
/// record behind.
async fn queue_episode(
    ctx: &Context,
    store: &Arc<DownloadStore>,
    url: &str,
    quality: Option<&str>,
) -> Result<()> {
    if let Some(record) = store.get(url) {
        match record.state {
            DownloadState::Completed => {
                println!(
                    "{} {}",
                    "Already downloaded:".green(),
                    record.local_path.as_deref().unwrap_or("(unknown path)")
                );
                return Ok(());
            }
            DownloadState::Downloading => {
                return Err(Error::other("another download for this episode is running"));
            }
            // A paused record keeps its media URI and resume point.
            DownloadState::Paused => return Ok(()),
            _ => {}
        }
    }

    println!("{}", "⏬ Resolving stream...".bold().cyan());
    let videos = resolve_videos(ctx, url).await?;
    if videos.is_empty() {
        return Err(Error::NoVideoFound(url.to_string()));
    }

    // Variants arrive best-first; an explicit quality narrows the pick.
    let video = match quality {
        Some(wanted) => videos
            .iter()
            .find(|v| v.quality.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::other(format!(
                    "quality {wanted} not available (have: {})",
                    videos
                        .iter()
                        .map(|v| v.quality.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?,
        None => &videos[0],
    };
    println!("  {} {} ({})", "Picked:".bold(), video.quality, video.url.dimmed());

    // The episode page carries the same metadata block as the series page,
    // which is enough for the output file name.
    let page_html = ctx.http.get_text(&ctx.source.absolutize(url)).await?;
    let details = parse_details(&page_html);
    let series_title = if details.title.is_empty() {
        "downloads".to_string()
    } else {
        details.title
    };
    let episode_name = episode_slug(url);

    let output = episode_output_path(&ctx.config.download_dir, &series_title, &episode_name);

    let mut record = store
        .get(url)
        .unwrap_or_else(|| DownloadRecord::new(url, series_title.clone()));
    record.episode_name = Some(episode_name);
    record.thumbnail_url = details.thumbnail_url;
    record.media_uri = Some(video.url.clone());
    record.local_path = Some(output.display().to_string());
    if record.state == DownloadState::NotDownloaded || record.state == DownloadState::Failed {
        record.state = DownloadState::NotDownloaded;
        record.progress = 0;
        record.set_resume_point(0, 0);
        record.transition(DownloadState::Queued)?;
    }
    store.upsert(record)?;
    Ok(())
}

/// Run one queued/paused record to completion with a progress bar and
/// Ctrl-C pausing.
pub(crate) async fn run_one(ctx: &Context, store: Arc<DownloadStore>, url: &str) -> Result<()> {
    let downloader = Downloader::new(ctx.http.clone(), store, ctx.config.segment_retries);

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({eta})",
        )
        .map_err(|e| Error::other(e.to_string()))?
        .progress_chars("#>-"),
    );

    let cancel = CancelFlag::new();
    let ctrl_c_cancel = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let outcome = downloader.run(url, cancel, Some(bar.clone())).await;
    ctrl_c.abort();
    bar.finish_and_clear();

    match outcome {
        Ok(DownloadState::Completed) => {
            println!("{}", "✅ Download complete".green().bold());
            Ok(())
        }
        Ok(DownloadState::Paused) => {
            println!(
                "{}",
                "⏸  Download paused; run `anigrab downloads resume <url>` to continue".yellow()
            );
            Ok(())
        }
        Ok(state) => Err(Error::other(format!(
            "unexpected download outcome: {state:?}"
        ))),
        Err(err) => {
            println!("{} {}", "❌ Download failed:".red().bold(), err);
            Err(err)
        }
    }
}

/// Last non-empty path segment of an episode URL, for the file name.
fn episode_slug(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("episode")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_slug() {
        assert_eq!(episode_slug("https://x.example/series/one-piece-1075/"), "one-piece-1075");
        assert_eq!(episode_slug("/episodes/ep-12"), "ep-12");
        assert_eq!(episode_slug(""), "episode");
    }
}
