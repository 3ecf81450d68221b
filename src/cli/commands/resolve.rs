//! Resolve command implementation.
//!
//! Runs the full pipeline: episode page -> embed page -> direct stream ->
//! quality variants.

use super::Context;
use crate::core::playlist;
use crate::models::media::Video;
use crate::{Error, Result};
use colored::Colorize;

/// Resolve an episode URL to its playable variants and print them.
pub async fn resolve(url: &str, master: bool) -> Result<()> {
    let ctx = Context::new()?;

    let videos = resolve_videos(&ctx, url).await?;
    if videos.is_empty() {
        return Err(Error::NoVideoFound(url.to_string()));
    }

    println!("{}", "🎞  Stream variants".bold().cyan());
    for video in &videos {
        if video.resolution.is_empty() {
            println!("  {:<8} {}", video.quality.bold(), video.url);
        } else {
            println!(
                "  {:<8} {:<10} {}",
                video.quality.bold(),
                video.resolution,
                video.url
            );
        }
    }

    if master {
        println!();
        println!("{}", "Master playlist data URI:".bold());
        println!("{}", playlist::master_data_uri(&videos));
    }

    Ok(())
}

/// Resolve an episode URL to its quality variants, best first.
pub(crate) async fn resolve_videos(ctx: &Context, episode_url: &str) -> Result<Vec<Video>> {
    let embed_url = ctx
        .source
        .embed_url(episode_url)
        .await?
        .ok_or_else(|| Error::NoVideoFound(episode_url.to_string()))?;

    let media_url = ctx.resolver().resolve(&embed_url).await;
    if media_url.is_empty() {
        return Ok(Vec::new());
    }

    Ok(playlist::extract_from_hls(&ctx.http, &media_url).await)
}
