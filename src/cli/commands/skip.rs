//! Skip command implementation.

use super::Context;
use crate::core::skip::SkipService;
use crate::Result;
use colored::Colorize;

/// Look up opening/ending skip intervals for one episode.
pub async fn skip(series_url: &str, episode: u32, duration_mins: u64) -> Result<()> {
    let ctx = Context::new()?;
    let series = ctx.source.details(series_url).await?;

    println!(
        "{}",
        format!("⏭  Skip intervals for {} episode {episode}", series.title)
            .bold()
            .cyan()
    );

    let service = SkipService::new();
    let stamps = service
        .stamps(series_url, &series.title, episode, duration_mins * 60 * 1000)
        .await;

    if stamps.is_empty() {
        println!("No skip data found.");
        return Ok(());
    }

    for stamp in stamps {
        println!(
            "  {:<14} {} - {}",
            stamp.kind.label().bold(),
            format_secs(stamp.start_ms),
            format_secs(stamp.end_ms)
        );
    }
    Ok(())
}

fn format_secs(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
