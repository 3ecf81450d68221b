//! History command implementation.

use super::Context;
use crate::models::history::WatchHistoryRecord;
use crate::Result;
use colored::Colorize;

/// List watch history, most recent first.
pub async fn list() -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.history_store()?;

    let records = store.all();
    if records.is_empty() {
        println!("No watch history.");
        return Ok(());
    }

    for record in records {
        let marker = if record.finished {
            "✓".green()
        } else {
            "▶".yellow()
        };
        println!(
            "{} {} — {} ({})",
            marker,
            record.series_title.bold(),
            record.episode_name.as_deref().unwrap_or(&record.episode_url),
            format_position(record.last_position_ms, record.duration_ms)
        );
    }
    Ok(())
}

/// Show what to watch next, one line per series.
pub async fn continue_watching() -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.history_store()?;

    let records = store.latest_per_series();
    if records.is_empty() {
        println!("No watch history.");
        return Ok(());
    }

    println!("{}", "▶ Continue watching".bold().cyan());
    for record in records {
        if record.finished {
            match record.next_episode() {
                Some(next) => {
                    println!("  {} — {}", record.series_title.bold(), next.name);
                    println!("    {}", next.url.dimmed());
                }
                None => {
                    println!(
                        "  {} — {}",
                        record.series_title.bold(),
                        "all caught up".green()
                    );
                }
            }
        } else {
            println!(
                "  {} — {} at {}",
                record.series_title.bold(),
                record.episode_name.as_deref().unwrap_or(&record.episode_url),
                format_position(record.last_position_ms, record.duration_ms)
            );
            println!("    {}", record.episode_url.dimmed());
        }
    }
    Ok(())
}

/// Record a playback position for an episode.
pub async fn mark(url: &str, position_secs: u64, duration_secs: u64) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.history_store()?;

    let record = store.get(url).unwrap_or_else(|| WatchHistoryRecord {
        episode_url: url.to_string(),
        series_url: String::new(),
        series_title: String::new(),
        thumbnail_url: None,
        episode_name: None,
        last_position_ms: 0,
        duration_ms: 0,
        finished: false,
        episode_number: -1.0,
        season_episodes: Vec::new(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    });

    store.save_position(record, position_secs * 1000, duration_secs * 1000)?;
    println!(
        "Marked {} at {}",
        url,
        format_position(position_secs * 1000, duration_secs * 1000)
    );
    Ok(())
}

/// Remove one history entry.
pub async fn remove(url: &str) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.history_store()?;
    store.remove(url)?;
    println!("Removed history for {url}");
    Ok(())
}

/// Wipe the whole watch history.
pub async fn clear() -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.history_store()?;
    let count = store.all().len();
    store.clear()?;
    println!("Cleared {count} history entries.");
    Ok(())
}

fn format_position(position_ms: u64, duration_ms: u64) -> String {
    let fmt = |ms: u64| {
        let secs = ms / 1000;
        format!("{}:{:02}", secs / 60, secs % 60)
    };
    if duration_ms == 0 {
        fmt(position_ms)
    } else {
        format!("{}/{}", fmt(position_ms), fmt(duration_ms))
    }
}
