//! Favorites command implementation: the saved-series list.

use super::Context;
use crate::models::favorite::FavoriteRecord;
use crate::Result;
use colored::Colorize;
use tracing::debug;

/// List saved series, most recently added first.
pub async fn list() -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.favorite_store()?;

    let records = store.all();
    if records.is_empty() {
        println!("No saved series.");
        return Ok(());
    }

    println!("{}", "★ My list".bold().cyan());
    for record in records {
        println!(
            "  {} {}",
            record.title.as_deref().unwrap_or("(untitled)").bold(),
            record.series_url.dimmed()
        );
    }
    Ok(())
}

/// Save a series. The portal is consulted for the title and poster, but a
/// failed fetch still saves the bare URL.
pub async fn add(url: &str) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.favorite_store()?;

    let (title, thumbnail_url) = match ctx.source.details(url).await {
        Ok(series) => {
            let title = (!series.title.is_empty()).then_some(series.title);
            (title, series.thumbnail_url)
        }
        Err(err) => {
            debug!(url, %err, "details fetch failed, saving bare url");
            (None, None)
        }
    };

    let already_saved = store.contains(url);
    store.add(FavoriteRecord::new(url, title.clone(), thumbnail_url))?;

    let label = title.as_deref().unwrap_or(url);
    if already_saved {
        println!("{} {}", "Refreshed:".yellow(), label.bold());
    } else {
        println!("{} {}", "★ Saved:".green(), label.bold());
    }
    Ok(())
}

/// Remove a saved series.
pub async fn remove(url: &str) -> Result<()> {
    let ctx = Context::new()?;
    let store = ctx.favorite_store()?;
    store.remove(url)?;
    println!("Removed {url} from my list");
    Ok(())
}
