//! Info command implementation.

use super::Context;
use crate::Result;
use colored::Colorize;

/// Print series details and its season list.
pub async fn info(url: &str) -> Result<()> {
    let ctx = Context::new()?;

    let series = ctx.source.details(url).await?;
    let seasons = ctx.source.seasons(url).await?;

    println!("{}", series.title.bold().cyan());
    println!("  {} {:?}", "Status:".bold(), series.status);
    if !series.genres.is_empty() {
        println!("  {} {}", "Genres:".bold(), series.genres.join(", "));
    }
    if let Some(description) = &series.description {
        println!("  {} {}", "About:".bold(), description);
    }
    if let Some(thumbnail) = &series.thumbnail_url {
        println!("  {} {}", "Poster:".bold(), thumbnail.dimmed());
    }

    println!();
    println!("{}", format!("Seasons ({})", seasons.len()).bold());
    for season in &seasons {
        println!("  {}  {}", season.name, season.url.dimmed());
    }

    Ok(())
}
