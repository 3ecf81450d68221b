//! Episodes command implementation.

use super::Context;
use crate::Result;
use colored::Colorize;

/// List every episode of a series across all of its seasons.
pub async fn episodes(url: &str) -> Result<()> {
    let ctx = Context::new()?;

    let episodes = ctx.source.all_episodes(url).await?;
    if episodes.is_empty() {
        println!("No episodes found.");
        return Ok(());
    }

    let mut current_season: Option<String> = None;
    for episode in &episodes {
        let season = episode.season_label().map(str::to_string);
        if season != current_season {
            if let Some(label) = &season {
                println!("{}", label.bold().cyan());
            }
            current_season = season;
        }
        println!("  {}  {}", episode.name, episode.url.dimmed());
    }

    println!();
    println!("{} episodes total", episodes.len());
    Ok(())
}
