//! Browse command implementation.

use super::Context;
use crate::cli::args::CatalogKind;
use crate::models::media::SeriesPage;
use crate::services::source::BrowseKind;
use crate::Result;
use colored::Colorize;

/// Browse one page of a catalog listing or an arbitrary section path.
pub async fn browse(kind: CatalogKind, section: Option<&str>, page: u32) -> Result<()> {
    let ctx = Context::new()?;

    println!("{}", format!("📚 Catalog, page {page}").bold().cyan());
    println!();

    let result = match section {
        Some(path) => ctx.source.section(path, page).await?,
        None => {
            let kind = match kind {
                CatalogKind::Series => BrowseKind::Series,
                CatalogKind::Movies => BrowseKind::Movies,
                CatalogKind::Recent => BrowseKind::Recent,
            };
            ctx.source.browse(kind, page).await?
        }
    };
    print_series_page(&result, page);
    Ok(())
}

/// Show the portal front page: hero slider plus the latest-episodes rail.
pub async fn home() -> Result<()> {
    let ctx = Context::new()?;

    let slider = ctx.source.home_slider().await?;
    if !slider.is_empty() {
        println!("{}", "🌟 Featured".bold().cyan());
        for series in &slider {
            println!("  {}", series.title.bold());
            if let Some(description) = &series.description {
                println!("    {}", description);
            }
            println!("    {}", series.url.dimmed());
        }
        println!();
    }

    let latest = ctx.source.home_latest_episodes().await?;
    if !latest.is_empty() {
        println!("{}", "🆕 Latest episodes".bold().cyan());
        for entry in &latest {
            println!("  {}  {}", entry.title, entry.url.dimmed());
        }
    }

    if slider.is_empty() && latest.is_empty() {
        println!("Nothing found on the front page.");
    }
    Ok(())
}

/// Shared listing printer for browse and search results.
pub(crate) fn print_series_page(result: &SeriesPage, page: u32) {
    if result.series.is_empty() {
        println!("Nothing found.");
        return;
    }

    for series in &result.series {
        println!("  {}", series.title.bold());
        println!("    {}", series.url.dimmed());
    }

    println!();
    println!(
        "{} titles on page {}{}",
        result.series.len(),
        page,
        if result.has_next_page {
            " (more pages available)"
        } else {
            ""
        }
    );
}
