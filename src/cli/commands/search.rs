//! Search command implementation.

use super::browse::print_series_page;
use super::Context;
use crate::Result;
use colored::Colorize;

/// Search the portal and print one page of results.
pub async fn search(query: &str, page: u32) -> Result<()> {
    let ctx = Context::new()?;

    println!("{}", format!("🔍 Searching for \"{query}\"...").bold().cyan());
    println!();

    let result = ctx.source.search(query, page).await?;
    print_series_page(&result, page);
    Ok(())
}
