//! anigrab CLI
//!
//! A command-line client for a streaming portal: browse, search, resolve
//! episode streams and download them as local files.

use anigrab::cli::{
    args::{Cli, Commands, ConfigAction, DownloadsAction, FavoritesAction, HistoryAction},
    commands::{
        browse, bypass, config, download, downloads, episodes, favorites, history, info, resolve,
        search, skip,
    },
};
use anigrab::Error;
use clap::Parser;
use colored::Colorize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = run(cli).await;

    if let Err(Error::ProtectedOrigin { url }) = &result {
        eprintln!();
        eprintln!(
            "{}",
            format!(
                "The origin serving {url} is protected by an anti-bot challenge.\n\
                 Open it in a browser, solve the challenge, copy the cf_clearance\n\
                 cookie and run: anigrab bypass <COOKIE>"
            )
            .yellow()
        );
    }

    result?;
    Ok(())
}

async fn run(cli: Cli) -> anigrab::Result<()> {
    match cli.command {
        Commands::Browse {
            kind,
            section,
            page,
        } => browse::browse(kind, section.as_deref(), page).await?,
        Commands::Home => browse::home().await?,
        Commands::Search { query, page } => search::search(&query, page).await?,
        Commands::Info { url } => info::info(&url).await?,
        Commands::Episodes { url } => episodes::episodes(&url).await?,
        Commands::Resolve { url, master } => resolve::resolve(&url, master).await?,
        Commands::Download { urls, quality } => {
            download::download(&urls, quality.as_deref()).await?
        }
        Commands::Downloads { action } => match action {
            DownloadsAction::List => downloads::list().await?,
            DownloadsAction::Resume { url } => downloads::resume(&url).await?,
            DownloadsAction::ResumeAll => downloads::resume_all().await?,
            DownloadsAction::Retry { url } => downloads::retry(&url).await?,
            DownloadsAction::Remove { url } => downloads::remove(&url).await?,
        },
        Commands::History { action } => match action {
            HistoryAction::List => history::list().await?,
            HistoryAction::Continue => history::continue_watching().await?,
            HistoryAction::Mark {
                url,
                position_secs,
                duration_secs,
            } => history::mark(&url, position_secs, duration_secs).await?,
            HistoryAction::Remove { url } => history::remove(&url).await?,
            HistoryAction::Clear => history::clear().await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => favorites::list().await?,
            FavoritesAction::Add { url } => favorites::add(&url).await?,
            FavoritesAction::Remove { url } => favorites::remove(&url).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => config::show().await?,
            ConfigAction::SetBaseUrl { url } => config::set_base_url(&url).await?,
            ConfigAction::SetDownloadDir { dir } => config::set_download_dir(&dir).await?,
        },
        Commands::Bypass { cookie, origin } => {
            bypass::bypass(&cookie, origin.as_deref()).await?
        }
        Commands::Skip {
            series_url,
            episode,
            duration_mins,
        } => skip::skip(&series_url, episode, duration_mins).await?,
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("anigrab=debug")
    } else {
        EnvFilter::new("anigrab=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
