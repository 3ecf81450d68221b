//! Command line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

/// anigrab - stream and download episodes from a scraped portal
#[derive(Parser, Debug)]
#[command(name = "anigrab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CatalogKind {
    /// Popular series
    Series,
    /// Movies
    Movies,
    /// Most recently updated titles
    Recent,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse a catalog listing
    Browse {
        /// Which catalog to browse
        #[arg(short, long, value_enum, default_value = "series")]
        kind: CatalogKind,

        /// Browse an arbitrary portal section path instead (e.g. a genre)
        #[arg(short, long, conflicts_with = "kind")]
        section: Option<String>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show the portal front page (hero slider and latest episodes)
    Home,

    /// Search the portal
    Search {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: String,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Show details and seasons for a series
    Info {
        /// Series page URL (absolute or portal-relative)
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List every episode of a series across all seasons
    Episodes {
        /// Series page URL (absolute or portal-relative)
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Resolve an episode to its playable stream variants
    Resolve {
        /// Episode page URL (absolute or portal-relative)
        #[arg(value_name = "URL")]
        url: String,

        /// Also print a base64 master-playlist data URI for external players
        #[arg(long)]
        master: bool,
    },

    /// Download one or more episodes as local files
    Download {
        /// Episode page URLs (absolute or portal-relative)
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,

        /// Preferred quality label (e.g. 1080p); defaults to the best
        #[arg(short, long)]
        quality: Option<String>,
    },

    /// Manage download records
    Downloads {
        #[command(subcommand)]
        action: DownloadsAction,
    },

    /// Watch history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Saved series ("my list")
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Store a clearance cookie for a challenge-protected origin
    Bypass {
        /// cf_clearance cookie value copied from a real browser session
        #[arg(value_name = "COOKIE")]
        cookie: String,

        /// Origin the cookie belongs to; defaults to the configured base URL
        #[arg(short, long)]
        origin: Option<String>,
    },

    /// Show skip intervals (opening/ending) for an episode
    Skip {
        /// Series page URL
        #[arg(value_name = "SERIES_URL")]
        series_url: String,

        /// Episode number
        #[arg(value_name = "EPISODE")]
        episode: u32,

        /// Episode duration in minutes
        #[arg(short, long, default_value_t = 24)]
        duration_mins: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum DownloadsAction {
    /// List all download records
    List,
    /// Resume a paused download
    Resume {
        #[arg(value_name = "EPISODE_URL")]
        url: String,
    },
    /// Resume every paused download, a few at a time
    ResumeAll,
    /// Re-queue a failed download from scratch
    Retry {
        #[arg(value_name = "EPISODE_URL")]
        url: String,
    },
    /// Remove a download record (keeps the file)
    Remove {
        #[arg(value_name = "EPISODE_URL")]
        url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List watch history, most recent first
    List,
    /// Show the next unwatched episode per series
    Continue,
    /// Record a playback position for an episode
    Mark {
        #[arg(value_name = "EPISODE_URL")]
        url: String,

        /// Playback position in seconds
        #[arg(value_name = "POSITION_SECS")]
        position_secs: u64,

        /// Episode duration in seconds
        #[arg(value_name = "DURATION_SECS")]
        duration_secs: u64,
    },
    /// Remove one history entry
    Remove {
        #[arg(value_name = "EPISODE_URL")]
        url: String,
    },
    /// Wipe the whole watch history
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesAction {
    /// List saved series, most recently added first
    List,
    /// Save a series, fetching its title and poster from the portal
    Add {
        #[arg(value_name = "SERIES_URL")]
        url: String,
    },
    /// Remove a saved series
    Remove {
        #[arg(value_name = "SERIES_URL")]
        url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Change the portal base URL
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Change the download directory
    SetDownloadDir {
        #[arg(value_name = "DIR")]
        dir: String,
    },
}
