//! Error types for anigrab.

use crate::models::download::DownloadState;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for anigrab.
#[derive(Error, Debug)]
pub enum Error {
    // Challenge detection
    #[error("Origin is protected by an anti-bot challenge: {url}")]
    ProtectedOrigin { url: String },

    // Resolution / playlist errors
    #[error("No video source found for: {0}")]
    NoVideoFound(String),

    #[error("Playlist contains no segments: {0}")]
    EmptyPlaylist(String),

    #[error("Failed to parse playlist: {0}")]
    PlaylistParse(String),

    // Download errors
    #[error("Segment fetch failed (HTTP {status}): {url}")]
    SegmentFetch { url: String, status: u16 },

    #[error("Segment decryption failed: {0}")]
    Decrypt(String),

    #[error("Invalid download state transition: {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: DownloadState,
        to: DownloadState,
    },

    #[error("Download progress may not regress: {current}% -> {requested}%")]
    ProgressRegression { current: u8, requested: u8 },

    #[error("No download record for: {0}")]
    RecordNotFound(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // URL errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
