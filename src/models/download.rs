//! Download lifecycle state machine and persisted download records.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an episode download.
///
/// Transitions are forward-only; see [`DownloadState::can_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    NotDownloaded,
    Queued,
    Downloading,
    Completed,
    Failed,
    Paused,
}

impl DownloadState {
    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// The state machine only moves forward:
    /// not-downloaded -> queued -> downloading -> {completed | failed | paused},
    /// with paused allowed back into queued/downloading for resume. A queued
    /// download may also fail directly (e.g. the media URL cannot be resolved).
    pub fn can_transition(self, to: DownloadState) -> bool {
        use DownloadState::*;
        match (self, to) {
            (NotDownloaded, Queued) => true,
            (Queued, Downloading) | (Queued, Failed) => true,
            (Downloading, Completed) | (Downloading, Failed) | (Downloading, Paused) => true,
            (Paused, Queued) | (Paused, Downloading) => true,
            _ => false,
        }
    }

    /// Completed and failed are terminal; paused is resumable.
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadState::Completed | DownloadState::Failed)
    }
}

impl Default for DownloadState {
    fn default() -> Self {
        DownloadState::NotDownloaded
    }
}

/// Persisted download row, keyed by episode URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Episode page URL (source-relative); primary key.
    pub episode_url: String,
    pub series_title: String,
    pub episode_name: Option<String>,
    pub thumbnail_url: Option<String>,
    pub state: DownloadState,
    /// Integer percentage, monotonic non-decreasing while downloading.
    pub progress: u8,
    /// Final output file once completed (or partially written when paused).
    pub local_path: Option<String>,
    /// The HLS media URL that was actually fetched; distinct from the page URL.
    pub media_uri: Option<String>,
    /// Number of fully written segments; resume starts at this index.
    #[serde(default)]
    pub segments_done: usize,
    /// Bytes written for the completed segments; the file is truncated to
    /// this length before a resume.
    #[serde(default)]
    pub bytes_written: u64,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl DownloadRecord {
    pub fn new(episode_url: impl Into<String>, series_title: impl Into<String>) -> Self {
        Self {
            episode_url: episode_url.into(),
            series_title: series_title.into(),
            episode_name: None,
            thumbnail_url: None,
            state: DownloadState::NotDownloaded,
            progress: 0,
            local_path: None,
            media_uri: None,
            segments_done: 0,
            bytes_written: 0,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Apply a state transition, rejecting anything the state machine forbids.
    pub fn transition(&mut self, to: DownloadState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(Error::InvalidStateTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.touch();
        Ok(())
    }

    /// Update progress; regressions while downloading are rejected.
    pub fn set_progress(&mut self, progress: u8) -> Result<()> {
        let progress = progress.min(100);
        if self.state == DownloadState::Downloading && progress < self.progress {
            return Err(Error::ProgressRegression {
                current: self.progress,
                requested: progress,
            });
        }
        self.progress = progress;
        self.touch();
        Ok(())
    }

    /// Record the resume point after a pause or a completed segment.
    pub fn set_resume_point(&mut self, segments_done: usize, bytes_written: u64) {
        self.segments_done = segments_done;
        self.bytes_written = bytes_written;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
