//! Sequential HLS segment downloader with pause/resume support.

use crate::core::hls::{self, HlsDownloadData};
use crate::models::download::DownloadState;
use crate::services::http::HttpClient;
use crate::store::DownloadStore;
use crate::{Error, Result};
use indicatif::ProgressBar;
use std::io::{Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Cooperative cancellation handle shared between the download loop and
/// whoever requested the pause.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Downloads one episode at a time; concurrency across episodes is the
/// caller's concern.
pub struct Downloader {
    http: HttpClient,
    store: Arc<DownloadStore>,
    segment_retries: u32,
}

impl Downloader {
    pub fn new(http: HttpClient, store: Arc<DownloadStore>, segment_retries: u32) -> Self {
        Self {
            http,
            store,
            segment_retries,
        }
    }

    /// Run one queued or paused download to its next terminal state.
    ///
    /// Cancellation pauses the download and keeps the partial file plus its
    /// resume point; any hard error fails the record and removes the file.
    /// A paused record resumes from the last completed segment instead of
    /// restarting.
    pub async fn run(
        &self,
        episode_url: &str,
        cancel: CancelFlag,
        bar: Option<ProgressBar>,
    ) -> Result<DownloadState> {
        let record = self
            .store
            .get(episode_url)
            .ok_or_else(|| Error::RecordNotFound(episode_url.to_string()))?;
        let media_uri = record
            .media_uri
            .clone()
            .ok_or_else(|| Error::other("record has no media url"))?;
        let local_path = record
            .local_path
            .clone()
            .ok_or_else(|| Error::other("record has no output path"))?;

        self.store.update(episode_url, |r| {
            // A re-queued download restarts from scratch; only a paused one
            // keeps its progress and resume point.
            if r.state == DownloadState::Queued {
                r.progress = 0;
                r.set_resume_point(0, 0);
            }
            r.transition(DownloadState::Downloading)
        })?;

        match self
            .download_segments(episode_url, &media_uri, &local_path, &record, cancel, bar)
            .await
        {
            Ok(DownloadState::Paused) => {
                self.store.transition(episode_url, DownloadState::Paused)?;
                info!(url = episode_url, "download paused");
                Ok(DownloadState::Paused)
            }
            Ok(state) => {
                self.store.transition(episode_url, DownloadState::Completed)?;
                info!(url = episode_url, path = %local_path, "download completed");
                Ok(state)
            }
            Err(err) => {
                // Partial output is useless after a hard failure.
                if let Err(io_err) = std::fs::remove_file(&local_path) {
                    if io_err.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %local_path, %io_err, "failed to remove partial file");
                    }
                }
                self.store.update(episode_url, |r| {
                    r.set_resume_point(0, 0);
                    r.transition(DownloadState::Failed)
                })?;
                warn!(url = episode_url, %err, "download failed");
                Err(err)
            }
        }
    }

    async fn download_segments(
        &self,
        episode_url: &str,
        media_uri: &str,
        local_path: &str,
        record: &crate::models::download::DownloadRecord,
        cancel: CancelFlag,
        bar: Option<ProgressBar>,
    ) -> Result<DownloadState> {
        let data = hls::fetch_download_data(&self.http, media_uri).await?;
        let total = data.segments.len();

        let resume_from = if record.state == DownloadState::Paused {
            record.segments_done.min(total)
        } else {
            0
        };

        if let Some(parent) = std::path::Path::new(local_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(local_path)?;
        // Drop anything past the last completed segment; a pause may have
        // left a torn write behind it.
        let resume_bytes = if resume_from > 0 { record.bytes_written } else { 0 };
        file.set_len(resume_bytes)?;
        file.seek(SeekFrom::Start(resume_bytes))?;

        if let Some(bar) = &bar {
            bar.set_length(total as u64);
            bar.set_position(resume_from as u64);
        }
        if resume_from > 0 {
            info!(url = episode_url, segment = resume_from, total, "resuming download");
        }

        let mut bytes_written = resume_bytes;
        let mut last_progress = record.progress;

        for (sequence, segment_url) in data.segments.iter().enumerate().skip(resume_from) {
            if cancel.is_cancelled() {
                file.flush()?;
                self.store.update(episode_url, |r| {
                    r.set_resume_point(sequence, bytes_written);
                    Ok(())
                })?;
                return Ok(DownloadState::Paused);
            }

            let segment = self
                .fetch_with_retries(segment_url, &data, sequence as u64)
                .await?;
            file.write_all(&segment)?;
            bytes_written += segment.len() as u64;

            let done = sequence + 1;
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            let progress = ((done * 100) / total) as u8;
            if progress > last_progress {
                self.store.update(episode_url, |r| {
                    r.set_resume_point(done, bytes_written);
                    r.set_progress(progress)
                })?;
                last_progress = progress;
            }
        }

        file.flush()?;
        self.store.update(episode_url, |r| {
            r.set_resume_point(total, bytes_written);
            r.set_progress(100)
        })?;
        Ok(DownloadState::Completed)
    }

    async fn fetch_with_retries(
        &self,
        url: &str,
        data: &HlsDownloadData,
        sequence: u64,
    ) -> Result<Vec<u8>> {
        let mut last_err = Error::other("no attempt made");
        for attempt in 0..=self.segment_retries {
            if attempt > 0 {
                tokio::time::sleep(RETRY_DELAY).await;
            }
            match hls::fetch_segment(&self.http, url, data, sequence).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) => {
                    warn!(url, sequence, attempt, %err, "segment fetch failed");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}
