//! JSON-backed stores for download records, watch history and favorites.
//!
//! Both stores keep their working set in memory and write the whole file
//! atomically (temp file + rename) on every mutation, so a crash never
//! leaves a half-written store behind.

use crate::models::download::{DownloadRecord, DownloadState};
use crate::models::favorite::FavoriteRecord;
use crate::models::history::WatchHistoryRecord;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

fn load_map<T: serde::de::DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_map<T: serde::Serialize>(path: &Path, map: &HashMap<String, T>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Download records keyed by episode URL.
pub struct DownloadStore {
    path: PathBuf,
    records: Mutex<HashMap<String, DownloadRecord>>,
}

impl DownloadStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load_map(&path)?;
        debug!(path = %path.display(), count = records.len(), "download store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, DownloadRecord>) -> Result<T>,
    ) -> Result<T> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::other("download store lock poisoned"))?;
        let out = f(&mut records)?;
        save_map(&self.path, &records)?;
        Ok(out)
    }

    pub fn get(&self, episode_url: &str) -> Option<DownloadRecord> {
        self.records.lock().ok()?.get(episode_url).cloned()
    }

    /// All records, most recently updated first.
    pub fn all(&self) -> Vec<DownloadRecord> {
        let mut records: Vec<DownloadRecord> = self
            .records
            .lock()
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        records
    }

    pub fn upsert(&self, record: DownloadRecord) -> Result<()> {
        self.with_records(|records| {
            records.insert(record.episode_url.clone(), record);
            Ok(())
        })
    }

    pub fn remove(&self, episode_url: &str) -> Result<DownloadRecord> {
        self.with_records(|records| {
            records
                .remove(episode_url)
                .ok_or_else(|| Error::RecordNotFound(episode_url.to_string()))
        })
    }

    /// Mutate one record in place, enforcing its invariants, and persist.
    pub fn update(
        &self,
        episode_url: &str,
        f: impl FnOnce(&mut DownloadRecord) -> Result<()>,
    ) -> Result<DownloadRecord> {
        self.with_records(|records| {
            let record = records
                .get_mut(episode_url)
                .ok_or_else(|| Error::RecordNotFound(episode_url.to_string()))?;
            f(record)?;
            Ok(record.clone())
        })
    }

    pub fn transition(&self, episode_url: &str, to: DownloadState) -> Result<DownloadRecord> {
        self.update(episode_url, |record| record.transition(to))
    }

    pub fn set_progress(&self, episode_url: &str, progress: u8) -> Result<DownloadRecord> {
        self.update(episode_url, |record| record.set_progress(progress))
    }
}

/// Watch history keyed by episode URL.
pub struct HistoryStore {
    path: PathBuf,
    records: Mutex<HashMap<String, WatchHistoryRecord>>,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load_map(&path)?;
        debug!(path = %path.display(), count = records.len(), "history store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn get(&self, episode_url: &str) -> Option<WatchHistoryRecord> {
        self.records.lock().ok()?.get(episode_url).cloned()
    }

    /// Full history, most recently watched first.
    pub fn all(&self) -> Vec<WatchHistoryRecord> {
        let mut records: Vec<WatchHistoryRecord> = self
            .records
            .lock()
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// The most recent entry per series, for a "continue watching" rail.
    pub fn latest_per_series(&self) -> Vec<WatchHistoryRecord> {
        let mut by_series: HashMap<String, WatchHistoryRecord> = HashMap::new();
        for record in self.all() {
            by_series
                .entry(record.series_url.clone())
                .or_insert(record);
        }
        let mut records: Vec<WatchHistoryRecord> = by_series.into_values().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    pub fn upsert(&self, record: WatchHistoryRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::other("history store lock poisoned"))?;
        records.insert(record.episode_url.clone(), record);
        save_map(&self.path, &records)
    }

    /// Record a playback position, creating or refreshing the entry.
    pub fn save_position(
        &self,
        mut record: WatchHistoryRecord,
        position_ms: u64,
        duration_ms: u64,
    ) -> Result<()> {
        record.set_position(position_ms, duration_ms);
        self.upsert(record)
    }

    pub fn remove(&self, episode_url: &str) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::other("history store lock poisoned"))?;
        records
            .remove(episode_url)
            .ok_or_else(|| Error::RecordNotFound(episode_url.to_string()))?;
        save_map(&self.path, &records)
    }

    /// Drop the whole history.
    pub fn clear(&self) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::other("history store lock poisoned"))?;
        records.clear();
        save_map(&self.path, &records)
    }
}

/// Saved series keyed by series URL.
pub struct FavoriteStore {
    path: PathBuf,
    records: Mutex<HashMap<String, FavoriteRecord>>,
}

impl FavoriteStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load_map(&path)?;
        debug!(path = %path.display(), count = records.len(), "favorite store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn contains(&self, series_url: &str) -> bool {
        self.records
            .lock()
            .map(|r| r.contains_key(series_url))
            .unwrap_or(false)
    }

    /// All favorites, most recently added first.
    pub fn all(&self) -> Vec<FavoriteRecord> {
        let mut records: Vec<FavoriteRecord> = self
            .records
            .lock()
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        records
    }

    /// Add or refresh a favorite; re-adding replaces the stored metadata.
    pub fn add(&self, record: FavoriteRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::other("favorite store lock poisoned"))?;
        records.insert(record.series_url.clone(), record);
        save_map(&self.path, &records)
    }

    pub fn remove(&self, series_url: &str) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::other("favorite store lock poisoned"))?;
        records
            .remove(series_url)
            .ok_or_else(|| Error::RecordNotFound(series_url.to_string()))?;
        save_map(&self.path, &records)
    }
}
