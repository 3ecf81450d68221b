//! Watch history records.

use crate::models::media::Episode;
use serde::{Deserialize, Serialize};

/// Fraction of the duration after which an episode counts as finished.
const FINISHED_THRESHOLD: f64 = 0.9;

/// Persisted watch-history row, keyed by episode URL.
///
/// Carries a denormalized snapshot of the sibling episode list so
/// "next episode" navigation works without a fresh network fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchHistoryRecord {
    /// Episode page URL (source-relative); primary key.
    pub episode_url: String,
    pub series_url: String,
    pub series_title: String,
    pub thumbnail_url: Option<String>,
    pub episode_name: Option<String>,
    /// Last playback position in millis.
    pub last_position_ms: u64,
    /// Total duration in millis, 0 when unknown.
    pub duration_ms: u64,
    pub finished: bool,
    pub episode_number: f32,
    /// Snapshot of the season's episode list at watch time.
    pub season_episodes: Vec<Episode>,
    /// Last update timestamp (RFC 3339).
    pub timestamp: String,
}

impl WatchHistoryRecord {
    /// Update the playback position, recomputing the finished flag.
    pub fn set_position(&mut self, position_ms: u64, duration_ms: u64) {
        self.last_position_ms = position_ms;
        self.duration_ms = duration_ms;
        if duration_ms > 0 {
            self.finished = position_ms as f64 >= duration_ms as f64 * FINISHED_THRESHOLD;
        }
        self.timestamp = chrono::Utc::now().to_rfc3339();
    }

    /// The episode after this one in the stored season snapshot.
    pub fn next_episode(&self) -> Option<&Episode> {
        let idx = self
            .season_episodes
            .iter()
            .position(|e| e.url == self.episode_url)?;
        self.season_episodes.get(idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(url: &str, number: f32) -> Episode {
        Episode {
            url: url.to_string(),
            name: format!("الحلقة {number}"),
            episode_number: number,
            date_upload: 0,
        }
    }

    fn record() -> WatchHistoryRecord {
        WatchHistoryRecord {
            episode_url: "/ep2".into(),
            series_url: "/series/1".into(),
            series_title: "Show".into(),
            thumbnail_url: None,
            episode_name: Some("الحلقة 2".into()),
            last_position_ms: 0,
            duration_ms: 0,
            finished: false,
            episode_number: 2.0,
            season_episodes: vec![episode("/ep1", 1.0), episode("/ep2", 2.0), episode("/ep3", 3.0)],
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_next_episode_from_snapshot() {
        let rec = record();
        assert_eq!(rec.next_episode().map(|e| e.url.as_str()), Some("/ep3"));
    }

    #[test]
    fn test_next_episode_at_end() {
        let mut rec = record();
        rec.episode_url = "/ep3".into();
        assert!(rec.next_episode().is_none());
    }

    #[test]
    fn test_finished_flag() {
        let mut rec = record();
        rec.set_position(500, 1000);
        assert!(!rec.finished);
        rec.set_position(950, 1000);
        assert!(rec.finished);
    }
}
