//! Integration tests for the download, history and favorite stores.
//!
//! Tests cover:
//! - Persistence across store reopen
//! - State machine enforcement through the store
//! - Monotonic progress enforcement
//! - Resume point bookkeeping
//! - History ordering and per-series "continue watching" view
//! - Favorites add/remove and recency ordering

use anigrab::models::download::{DownloadRecord, DownloadState};
use anigrab::models::favorite::FavoriteRecord;
use anigrab::models::history::WatchHistoryRecord;
use anigrab::models::media::Episode;
use anigrab::store::{DownloadStore, FavoriteStore, HistoryStore};
use tempfile::TempDir;

// ========== TEST FIXTURES ==========

fn queued_record(url: &str) -> DownloadRecord {
    let mut record = DownloadRecord::new(url, "Test Show");
    record.transition(DownloadState::Queued).expect("queue");
    record
}

fn history_record(episode_url: &str, series_url: &str) -> WatchHistoryRecord {
    WatchHistoryRecord {
        episode_url: episode_url.to_string(),
        series_url: series_url.to_string(),
        series_title: "Test Show".to_string(),
        thumbnail_url: None,
        episode_name: Some(episode_url.to_string()),
        last_position_ms: 0,
        duration_ms: 0,
        finished: false,
        episode_number: 1.0,
        season_episodes: Vec::new(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

// ========== DOWNLOAD STORE ==========

#[test]
fn test_download_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("downloads.json");

    {
        let store = DownloadStore::open(&path).unwrap();
        store.upsert(queued_record("/ep1")).unwrap();
        store.upsert(queued_record("/ep2")).unwrap();
    }

    let store = DownloadStore::open(&path).unwrap();
    assert_eq!(store.all().len(), 2);
    let record = store.get("/ep1").expect("persisted");
    assert_eq!(record.state, DownloadState::Queued);
}

#[test]
fn test_store_rejects_invalid_transition() {
    let dir = TempDir::new().unwrap();
    let store = DownloadStore::open(dir.path().join("downloads.json")).unwrap();
    store.upsert(queued_record("/ep1")).unwrap();

    // Queued cannot complete without downloading first.
    assert!(store.transition("/ep1", DownloadState::Completed).is_err());
    assert_eq!(store.get("/ep1").unwrap().state, DownloadState::Queued);

    store.transition("/ep1", DownloadState::Downloading).unwrap();
    store.transition("/ep1", DownloadState::Completed).unwrap();
    assert_eq!(store.get("/ep1").unwrap().state, DownloadState::Completed);
}

#[test]
fn test_store_enforces_monotonic_progress() {
    let dir = TempDir::new().unwrap();
    let store = DownloadStore::open(dir.path().join("downloads.json")).unwrap();
    store.upsert(queued_record("/ep1")).unwrap();
    store.transition("/ep1", DownloadState::Downloading).unwrap();

    store.set_progress("/ep1", 30).unwrap();
    store.set_progress("/ep1", 60).unwrap();
    assert!(store.set_progress("/ep1", 45).is_err());
    assert_eq!(store.get("/ep1").unwrap().progress, 60);
}

#[test]
fn test_pause_keeps_resume_point() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("downloads.json");

    let store = DownloadStore::open(&path).unwrap();
    store.upsert(queued_record("/ep1")).unwrap();
    store.transition("/ep1", DownloadState::Downloading).unwrap();
    store
        .update("/ep1", |r| {
            r.set_resume_point(17, 9_000_000);
            r.transition(DownloadState::Paused)
        })
        .unwrap();

    let reopened = DownloadStore::open(&path).unwrap();
    let record = reopened.get("/ep1").unwrap();
    assert_eq!(record.state, DownloadState::Paused);
    assert_eq!(record.segments_done, 17);
    assert_eq!(record.bytes_written, 9_000_000);
    assert!(record.state.can_transition(DownloadState::Downloading));
}

#[test]
fn test_remove_missing_record_is_error() {
    let dir = TempDir::new().unwrap();
    let store = DownloadStore::open(dir.path().join("downloads.json")).unwrap();
    assert!(store.remove("/nope").is_err());
}

// ========== HISTORY STORE ==========

#[test]
fn test_history_survives_reopen_and_orders_by_recency() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");

    {
        let store = HistoryStore::open(&path).unwrap();
        let mut old = history_record("/ep1", "/series/a");
        old.timestamp = "2026-01-01T00:00:00Z".to_string();
        store.upsert(old).unwrap();

        let mut new = history_record("/ep2", "/series/a");
        new.timestamp = "2026-02-01T00:00:00Z".to_string();
        store.upsert(new).unwrap();
    }

    let store = HistoryStore::open(&path).unwrap();
    let all = store.all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].episode_url, "/ep2");
}

#[test]
fn test_latest_per_series_keeps_one_entry_each() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json")).unwrap();

    let mut a1 = history_record("/a1", "/series/a");
    a1.timestamp = "2026-01-01T00:00:00Z".to_string();
    let mut a2 = history_record("/a2", "/series/a");
    a2.timestamp = "2026-03-01T00:00:00Z".to_string();
    let mut b1 = history_record("/b1", "/series/b");
    b1.timestamp = "2026-02-01T00:00:00Z".to_string();
    store.upsert(a1).unwrap();
    store.upsert(a2).unwrap();
    store.upsert(b1).unwrap();

    let latest = store.latest_per_series();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].episode_url, "/a2");
    assert_eq!(latest[1].episode_url, "/b1");
}

#[test]
fn test_save_position_sets_finished_flag() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json")).unwrap();

    store
        .save_position(history_record("/ep1", "/series/a"), 700_000, 1_440_000)
        .unwrap();
    assert!(!store.get("/ep1").unwrap().finished);

    let record = store.get("/ep1").unwrap();
    store.save_position(record, 1_400_000, 1_440_000).unwrap();
    assert!(store.get("/ep1").unwrap().finished);
}

// ========== FAVORITE STORE ==========

#[test]
fn test_favorites_survive_reopen_and_order_by_recency() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("favorites.json");

    {
        let store = FavoriteStore::open(&path).unwrap();
        let mut old = FavoriteRecord::new("/series/a", Some("Show A".into()), None);
        old.added_at = "2026-01-01T00:00:00Z".to_string();
        store.add(old).unwrap();

        let mut new = FavoriteRecord::new("/series/b", Some("Show B".into()), None);
        new.added_at = "2026-02-01T00:00:00Z".to_string();
        store.add(new).unwrap();
    }

    let store = FavoriteStore::open(&path).unwrap();
    let all = store.all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].series_url, "/series/b");
    assert!(store.contains("/series/a"));
}

#[test]
fn test_favorite_readd_replaces_metadata() {
    let dir = TempDir::new().unwrap();
    let store = FavoriteStore::open(dir.path().join("favorites.json")).unwrap();

    store
        .add(FavoriteRecord::new("/series/a", None, None))
        .unwrap();
    store
        .add(FavoriteRecord::new(
            "/series/a",
            Some("Show A".into()),
            Some("https://cdn.example/a.jpg".into()),
        ))
        .unwrap();

    let all = store.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title.as_deref(), Some("Show A"));
}

#[test]
fn test_favorite_remove_missing_is_error() {
    let dir = TempDir::new().unwrap();
    let store = FavoriteStore::open(dir.path().join("favorites.json")).unwrap();
    store
        .add(FavoriteRecord::new("/series/a", None, None))
        .unwrap();

    store.remove("/series/a").unwrap();
    assert!(!store.contains("/series/a"));
    assert!(store.remove("/series/a").is_err());
}

#[test]
fn test_next_episode_uses_season_snapshot() {
    let mut record = history_record("/ep2", "/series/a");
    record.season_episodes = vec![
        Episode {
            url: "/ep1".into(),
            name: "ep 1".into(),
            episode_number: 1.0,
            date_upload: 0,
        },
        Episode {
            url: "/ep2".into(),
            name: "ep 2".into(),
            episode_number: 2.0,
            date_upload: 0,
        },
        Episode {
            url: "/ep3".into(),
            name: "ep 3".into(),
            episode_number: 3.0,
            date_upload: 0,
        },
    ];
    assert_eq!(record.next_episode().map(|e| e.url.as_str()), Some("/ep3"));
}
