//! Saved-series ("my list") records.

use serde::{Deserialize, Serialize};

/// Persisted favorite row, keyed by series URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// Series page URL (source-relative); primary key.
    pub series_url: String,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    /// When the series was added (RFC 3339); list order is newest first.
    pub added_at: String,
}

impl FavoriteRecord {
    pub fn new(
        series_url: impl Into<String>,
        title: Option<String>,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            series_url: series_url.into(),
            title,
            thumbnail_url,
            added_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
