//! Scraped catalog models: series, episodes, seasons and video variants.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a series as advertised by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStatus {
    Unknown,
    Ongoing,
    Completed,
    Licensed,
    PublishingFinished,
    Cancelled,
    OnHiatus,
}

impl SeriesStatus {
    /// Map the portal's status label to a status value.
    ///
    /// The portal only distinguishes "ongoing" from everything else; the
    /// remaining variants exist for sources that report them.
    pub fn from_portal(label: &str) -> Self {
        match label.trim() {
            "" => SeriesStatus::Unknown,
            "مستمر" => SeriesStatus::Ongoing,
            _ => SeriesStatus::Completed,
        }
    }
}

impl Default for SeriesStatus {
    fn default() -> Self {
        SeriesStatus::Unknown
    }
}

/// A series (or movie) scraped from a catalog page.
///
/// Immutable value object; `url` is source-relative so it survives a
/// base-origin change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Series {
    /// Source-relative URL (path + query).
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub status: SeriesStatus,
}

/// One page of a paginated catalog listing.
#[derive(Debug, Clone, Default)]
pub struct SeriesPage {
    pub series: Vec<Series>,
    pub has_next_page: bool,
}

/// A season entry on a series details page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
    /// Either the details page itself (single season) or the portal's
    /// season endpoint.
    pub url: String,
}

/// An episode scraped from a season page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Source-relative URL (path + query).
    pub url: String,
    /// Display name; often "season : episode".
    pub name: String,
    /// Numeric episode index, -1.0 when it could not be parsed.
    pub episode_number: f32,
    /// Upload timestamp in epoch millis, 0 when unknown.
    pub date_upload: i64,
}

impl Episode {
    /// The season label prefix of the display name, if present.
    pub fn season_label(&self) -> Option<&str> {
        self.name.split(" : ").next().filter(|s| !s.is_empty() && self.name.contains(" : "))
    }
}

/// A playable stream variant for one playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Absolute stream URL.
    pub url: String,
    /// Human-readable quality label, e.g. "1080p" or "Default".
    pub quality: String,
    /// Nominal resolution string, e.g. "1920x1080"; empty when unknown.
    pub resolution: String,
}

impl Video {
    pub fn new(url: impl Into<String>, quality: impl Into<String>, resolution: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: quality.into(),
            resolution: resolution.into(),
        }
    }

    /// Numeric portion of the quality label, 0 when absent.
    ///
    /// Used for descending quality ordering ("1080p" > "720p" > "Default").
    pub fn quality_digits(&self) -> u32 {
        let digits: String = self.quality.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_portal() {
        assert_eq!(SeriesStatus::from_portal("مستمر"), SeriesStatus::Ongoing);
        assert_eq!(SeriesStatus::from_portal("مكتمل"), SeriesStatus::Completed);
        assert_eq!(SeriesStatus::from_portal(""), SeriesStatus::Unknown);
    }

    #[test]
    fn test_quality_digits() {
        assert_eq!(Video::new("u", "1080p", "").quality_digits(), 1080);
        assert_eq!(Video::new("u", "720p", "").quality_digits(), 720);
        assert_eq!(Video::new("u", "Default", "").quality_digits(), 0);
    }

    #[test]
    fn test_season_label() {
        let ep = Episode {
            url: "/ep1".into(),
            name: "الموسم الاول : الحلقة 1".into(),
            episode_number: 1.0,
            date_upload: 0,
        };
        assert_eq!(ep.season_label(), Some("الموسم الاول"));

        let bare = Episode {
            url: "/ep1".into(),
            name: "الحلقة 1".into(),
            episode_number: 1.0,
            date_upload: 0,
        };
        assert_eq!(bare.season_label(), None);
    }
}
