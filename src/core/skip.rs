//! Skip-stamp lookup: maps a portal series title to a MAL id via AniList,
//! then pulls opening/ending intervals from aniskip.

use crate::services::aniskip::AniSkipClient;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const ANILIST_API: &str = "https://graphql.anilist.co";

/// Kind of interval a stamp covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipType {
    Opening,
    Ending,
    Recap,
    MixedOpening,
    MixedEnding,
}

impl SkipType {
    pub fn label(&self) -> &'static str {
        match self {
            SkipType::Opening => "Skip Opening",
            SkipType::Ending => "Skip Ending",
            SkipType::Recap => "Skip Recap",
            SkipType::MixedOpening => "Skip Intro",
            SkipType::MixedEnding => "Skip Outro",
        }
    }

    fn from_api(kind: &str) -> Option<Self> {
        match kind {
            "op" => Some(SkipType::Opening),
            "ed" => Some(SkipType::Ending),
            "recap" => Some(SkipType::Recap),
            "mixed-op" => Some(SkipType::MixedOpening),
            "mixed-ed" => Some(SkipType::MixedEnding),
            _ => None,
        }
    }
}

/// A skippable interval within an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipStamp {
    pub kind: SkipType,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// The stamp covering a playback position, if any. End bounds are
/// exclusive so adjacent intervals never both match.
pub fn stamp_at(stamps: &[SkipStamp], position_ms: u64) -> Option<&SkipStamp> {
    stamps
        .iter()
        .find(|s| position_ms >= s.start_ms && position_ms < s.end_ms)
}

/// Stamp lookup with an in-memory per-episode cache.
pub struct SkipService {
    aniskip: AniSkipClient,
    client: reqwest::Client,
    cache: Mutex<HashMap<String, Vec<SkipStamp>>>,
}

impl SkipService {
    pub fn new() -> Self {
        Self {
            aniskip: AniSkipClient::new(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch skip stamps for one episode of a series, keyed by series URL
    /// and episode number. All failures degrade to an empty list.
    pub async fn stamps(
        &self,
        series_url: &str,
        series_title: &str,
        episode_number: u32,
        episode_duration_ms: u64,
    ) -> Vec<SkipStamp> {
        let cache_key = format!("{series_url}_{episode_number}");
        if let Ok(cache) = self.cache.lock() {
            if let Some(stamps) = cache.get(&cache_key) {
                return stamps.clone();
            }
        }

        let Some(mal_id) = self.mal_id_from_title(series_title).await else {
            return Vec::new();
        };

        let stamps: Vec<SkipStamp> = self
            .aniskip
            .get_result(mal_id, episode_number, episode_duration_ms)
            .await
            .map(|(_, raw)| {
                raw.iter()
                    .filter_map(|stamp| {
                        let kind = SkipType::from_api(&stamp.skip_type)?;
                        Some(SkipStamp {
                            kind,
                            start_ms: (stamp.interval.start_time * 1000.0) as u64,
                            end_ms: (stamp.interval.end_time * 1000.0) as u64,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(cache_key, stamps.clone());
        }
        stamps
    }

    /// Resolve a MAL id by searching AniList for the cleaned title.
    async fn mal_id_from_title(&self, title: &str) -> Option<u32> {
        let clean = clean_title(title);
        if clean.is_empty() {
            return None;
        }

        let query = format!(
            "query {{ Media(search: \"{}\", type: ANIME) {{ idMal }} }}",
            clean.replace('"', "")
        );
        let response = self
            .client
            .post(ANILIST_API)
            .json(&json!({ "query": query }))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            debug!(title = %clean, status = %response.status(), "anilist search failed");
            return None;
        }

        let body: serde_json::Value = response.json().await.ok()?;
        let id = body
            .get("data")?
            .get("Media")?
            .get("idMal")?
            .as_u64()
            .filter(|&id| id != 0)?;
        Some(id as u32)
    }
}

impl Default for SkipService {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip portal decoration from a series title before searching AniList:
/// Arabic filler words and ordinals, episode/season markers, digits,
/// separators and stray punctuation.
pub fn clean_title(raw: &str) -> String {
    static FILLER: OnceLock<Regex> = OnceLock::new();
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    static PUNCT: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let filler = FILLER.get_or_init(|| {
        Regex::new(
            r"(?i)\b(انمي|أنمي|الحلقة|حلقة|الموسم|موسم|الأول|الاول|الثاني|الثالث|الرابع|الخامس|السادس|السابع|الثامن|التاسع|العاشر|season|episode|ep|part)\b",
        )
        .expect("valid regex")
    });
    let digits = DIGITS.get_or_init(|| Regex::new(r"[٠-٩0-9]+").expect("valid regex"));
    let punct = PUNCT
        .get_or_init(|| Regex::new(r#"[–—\-()\[\]{},:;"'`~_^|<>]"#).expect("valid regex"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s{2,}").expect("valid regex"));

    let cleaned = filler.replace_all(raw, " ");
    let cleaned = digits.replace_all(&cleaned, " ");
    let cleaned = punct.replace_all(&cleaned, " ");
    spaces.replace_all(&cleaned, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_strips_decoration() {
        assert_eq!(clean_title("انمي One Piece الحلقة 1075"), "One Piece");
        assert_eq!(clean_title("Attack on Titan - Season 4 Part 2"), "Attack on Titan");
        assert_eq!(clean_title("  "), "");
    }

    #[test]
    fn test_skip_type_from_api() {
        assert_eq!(SkipType::from_api("op"), Some(SkipType::Opening));
        assert_eq!(SkipType::from_api("mixed-ed"), Some(SkipType::MixedEnding));
        assert_eq!(SkipType::from_api("preview"), None);
    }

    #[test]
    fn test_stamp_at_finds_covering_interval() {
        let stamps = vec![
            SkipStamp {
                kind: SkipType::Opening,
                start_ms: 10_000,
                end_ms: 98_000,
            },
            SkipStamp {
                kind: SkipType::Ending,
                start_ms: 1_300_000,
                end_ms: 1_390_000,
            },
        ];
        assert_eq!(stamp_at(&stamps, 50_000).map(|s| s.kind), Some(SkipType::Opening));
        assert_eq!(stamp_at(&stamps, 1_300_000).map(|s| s.kind), Some(SkipType::Ending));
        assert!(stamp_at(&stamps, 98_000).is_none());
        assert!(stamp_at(&stamps, 500_000).is_none());
    }

    #[test]
    fn test_skip_type_labels() {
        assert_eq!(SkipType::Opening.label(), "Skip Opening");
        assert_eq!(SkipType::MixedOpening.label(), "Skip Intro");
    }
}
