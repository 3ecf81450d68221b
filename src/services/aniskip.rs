//! aniskip.com API client for opening/ending skip intervals.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://api.aniskip.com/v2/skip-times";

#[derive(Debug, Deserialize)]
pub struct SkipResponse {
    pub found: bool,
    #[serde(default)]
    pub results: Vec<Stamp>,
    #[serde(rename = "statusCode")]
    pub status_code: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stamp {
    pub interval: Interval,
    #[serde(rename = "skipType")]
    pub skip_type: String,
    #[serde(rename = "skipId")]
    pub skip_id: String,
    #[serde(rename = "episodeLength")]
    pub episode_length: f64,
}

/// Interval boundaries in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct Interval {
    #[serde(rename = "startTime")]
    pub start_time: f64,
    #[serde(rename = "endTime")]
    pub end_time: f64,
}

/// aniskip API client; failures degrade to `None` since skip stamps are
/// purely cosmetic.
pub struct AniSkipClient {
    client: reqwest::Client,
}

impl AniSkipClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch skip stamps for an episode.
    ///
    /// Returns the episode length in millis reported by the API together
    /// with the stamps, or `None` when nothing was found.
    pub async fn get_result(
        &self,
        mal_id: u32,
        episode_number: u32,
        episode_length_ms: u64,
    ) -> Option<(u64, Vec<Stamp>)> {
        let url = format!(
            "{API_BASE}/{mal_id}/{episode_number}\
             ?types[]=ed&types[]=mixed-ed&types[]=mixed-op&types[]=op&types[]=recap\
             &episodeLength={}",
            episode_length_ms / 1000
        );

        let response = self.client.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            debug!(mal_id, episode_number, status = %response.status(), "aniskip lookup failed");
            return None;
        }

        let parsed: SkipResponse = response.json().await.ok()?;
        if !parsed.found || parsed.results.is_empty() {
            return None;
        }

        let length_ms = (parsed.results[0].episode_length * 1000.0) as u64;
        Some((length_ms, parsed.results))
    }
}

impl Default for AniSkipClient {
    fn default() -> Self {
        Self::new()
    }
}
