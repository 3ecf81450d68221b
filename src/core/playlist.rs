//! Master playlist handling: variant extraction, reference resolution and
//! master synthesis for players that need a single multi-quality URI.

use crate::models::media::Video;
use crate::services::http::HttpClient;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";

fn resolution_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"RESOLUTION=(\d{1,4}x(\d{1,4}))").expect("valid regex"))
}

/// Resolve a playlist-internal reference against the playlist's own URL.
///
/// Absolute URLs pass through, scheme-relative references become https,
/// host-relative references keep the playlist's scheme and host, and bare
/// names resolve against the playlist's directory. Empty references yield
/// `None`.
pub fn resolve_reference(reference: &str, playlist_url: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("http") {
        return Some(reference.to_string());
    }
    if let Some(rest) = reference.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    let base = Url::parse(playlist_url).ok()?;
    if reference.starts_with('/') {
        let host = base.host_str()?;
        return Some(format!("{}://{}{}", base.scheme(), host, reference));
    }
    base.join(reference).ok().map(|u| u.to_string())
}

/// Parse variant streams out of a master playlist body.
///
/// Each `#EXT-X-STREAM-INF` block yields one [`Video`]; a block without a
/// parseable RESOLUTION attribute is labeled "Default". The result is
/// sorted by quality, highest first.
pub fn parse_master(body: &str, playlist_url: &str) -> Vec<Video> {
    let mut videos: Vec<Video> = body
        .split(STREAM_INF)
        .skip(1)
        .filter_map(|block| {
            let (quality, resolution) = match resolution_regex().captures(block) {
                Some(caps) => (format!("{}p", &caps[2]), caps[1].to_string()),
                None => ("Default".to_string(), String::new()),
            };
            let reference = block.lines().nth(1)?;
            let url = resolve_reference(reference, playlist_url)?;
            Some(Video::new(url, quality, resolution))
        })
        .collect();

    videos.sort_by(|a, b| b.quality_digits().cmp(&a.quality_digits()));
    videos
}

/// Turn a fetched playlist body into playable variants.
///
/// A master playlist yields one variant per stream; a media playlist yields
/// itself as a single "Video" entry.
pub fn variants_from_body(body: &str, playlist_url: &str) -> Vec<Video> {
    if !body.contains(STREAM_INF) {
        return vec![Video::new(playlist_url, "Video", "")];
    }
    parse_master(body, playlist_url)
}

/// Fetch an HLS URL and turn it into playable variants.
///
/// Any fetch or parse failure collapses to an empty list so playback falls
/// through to the next candidate.
pub async fn extract_from_hls(http: &HttpClient, playlist_url: &str) -> Vec<Video> {
    let body = match http.get_text(playlist_url).await {
        Ok(body) => body,
        Err(err) => {
            debug!(url = playlist_url, %err, "playlist fetch failed");
            return Vec::new();
        }
    };
    variants_from_body(&body, playlist_url)
}

/// Nominal bandwidth and resolution for a quality label, used when
/// synthesizing a master playlist from bare variant URLs.
fn variant_attributes(quality: &str) -> (u32, Option<&'static str>) {
    match quality {
        "1080p" => (5_000_000, Some("1920x1080")),
        "720p" => (2_800_000, Some("1280x720")),
        "480p" => (1_400_000, Some("854x480")),
        "360p" => (800_000, Some("640x360")),
        _ => (500_000, None),
    }
}

/// Build a master playlist body advertising the given variants, highest
/// quality first regardless of input order.
pub fn synthesize_master(videos: &[Video]) -> String {
    let mut ordered: Vec<&Video> = videos.iter().collect();
    ordered.sort_by(|a, b| b.quality_digits().cmp(&a.quality_digits()));

    let mut playlist = String::from("#EXTM3U\n");
    for video in ordered {
        let (bandwidth, resolution) = variant_attributes(&video.quality);
        match resolution {
            Some(res) => {
                playlist.push_str(&format!(
                    "#EXT-X-STREAM-INF:BANDWIDTH={bandwidth},RESOLUTION={res}\n"
                ));
            }
            None => {
                playlist.push_str(&format!("#EXT-X-STREAM-INF:BANDWIDTH={bandwidth}\n"));
            }
        }
        playlist.push_str(&video.url);
        playlist.push('\n');
    }
    playlist
}

/// Wrap a synthesized master playlist into a base64 data URI.
pub fn master_data_uri(videos: &[Video]) -> String {
    format!(
        "data:application/x-mpegURL;base64,{}",
        STANDARD.encode(synthesize_master(videos))
    )
}
