//! Integration tests for master playlist handling.
//!
//! Tests cover:
//! - Variant extraction from master playlist bodies
//! - Quality labeling and descending sort order
//! - Reference resolution against the playlist URL
//! - Master playlist synthesis and its data-URI form

use anigrab::core::playlist::{
    master_data_uri, parse_master, resolve_reference, synthesize_master, variants_from_body,
};
use anigrab::models::media::Video;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const MASTER: &str = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=1400000,RESOLUTION=854x480\n\
480/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080\n\
1080/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720\n\
//mirror.example/720/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000000\n\
/fallback/index.m3u8\n";

const PLAYLIST_URL: &str = "https://cdn.example/hls/show-42/master.m3u8?sig=abc";

// ========== VARIANT EXTRACTION ==========

#[test]
fn test_extracts_all_variants() {
    let videos = parse_master(MASTER, PLAYLIST_URL);
    assert_eq!(videos.len(), 4);
}

#[test]
fn test_variants_sorted_best_first() {
    let videos = parse_master(MASTER, PLAYLIST_URL);
    let qualities: Vec<&str> = videos.iter().map(|v| v.quality.as_str()).collect();
    assert_eq!(qualities, vec!["1080p", "720p", "480p", "Default"]);
}

#[test]
fn test_quality_comes_from_resolution_height() {
    let videos = parse_master(MASTER, PLAYLIST_URL);
    assert_eq!(videos[0].resolution, "1920x1080");
    assert_eq!(videos[2].quality, "480p");
    assert_eq!(videos[2].resolution, "854x480");
}

#[test]
fn test_variant_without_resolution_is_default() {
    let videos = parse_master(MASTER, PLAYLIST_URL);
    let default = &videos[3];
    assert_eq!(default.quality, "Default");
    assert_eq!(default.resolution, "");
    assert_eq!(default.url, "https://cdn.example/fallback/index.m3u8");
}

#[test]
fn test_media_playlist_body_yields_itself() {
    let body = "#EXTM3U\n#EXTINF:10.0,\nseg1.ts\n#EXTINF:10.0,\nseg2.ts\n#EXT-X-ENDLIST\n";
    let videos = variants_from_body(body, PLAYLIST_URL);
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].url, PLAYLIST_URL);
    assert_eq!(videos[0].quality, "Video");
}

#[test]
fn test_garbage_body_yields_no_variants() {
    assert!(parse_master("<html>not a playlist</html>", PLAYLIST_URL).is_empty());
    assert!(parse_master("", PLAYLIST_URL).is_empty());
}

// ========== REFERENCE RESOLUTION ==========

#[test]
fn test_relative_reference_joins_playlist_directory() {
    let videos = parse_master(MASTER, PLAYLIST_URL);
    assert_eq!(videos[0].url, "https://cdn.example/hls/show-42/1080/index.m3u8");
}

#[test]
fn test_scheme_relative_reference_becomes_https() {
    let videos = parse_master(MASTER, PLAYLIST_URL);
    assert_eq!(videos[1].url, "https://mirror.example/720/index.m3u8");
}

#[test]
fn test_host_relative_reference_keeps_scheme_and_host() {
    assert_eq!(
        resolve_reference("/keys/k1.bin", "http://cdn.example/hls/master.m3u8").as_deref(),
        Some("http://cdn.example/keys/k1.bin")
    );
}

#[test]
fn test_absolute_reference_passes_through() {
    assert_eq!(
        resolve_reference("https://other.example/x.ts", PLAYLIST_URL).as_deref(),
        Some("https://other.example/x.ts")
    );
}

// ========== MASTER SYNTHESIS ==========

#[test]
fn test_synthesized_master_round_trips_through_parser() {
    let videos = vec![
        Video::new("https://cdn.example/1080.m3u8", "1080p", "1920x1080"),
        Video::new("https://cdn.example/720.m3u8", "720p", "1280x720"),
        Video::new("https://cdn.example/360.m3u8", "360p", "640x360"),
    ];
    let body = synthesize_master(&videos);
    let reparsed = parse_master(&body, "https://player.example/synth.m3u8");

    assert_eq!(reparsed.len(), 3);
    assert_eq!(reparsed[0].quality, "1080p");
    assert_eq!(reparsed[0].url, "https://cdn.example/1080.m3u8");
    assert_eq!(reparsed[2].quality, "360p");
}

#[test]
fn test_synthesizer_orders_unsorted_input_best_first() {
    let videos = vec![
        Video::new("https://cdn.example/360.m3u8", "360p", "640x360"),
        Video::new("https://cdn.example/1080.m3u8", "1080p", "1920x1080"),
    ];
    let body = synthesize_master(&videos);
    let first_variant = body
        .lines()
        .find(|line| line.starts_with("#EXT-X-STREAM-INF:"))
        .unwrap();

    assert_eq!(
        first_variant,
        "#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080"
    );
    let reparsed = parse_master(&body, "https://player.example/synth.m3u8");
    assert_eq!(reparsed[0].url, "https://cdn.example/1080.m3u8");
    assert_eq!(reparsed[1].url, "https://cdn.example/360.m3u8");
}

#[test]
fn test_synthesized_bandwidth_table() {
    let videos = vec![
        Video::new("u1", "1080p", "1920x1080"),
        Video::new("u2", "720p", "1280x720"),
        Video::new("u3", "480p", "854x480"),
        Video::new("u4", "360p", "640x360"),
        Video::new("u5", "Default", ""),
    ];
    let body = synthesize_master(&videos);
    assert!(body.contains("BANDWIDTH=5000000,RESOLUTION=1920x1080"));
    assert!(body.contains("BANDWIDTH=2800000,RESOLUTION=1280x720"));
    assert!(body.contains("BANDWIDTH=1400000,RESOLUTION=854x480"));
    assert!(body.contains("BANDWIDTH=800000,RESOLUTION=640x360"));
    // Unknown qualities advertise a floor bandwidth and no resolution.
    assert!(body.contains("#EXT-X-STREAM-INF:BANDWIDTH=500000\nu5"));
}

#[test]
fn test_data_uri_decodes_back_to_playlist() {
    let videos = vec![Video::new("https://cdn.example/720.m3u8", "720p", "1280x720")];
    let uri = master_data_uri(&videos);

    let encoded = uri
        .strip_prefix("data:application/x-mpegURL;base64,")
        .expect("data uri prefix");
    assert!(!encoded.contains('\n'));

    let decoded = String::from_utf8(STANDARD.decode(encoded).expect("valid base64")).unwrap();
    assert_eq!(decoded, synthesize_master(&videos));
}
