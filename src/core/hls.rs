//! Media playlist parsing and segment decryption for HLS downloads.

use crate::core::playlist::resolve_reference;
use crate::services::http::HttpClient;
use crate::{Error, Result};
use aes::Aes128;
use block_modes::block_padding::Pkcs7;
use block_modes::{BlockMode, Cbc};
use m3u8_rs::{KeyMethod, Playlist};
use tracing::debug;

type Aes128Cbc = Cbc<Aes128, Pkcs7>;

/// Everything needed to download and decrypt one HLS stream.
#[derive(Debug, Clone)]
pub struct HlsDownloadData {
    /// AES-128 key bytes, `None` for cleartext streams.
    pub key: Option<Vec<u8>>,
    /// Explicit IV from the playlist, `None` when the media sequence
    /// number supplies it.
    pub iv: Option<Vec<u8>>,
    /// Absolute segment URLs in playback order.
    pub segments: Vec<String>,
}

/// Fetch a media playlist and collect its segments and encryption data.
pub async fn fetch_download_data(http: &HttpClient, playlist_url: &str) -> Result<HlsDownloadData> {
    let body = http.get_text(playlist_url).await?;

    let playlist = m3u8_rs::parse_playlist_res(body.as_bytes())
        .map_err(|e| Error::PlaylistParse(e.to_string()))?;
    let media = match playlist {
        Playlist::MediaPlaylist(media) => media,
        Playlist::MasterPlaylist(_) => {
            return Err(Error::PlaylistParse(
                "expected a media playlist, got a master playlist".to_string(),
            ))
        }
    };

    let mut key = None;
    let mut iv = None;
    for segment in &media.segments {
        let Some(seg_key) = &segment.key else {
            continue;
        };
        if !matches!(seg_key.method, KeyMethod::AES128) {
            continue;
        }
        if let Some(key_uri) = &seg_key.uri {
            if let Some(absolute) = resolve_reference(key_uri, playlist_url) {
                key = Some(http.get_bytes(&absolute).await?);
            }
        }
        iv = seg_key.iv.as_ref().and_then(|raw| parse_iv(raw));
        break;
    }

    let segments: Vec<String> = media
        .segments
        .iter()
        .filter_map(|segment| resolve_reference(&segment.uri, playlist_url))
        .collect();
    if segments.is_empty() {
        return Err(Error::EmptyPlaylist(playlist_url.to_string()));
    }

    debug!(
        segments = segments.len(),
        encrypted = key.is_some(),
        "media playlist parsed"
    );
    Ok(HlsDownloadData { key, iv, segments })
}

/// Parse a playlist IV attribute, with or without its `0x` prefix.
fn parse_iv(raw: &str) -> Option<Vec<u8>> {
    let hex_str = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    hex::decode(hex_str).ok()
}

/// IV mandated by the HLS spec when a key carries none: the segment's
/// media sequence number as a 16-byte big-endian integer.
pub fn default_iv(sequence: u64) -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[8..].copy_from_slice(&sequence.to_be_bytes());
    iv
}

/// Decrypt one AES-128-CBC segment.
pub fn decrypt_segment(
    data: &[u8],
    key: &[u8],
    iv: Option<&[u8]>,
    sequence: u64,
) -> Result<Vec<u8>> {
    let default;
    let iv = match iv {
        Some(iv) if !iv.is_empty() => iv,
        _ => {
            default = default_iv(sequence);
            &default
        }
    };

    let cipher =
        Aes128Cbc::new_from_slices(key, iv).map_err(|e| Error::Decrypt(e.to_string()))?;
    cipher
        .decrypt_vec(data)
        .map_err(|e| Error::Decrypt(e.to_string()))
}

/// Fetch one segment and decrypt it when the stream is encrypted.
pub async fn fetch_segment(
    http: &HttpClient,
    url: &str,
    data: &HlsDownloadData,
    sequence: u64,
) -> Result<Vec<u8>> {
    let bytes = http.get_bytes(url).await?;
    if bytes.is_empty() {
        return Err(Error::other(format!("empty segment body: {url}")));
    }
    match &data.key {
        Some(key) => decrypt_segment(&bytes, key, data.iv.as_deref(), sequence),
        None => Ok(bytes),
    }
}
