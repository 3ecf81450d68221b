//! Embed page resolution: turn a player embed URL into a direct media URL.
//!
//! The actual probing strategy sits behind [`EmbedEngine`] so alternative
//! engines (headless browser, provider-specific APIs) can slot in without
//! touching the timeout and one-shot semantics.

use crate::services::http::HttpClient;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

fn media_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.(mp4|m3u8|mpd)").expect("valid regex"))
}

/// Whether a URL looks like a direct media resource.
pub fn is_media_url(url: &str) -> bool {
    media_url_regex().is_match(url)
}

/// A strategy for extracting a media URL from an embed page.
#[async_trait]
pub trait EmbedEngine: Send + Sync {
    /// Probe the embed page; resolves to the first media URL found.
    ///
    /// Implementations may take as long as they like; the caller enforces
    /// the timeout.
    async fn probe(&self, embed_url: &str) -> Option<String>;
}

/// Default engine: fetch the embed HTML and scan it for media URLs, both
/// in subresource attributes and in inline player-config scripts.
pub struct HttpEmbedEngine {
    http: HttpClient,
}

impl HttpEmbedEngine {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl EmbedEngine for HttpEmbedEngine {
    async fn probe(&self, embed_url: &str) -> Option<String> {
        let html = match self.http.get_text(embed_url).await {
            Ok(html) => html,
            Err(err) => {
                debug!(url = embed_url, %err, "embed page fetch failed");
                return None;
            }
        };
        scan_embed_html(&html)
    }
}

/// Scan embed HTML for the first media URL.
///
/// Player pages either reference the stream in a `src`/`file` attribute or
/// assign it inside an inline script (`file: "..."`, `source: '...'`,
/// `"hls": "..."`). m3u8 candidates win over mp4 when both appear.
pub fn scan_embed_html(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?:src|file|source|hls)["']?\s*[:=]\s*["']([^"']+)["']"#)
            .expect("valid regex")
    });

    let mut fallback = None;
    for caps in re.captures_iter(html) {
        let candidate = caps[1].trim();
        if !is_media_url(candidate) {
            continue;
        }
        if candidate.contains(".m3u8") {
            return Some(candidate.to_string());
        }
        if fallback.is_none() {
            fallback = Some(candidate.to_string());
        }
    }
    fallback
}

/// Resolver wrapping an engine with a hard timeout and one-shot result
/// semantics.
pub struct Resolver {
    engine: Arc<dyn EmbedEngine>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(engine: Arc<dyn EmbedEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    /// Resolve an embed URL to a direct media URL.
    ///
    /// Exactly one outcome wins: the engine's first result, or an empty
    /// string once the timeout fires. The losing probe is aborted.
    pub async fn resolve(&self, embed_url: &str) -> String {
        let engine = self.engine.clone();
        let url = embed_url.to_string();
        let mut probe = tokio::spawn(async move { engine.probe(&url).await });

        match tokio::time::timeout(self.timeout, &mut probe).await {
            Ok(Ok(Some(media_url))) => {
                debug!(url = %media_url, "embed resolved");
                media_url
            }
            Ok(Ok(None)) => {
                debug!(url = embed_url, "no media url in embed page");
                String::new()
            }
            Ok(Err(err)) => {
                warn!(url = embed_url, %err, "embed probe panicked");
                String::new()
            }
            Err(_) => {
                probe.abort();
                warn!(url = embed_url, timeout = ?self.timeout, "embed resolution timed out");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine(Option<String>);

    #[async_trait]
    impl EmbedEngine for FixedEngine {
        async fn probe(&self, _embed_url: &str) -> Option<String> {
            self.0.clone()
        }
    }

    struct StallingEngine;

    #[async_trait]
    impl EmbedEngine for StallingEngine {
        async fn probe(&self, _embed_url: &str) -> Option<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Some("https://cdn.example/late.m3u8".to_string())
        }
    }

    #[test]
    fn test_is_media_url() {
        assert!(is_media_url("https://cdn.example/stream/master.m3u8?t=1"));
        assert!(is_media_url("https://cdn.example/file.mp4"));
        assert!(!is_media_url("https://cdn.example/player.js"));
    }

    #[test]
    fn test_scan_embed_html_prefers_hls() {
        let html = r#"<script>
            var player = jwplayer("vid").setup({
                file: "https://cdn.example/v/720.mp4",
                source: "https://cdn.example/v/master.m3u8"
            });
        </script>"#;
        assert_eq!(
            scan_embed_html(html).as_deref(),
            Some("https://cdn.example/v/master.m3u8")
        );
    }

    #[test]
    fn test_scan_embed_html_falls_back_to_mp4() {
        let html = r#"<video src="https://cdn.example/v/direct.mp4"></video>"#;
        assert_eq!(
            scan_embed_html(html).as_deref(),
            Some("https://cdn.example/v/direct.mp4")
        );
        assert_eq!(scan_embed_html("<html>no player here</html>"), None);
    }

    #[tokio::test]
    async fn test_resolve_returns_engine_result() {
        let resolver = Resolver::new(
            Arc::new(FixedEngine(Some("https://cdn.example/a.m3u8".into()))),
            Duration::from_secs(20),
        );
        assert_eq!(resolver.resolve("https://embed.example/x").await, "https://cdn.example/a.m3u8");
    }

    #[tokio::test]
    async fn test_resolve_empty_when_engine_finds_nothing() {
        let resolver = Resolver::new(Arc::new(FixedEngine(None)), Duration::from_secs(20));
        assert_eq!(resolver.resolve("https://embed.example/x").await, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_times_out_to_empty_string() {
        let resolver = Resolver::new(Arc::new(StallingEngine), Duration::from_secs(20));
        assert_eq!(resolver.resolve("https://embed.example/x").await, "");
    }
}
