//! Portal HTTP client.
//!
//! One shared cookie jar backs every client so a clearance cookie obtained
//! through the interactive bypass propagates to all subsequent requests.

use crate::models::config::Config;
use crate::{Error, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Cookie issued after a successful anti-bot challenge.
pub const CLEARANCE_COOKIE: &str = "cf_clearance";

/// Body markers that identify a challenge page on a 503/403 response.
const CHALLENGE_MARKERS: &[&str] = &["js-challenge", "challenge-platform"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client carrying the portal's fixed User-Agent and Referer headers
/// and the shared cookie jar.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    cookies_path: PathBuf,
}

impl HttpClient {
    /// Build a client for the configured base origin.
    ///
    /// Previously stored clearance cookies are loaded back into the jar.
    pub fn new(config: &Config) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| Error::other("invalid user agent"))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.base_url)
                .map_err(|_| Error::InvalidUrl(config.base_url.clone()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_provider(jar.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let http = Self {
            client,
            jar,
            cookies_path: crate::models::config::data_dir().join("cookies.json"),
        };
        http.load_stored_cookies();
        Ok(http)
    }

    /// GET a page as text.
    ///
    /// A 503/403 response whose body carries a challenge marker raises
    /// [`Error::ProtectedOrigin`]; other non-challenge 503/403 bodies are
    /// returned as-is so callers can still parse them.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        if status == 503 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            if is_challenge_body(&body) {
                return Err(Error::ProtectedOrigin {
                    url: url.to_string(),
                });
            }
            return Ok(body);
        }

        Ok(response.error_for_status()?.text().await?)
    }

    /// GET a binary resource (segment, key).
    ///
    /// Non-2xx responses become [`Error::SegmentFetch`], except detected
    /// challenge pages which raise [`Error::ProtectedOrigin`].
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.as_u16() == 503 || status.as_u16() == 403 {
            let body = response.bytes().await.unwrap_or_default();
            if is_challenge_body(&String::from_utf8_lossy(&body)) {
                return Err(Error::ProtectedOrigin {
                    url: url.to_string(),
                });
            }
            return Err(Error::SegmentFetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(Error::SegmentFetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Install a clearance cookie for an origin and persist it for later runs.
    pub fn set_clearance(&self, origin: &str, value: &str) -> Result<()> {
        let url = Url::parse(origin).map_err(|_| Error::InvalidUrl(origin.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(origin.to_string()))?;

        let cookie = format!("{CLEARANCE_COOKIE}={value}; Domain={host}; Path=/");
        self.jar.add_cookie_str(&cookie, &url);

        let mut stored = self.read_stored_cookies();
        stored.insert(origin.to_string(), value.to_string());
        if let Some(parent) = self.cookies_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.cookies_path, serde_json::to_vec_pretty(&stored)?)?;
        Ok(())
    }

    /// Whether the jar currently holds a clearance cookie for the origin.
    pub fn has_clearance(&self, origin: &str) -> bool {
        let Ok(url) = Url::parse(origin) else {
            return false;
        };
        self.jar
            .cookies(&url)
            .and_then(|v| v.to_str().map(str::to_string).ok())
            .map(|cookies| cookies.contains(CLEARANCE_COOKIE))
            .unwrap_or(false)
    }

    fn load_stored_cookies(&self) {
        for (origin, value) in self.read_stored_cookies() {
            if let Ok(url) = Url::parse(&origin) {
                if let Some(host) = url.host_str() {
                    let cookie = format!("{CLEARANCE_COOKIE}={value}; Domain={host}; Path=/");
                    self.jar.add_cookie_str(&cookie, &url);
                }
            }
        }
    }

    fn read_stored_cookies(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.cookies_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

/// Check a response body for the challenge markers.
fn is_challenge_body(body: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|m| body.contains(m))
}
