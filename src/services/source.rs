//! Streaming portal scraper.
//!
//! Network fetches live on [`Source`]; the HTML parsing itself is split into
//! synchronous functions over `&str` so it stays testable against fixture
//! pages and never holds a non-`Send` DOM across an await point.

use crate::models::media::{Episode, Season, Series, SeriesPage, SeriesStatus};
use crate::services::http::HttpClient;
use crate::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Catalog listings the portal paginates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseKind {
    Series,
    Movies,
    Recent,
}

impl BrowseKind {
    fn path(&self) -> &'static str {
        match self {
            BrowseKind::Series => "series",
            BrowseKind::Movies => "movies",
            BrowseKind::Recent => "most_recent",
        }
    }
}

/// Scraper bound to a portal origin.
pub struct Source {
    http: HttpClient,
    base_url: String,
}

impl Source {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a scraped href absolute against the portal origin.
    pub fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), href)
        }
    }

    /// Fetch one page of a catalog listing.
    pub async fn browse(&self, kind: BrowseKind, page: u32) -> Result<SeriesPage> {
        let url = format!("{}/{}/page/{}", self.base_url, kind.path(), page);
        let html = self.http.get_text(&url).await?;
        Ok(parse_series_page(&html))
    }

    /// Fetch one page of an arbitrary portal section (genre or category
    /// path such as `anime` or `asian-series`).
    pub async fn section(&self, path: &str, page: u32) -> Result<SeriesPage> {
        let url = format!(
            "{}/{}/page/{}",
            self.base_url,
            path.trim_matches('/'),
            page
        );
        let html = self.http.get_text(&url).await?;
        Ok(parse_series_page(&html))
    }

    /// Fetch the front-page hero slider.
    pub async fn home_slider(&self) -> Result<Vec<Series>> {
        let html = self.http.get_text(&self.base_url).await?;
        Ok(parse_home_slider(&html))
    }

    /// Fetch the front-page "latest episodes" rail.
    pub async fn home_latest_episodes(&self) -> Result<Vec<Series>> {
        let html = self.http.get_text(&self.base_url).await?;
        Ok(parse_home_latest_episodes(&html))
    }

    /// Fetch one page of search results.
    pub async fn search(&self, query: &str, page: u32) -> Result<SeriesPage> {
        let url = format!("{}/page/{}?s={}", self.base_url, page, query);
        let html = self.http.get_text(&url).await?;
        Ok(parse_series_page(&html))
    }

    /// Fetch full details for a series page.
    pub async fn details(&self, series_url: &str) -> Result<Series> {
        let url = self.absolutize(series_url);
        let html = self.http.get_text(&url).await?;
        let mut series = parse_details(&html);
        series.url = url;
        Ok(series)
    }

    /// Fetch the season list of a series.
    ///
    /// A series without a season block is treated as a single season whose
    /// page is the series page itself.
    pub async fn seasons(&self, series_url: &str) -> Result<Vec<Season>> {
        let url = self.absolutize(series_url);
        let html = self.http.get_text(&url).await?;
        let mut seasons = parse_seasons(&html, &self.base_url);
        if seasons.is_empty() {
            seasons.push(Season {
                name: "Season 1".to_string(),
                url: url.clone(),
            });
        }
        Ok(seasons)
    }

    /// Fetch the episodes listed on one season page.
    pub async fn episodes(&self, season_url: &str) -> Result<Vec<Episode>> {
        let url = self.absolutize(season_url);
        let html = self.http.get_text(&url).await?;
        Ok(parse_episodes(&html))
    }

    /// Fetch every episode of a series, walking all of its seasons.
    pub async fn all_episodes(&self, series_url: &str) -> Result<Vec<Episode>> {
        let mut episodes = Vec::new();
        for season in self.seasons(series_url).await? {
            match self.episodes(&season.url).await {
                Ok(mut eps) => episodes.append(&mut eps),
                Err(err) => debug!(season = %season.name, %err, "season page fetch failed"),
            }
        }
        Ok(episodes)
    }

    /// Fetch an episode page and pull the embed iframe URL out of it.
    pub async fn embed_url(&self, episode_url: &str) -> Result<Option<String>> {
        let url = self.absolutize(episode_url);
        let html = self.http.get_text(&url).await?;
        Ok(parse_embed_url(&html))
    }
}

fn sel(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse a paginated catalog or search-result page.
pub fn parse_series_page(html: &str) -> SeriesPage {
    let document = Html::parse_document(html);
    let mut series = Vec::new();

    if let Some(card_sel) = sel("div#postList div.col-xl-2 a") {
        let img_sel = sel("div.imgdiv-class img, img");
        for card in document.select(&card_sel) {
            let Some(url) = card.value().attr("href") else {
                continue;
            };
            let img = img_sel.as_ref().and_then(|s| card.select(s).next());
            series.push(Series {
                url: url.to_string(),
                title: img
                    .and_then(|i| i.value().attr("alt"))
                    .unwrap_or_default()
                    .to_string(),
                thumbnail_url: img
                    .and_then(|i| i.value().attr("data-src"))
                    .map(str::to_string),
                ..Series::default()
            });
        }
    }

    SeriesPage {
        has_next_page: has_next_page(&document),
        series,
    }
}

/// The pagination widget marks a next page with a `›` link.
fn has_next_page(document: &Html) -> bool {
    sel("ul.pagination li a.page-link")
        .map(|s| {
            document
                .select(&s)
                .any(|link| element_text(link).contains('\u{203a}'))
        })
        .unwrap_or(false)
}

/// Parse the front-page hero slider.
pub fn parse_home_slider(html: &str) -> Vec<Series> {
    let document = Html::parse_document(html);
    let mut series = Vec::new();

    let Some(slide_sel) = sel("div#homeSlide div.swiper-slide") else {
        return series;
    };
    let link_sel = sel("div.h1 a");
    let poster_sel = sel("div.poster img");
    let desc_sel = sel("p");

    for slide in document.select(&slide_sel) {
        let Some(link) = link_sel.as_ref().and_then(|s| slide.select(s).next()) else {
            continue;
        };
        let Some(url) = link.value().attr("href") else {
            continue;
        };
        series.push(Series {
            url: url.to_string(),
            title: element_text(link),
            thumbnail_url: poster_sel
                .as_ref()
                .and_then(|s| slide.select(s).next())
                .and_then(|img| img.value().attr("src"))
                .map(str::to_string),
            description: desc_sel
                .as_ref()
                .and_then(|s| slide.select(s).next())
                .map(element_text)
                .filter(|d| !d.is_empty()),
            ..Series::default()
        });
    }

    series
}

/// Parse the front-page "latest episodes" rail.
pub fn parse_home_latest_episodes(html: &str) -> Vec<Series> {
    let document = Html::parse_document(html);
    let mut series = Vec::new();

    let Some(card_sel) = sel("section#blockList.blockAlt .epDivHome") else {
        return series;
    };
    let link_sel = sel("a.epHomeImg");
    let title_sel = sel("div.h4");
    let img_sel = sel("img");

    for card in document.select(&card_sel) {
        let Some(url) = link_sel
            .as_ref()
            .and_then(|s| card.select(s).next())
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        series.push(Series {
            url: url.to_string(),
            title: title_sel
                .as_ref()
                .and_then(|s| card.select(s).next())
                .map(element_text)
                .unwrap_or_default(),
            thumbnail_url: img_sel
                .as_ref()
                .and_then(|s| card.select(s).next())
                .and_then(|img| img.value().attr("data-src"))
                .map(str::to_string),
            ..Series::default()
        });
    }

    series
}

/// Parse the details block of a series page.
pub fn parse_details(html: &str) -> Series {
    let document = Html::parse_document(html);
    let mut series = Series::default();

    if let Some(s) = sel("meta[itemprop=name]") {
        if let Some(meta) = document.select(&s).next() {
            series.title = meta.value().attr("content").unwrap_or_default().to_string();
        }
    }
    if let Some(s) = sel("meta[itemprop=description]") {
        if let Some(meta) = document.select(&s).next() {
            series.description = meta.value().attr("content").map(str::to_string);
        }
    }

    if let Some(s) = sel("div.posterImg img.poster") {
        series.thumbnail_url = document
            .select(&s)
            .next()
            .and_then(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty())
            .map(str::to_string);
    }
    if series.thumbnail_url.is_none() {
        if let Some(s) = sel("div.col-xl-2 > div.seasonDiv:nth-child(1) > img") {
            series.thumbnail_url = document
                .select(&s)
                .next()
                .and_then(|img| img.value().attr("data-src"))
                .map(str::to_string);
        }
    }

    // Genre and status spans carry no stable class, only Arabic labels.
    if let (Some(span_sel), Some(a_sel)) = (sel("span"), sel("a")) {
        for span in document.select(&span_sel) {
            let label = element_text(span);
            if label.contains("\u{62a}\u{635}\u{646}\u{64a}\u{641}")
                || label.contains("\u{645}\u{633}\u{62a}\u{648}\u{649}")
            {
                for link in span.select(&a_sel) {
                    let genre = element_text(link);
                    if !genre.is_empty() && !series.genres.contains(&genre) {
                        series.genres.push(genre);
                    }
                }
            }
            if label.contains("\u{62d}\u{627}\u{644}\u{629}") {
                let status = label
                    .replace("\u{62d}\u{627}\u{644}\u{629} ", "")
                    .replace("\u{627}\u{644}\u{645}\u{633}\u{644}\u{633}\u{644} : ", "");
                series.status = SeriesStatus::from_portal(status.trim());
            }
        }
    }

    series
}

/// Parse the season list of a series page.
///
/// Season cards carry their page id in an `onclick="postA('<id>')"`
/// attribute; the season page itself is served at `<base>/?p=<id>`.
pub fn parse_seasons(html: &str, base_url: &str) -> Vec<Season> {
    let document = Html::parse_document(html);
    let mut seasons = Vec::new();

    let Some(card_sel) = sel("div#seasonList div.col-xl-2 div.seasonDiv") else {
        return seasons;
    };
    let title_sel = sel("div.title");

    for card in document.select(&card_sel) {
        let onclick = card.value().attr("onclick").unwrap_or_default();
        let Some(id) = onclick
            .split_once("('")
            .and_then(|(_, rest)| rest.split_once("')"))
            .map(|(id, _)| id)
        else {
            continue;
        };
        let name = title_sel
            .as_ref()
            .and_then(|s| card.select(s).next())
            .map(element_text)
            .unwrap_or_default();
        seasons.push(Season {
            name,
            url: format!("{base_url}/?p={id}"),
        });
    }

    seasons
}

/// Parse the episode list of a season page.
///
/// Regular seasons list episodes under `div.epAll`; single-link pages fall
/// back to `div.shortLink` blocks whose `span#liskSh` holds the URL.
pub fn parse_episodes(html: &str) -> Vec<Episode> {
    let document = Html::parse_document(html);
    let mut episodes = Vec::new();

    let season_title = sel("div.seasonDiv.active > div.title")
        .and_then(|s| document.select(&s).next().map(element_text))
        .unwrap_or_default();

    if let Some(ep_sel) = sel("div.epAll a") {
        for link in document.select(&ep_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let text = element_text(link);
            let number = text
                .replace("\u{627}\u{644}\u{62d}\u{644}\u{642}\u{629} ", "")
                .trim()
                .parse::<f32>()
                .unwrap_or(-1.0);
            episodes.push(Episode {
                url: href.to_string(),
                name: format!("{season_title} : {text}"),
                episode_number: number,
                date_upload: 0,
            });
        }
    }

    if episodes.is_empty() {
        if let Some(short_sel) = sel("div.shortLink span#liskSh") {
            for span in document.select(&short_sel) {
                let url = element_text(span);
                if !url.is_empty() {
                    episodes.push(Episode {
                        url,
                        name: "\u{645}\u{634}\u{627}\u{647}\u{62f}\u{629}".to_string(),
                        episode_number: -1.0,
                        date_upload: 0,
                    });
                }
            }
        }
    }

    episodes
}

/// Pull the player iframe URL out of an episode page.
///
/// The portal appends an `&img=` poster parameter that must be dropped
/// before the embed page is fetched.
pub fn parse_embed_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let iframe_sel = sel("iframe")?;
    let src = document
        .select(&iframe_sel)
        .next()?
        .value()
        .attr("src")?
        .split("&img")
        .next()?
        .trim()
        .to_string();
    if src.is_empty() {
        None
    } else {
        Some(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embed_url_strips_poster_param() {
        let html = r#"<html><body>
            <iframe src="https://vid.example/embed-abc123?autoplay=1&img=https://cdn.example/poster.jpg"></iframe>
        </body></html>"#;
        assert_eq!(
            parse_embed_url(html).as_deref(),
            Some("https://vid.example/embed-abc123?autoplay=1")
        );
    }

    #[test]
    fn test_parse_embed_url_missing_iframe() {
        assert_eq!(parse_embed_url("<html><body></body></html>"), None);
    }

    #[test]
    fn test_parse_seasons_extracts_ajax_ids() {
        let html = r#"<div id="seasonList">
            <div class="col-xl-2"><div class="seasonDiv" onclick="postA('9911')"><div class="title">موسم 1</div></div></div>
            <div class="col-xl-2"><div class="seasonDiv" onclick="postA('9912')"><div class="title">موسم 2</div></div></div>
        </div>"#;
        let seasons = parse_seasons(html, "https://www.faselhds.life");
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].url, "https://www.faselhds.life/?p=9911");
        assert_eq!(seasons[1].name, "موسم 2");
    }
}
