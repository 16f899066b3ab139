//! TechCrunch RSS ingestion and optional full-text fetch.
//!
//! RSS is the primary access path: each `<item>` is read into a [`FeedItem`]
//! and normalized once into an [`Article`], so nothing downstream deals with
//! missing or oddly shaped feed fields. Fetching article pages is opt-in and
//! only the text of the first `<article>` element is kept.
//!
//! # Feed fields
//!
//! | RSS element     | Article field  | Notes                         |
//! |-----------------|----------------|-------------------------------|
//! | `title`         | `title`        | trimmed                       |
//! | `link`          | `url`          | trimmed                       |
//! | `guid`          | `guid`         |                               |
//! | `description`   | `summary`      | HTML flattened to text        |
//! | `pubDate`       | `published_at` | RFC 2822, RFC 3339 fallback   |
//! | `category` (n)  | `categories`   | order kept, duplicates dropped|
//! | `dc:creator`    | `author`       |                               |

use crate::api::{FetchAsync, HttpFetcher, RetryFetch};
use crate::error::IntelError;
use crate::models::Article;
use crate::pipeline::FullTextSource;
use crate::utils::html_to_text;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_FEED_URL: &str = "https://techcrunch.com/feed/";
pub const DEFAULT_USER_AGENT: &str = "techcrunch-intel/0.1 (educational)";

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid article selector"));

/// One `<item>` as it appears in the feed, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    pub categories: Vec<String>,
    pub author: Option<String>,
}

/// Parse an RSS 2.0 document, keeping at most `limit` items.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<FeedItem>, IntelError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut text = String::new();

    if limit == 0 {
        return Ok(items);
    }

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == b"item" {
                    current = Some(FeedItem::default());
                }
                text.clear();
            }
            Event::Text(e) => {
                if current.is_some() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if current.is_some() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                        if items.len() >= limit {
                            break;
                        }
                    }
                    continue;
                }
                let Some(item) = current.as_mut() else {
                    continue;
                };
                let value = std::mem::take(&mut text);
                match e.name().as_ref() {
                    b"title" => item.title = Some(value),
                    b"link" => item.link = Some(value),
                    b"guid" => item.guid = Some(value),
                    b"description" => item.description = Some(value),
                    b"pubDate" => item.pub_date = Some(value),
                    b"category" => item.categories.push(value),
                    b"dc:creator" | b"author" => item.author = Some(value),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Map a raw feed item onto the fixed [`Article`] shape.
pub fn normalize_entry(item: FeedItem) -> Article {
    let published_at = item.pub_date.as_deref().and_then(parse_published_at);
    if published_at.is_none() {
        if let Some(raw) = item.pub_date.as_deref() {
            debug!(pub_date = %raw, "Unparseable pubDate; leaving published_at empty");
        }
    }

    Article {
        published_at,
        summary: non_empty(item.description.map(|d| html_to_text(&d))),
        author: non_empty(item.author),
        categories: item
            .categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .unique()
            .map(str::to_string)
            .collect(),
        guid: non_empty(item.guid),
        ..Article::new(
            non_empty(item.title).unwrap_or_default(),
            non_empty(item.link).unwrap_or_default(),
        )
    }
}

/// Text of the first `<article>` element, one text node per line.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let article = document.select(&ARTICLE_SELECTOR).next()?;
    let text = article
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join("\n");
    (!text.is_empty()).then_some(text)
}

/// HTTP client for the feed and article pages.
#[derive(Debug)]
pub struct TechCrunchClient {
    fetcher: RetryFetch<HttpFetcher>,
}

impl TechCrunchClient {
    pub fn new(user_agent: &str, timeout: Duration, max_retries: usize) -> Result<Self, IntelError> {
        Self::with_backoff(user_agent, timeout, max_retries, Duration::from_millis(500))
    }

    pub fn with_backoff(
        user_agent: &str,
        timeout: Duration,
        max_retries: usize,
        base_delay: Duration,
    ) -> Result<Self, IntelError> {
        let http = HttpFetcher::new(user_agent, timeout)?;
        Ok(Self {
            fetcher: RetryFetch::new(http, max_retries, base_delay),
        })
    }

    /// Fetch the feed and return up to `limit` normalized articles.
    ///
    /// # Arguments
    ///
    /// * `feed_url` - RSS 2.0 feed to read
    /// * `limit` - Maximum number of `<item>`s to keep, in feed order
    ///
    /// # Returns
    ///
    /// One [`Article`] per kept item. Items with missing fields are still
    /// returned, with empty or absent values.
    ///
    /// # Errors
    ///
    /// Returns the classified HTTP error once retries are exhausted (or at
    /// once for 401/403 and other non-retriable statuses), and
    /// [`IntelError::Parse`] when the body is not well-formed XML.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_entries(
        &self,
        feed_url: &str,
        limit: usize,
    ) -> Result<Vec<Article>, IntelError> {
        let xml = self.fetcher.fetch(feed_url).await?;
        let items = parse_feed(&xml, limit)?;
        let articles: Vec<Article> = items.into_iter().map(normalize_entry).collect();
        let untitled = articles.iter().filter(|a| a.title.is_empty()).count();
        if untitled > 0 {
            warn!(untitled, "Feed items without a title");
        }
        info!(count = articles.len(), bytes = xml.len(), "Fetched feed entries");
        Ok(articles)
    }

    /// Fetch an article page's body text.
    ///
    /// # Arguments
    ///
    /// * `url` - Article page to download
    /// * `enabled` - When `false`, returns `Ok(None)` without any request
    ///
    /// # Returns
    ///
    /// Text of the first `<article>` element, one text node per line, or
    /// `None` when the page has no `<article>`.
    ///
    /// # Errors
    ///
    /// Returns the classified HTTP error from the retrying fetcher. Callers in
    /// the pipeline treat any error as "no full text".
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_text(
        &self,
        url: &str,
        enabled: bool,
    ) -> Result<Option<String>, IntelError> {
        if !enabled {
            return Ok(None);
        }
        let html = self.fetcher.fetch(url).await?;
        let text = extract_article_text(&html);
        debug!(found = text.is_some(), "Extracted article text");
        Ok(text)
    }
}

impl FullTextSource for TechCrunchClient {
    async fn fetch_text(&self, url: &str, enabled: bool) -> Result<Option<String>, IntelError> {
        TechCrunchClient::fetch_text(self, url, enabled).await
    }
}
