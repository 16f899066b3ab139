//! Record building: filter, optionally fetch full text, extract, and keep
//! only articles with a resolvable company.
//!
//! Articles are processed one at a time in input order. A failed full-text
//! fetch only costs that article its body text; it never fails the batch.

use crate::config::Vocabulary;
use crate::error::IntelError;
use crate::extract::SignalExtractor;
use crate::filter::RelevanceFilter;
use crate::models::{Article, IntelRecord};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

/// Source of article body text for richer extraction.
pub trait FullTextSource {
    /// Body text for `url`, or `None` when disabled or unavailable.
    async fn fetch_text(&self, url: &str, enabled: bool) -> Result<Option<String>, IntelError>;
}

/// A source that never has full text, for RSS-only runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullText;

impl FullTextSource for NoFullText {
    async fn fetch_text(&self, _url: &str, _enabled: bool) -> Result<Option<String>, IntelError> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    filter: RelevanceFilter,
    extractor: SignalExtractor,
}

impl Pipeline {
    pub fn new(vocab: &Vocabulary) -> Self {
        Self {
            filter: RelevanceFilter::new(vocab),
            extractor: SignalExtractor::new(vocab),
        }
    }

    /// Build records stamped with the current time.
    pub async fn build<F>(
        &self,
        articles: &[Article],
        fetcher: &F,
        fetch_full_text: bool,
    ) -> Vec<IntelRecord>
    where
        F: FullTextSource,
    {
        self.build_at(articles, fetcher, fetch_full_text, Utc::now()).await
    }

    /// Build records sharing one `extracted_at` timestamp.
    ///
    /// Each article is checked for relevance first, so irrelevant articles
    /// never cost a page fetch. A relevant article is dropped when no company
    /// can be read from its headline.
    ///
    /// # Arguments
    ///
    /// * `articles` - Normalized feed articles, processed in order
    /// * `fetcher` - Source of article body text
    /// * `fetch_full_text` - Passed through to `fetcher`; `false` means feed text only
    /// * `extracted_at` - Timestamp stamped on every record
    ///
    /// # Returns
    ///
    /// Records in input order. Full-text failures are logged and the article
    /// falls back to its feed text, so this never fails.
    #[instrument(level = "info", skip_all, fields(articles = articles.len(), fetch_full_text = fetch_full_text))]
    pub async fn build_at<F>(
        &self,
        articles: &[Article],
        fetcher: &F,
        fetch_full_text: bool,
        extracted_at: DateTime<Utc>,
    ) -> Vec<IntelRecord>
    where
        F: FullTextSource,
    {
        let records: Vec<IntelRecord> = stream::iter(articles.iter().enumerate())
            .then(|(index, article)| async move {
                if !self.filter.is_relevant(article) {
                    debug!(index, url = %article.url, "Not AI investment news; skipping");
                    return None;
                }

                let full_text = match fetcher.fetch_text(&article.url, fetch_full_text).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(
                            index,
                            url = %article.url,
                            kind = e.kind(),
                            error = %e,
                            "Full text unavailable; using feed text"
                        );
                        None
                    }
                };

                let signal = self.extractor.extract(article, full_text.as_deref());
                if signal.company.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    debug!(
                        index,
                        title = %truncate_for_log(&article.title, 120),
                        "No company in headline; skipping"
                    );
                    return None;
                }

                Some(IntelRecord {
                    article: article.clone(),
                    investment: signal,
                    extracted_at,
                    raw: None,
                })
            })
            .filter_map(std::future::ready)
            .collect()
            .await;

        info!(
            total = articles.len(),
            emitted = records.len(),
            dropped = articles.len() - records.len(),
            "Built intel records"
        );
        records
    }
}
