//! Data models for feed articles and the investment intel derived from them.
//!
//! - [`Article`]: one normalized RSS item
//! - [`InvestmentSignal`]: best-effort funding/M&A facts extracted from an article
//! - [`IntelRecord`]: an article paired with its signal, ready for export
//!
//! All three are built once per run and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label stamped on every ingested article.
pub const SOURCE_LABEL: &str = "techcrunch";

/// A single feed item after normalization.
///
/// `url` is treated as the article's identity when building the graph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub guid: Option<String>,
    pub source: String,
}

impl Article {
    /// Create an article with only a title and URL set.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            published_at: None,
            summary: None,
            author: None,
            categories: Vec::new(),
            guid: None,
            source: SOURCE_LABEL.to_string(),
        }
    }
}

/// Structured guess about the deal an article reports.
///
/// Every field is independent; a missing match leaves the field empty rather
/// than defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvestmentSignal {
    pub ai_relevant: bool,
    pub company: Option<String>,
    /// Currency, number and magnitude exactly as written, e.g. `"$25M"`.
    pub amount_text: Option<String>,
    /// Lowercase stage label, e.g. `"series a"`.
    pub stage: Option<String>,
    /// Investor names in order of first mention.
    pub investors: Vec<String>,
    pub notes: Option<String>,
}

/// An article together with the signal extracted from it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IntelRecord {
    pub article: Article,
    pub investment: InvestmentSignal,
    pub extracted_at: DateTime<Utc>,
    pub raw: Option<serde_json::Value>,
}
