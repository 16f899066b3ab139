//! Relevance filtering: an article is worth extracting when it is both
//! AI-related and about funding or an acquisition.

use crate::config::Vocabulary;
use crate::keywords::KeywordMatcher;
use crate::models::Article;

/// Combines the AI matcher with funding and M&A vocabulary.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    ai: KeywordMatcher,
    investment_keywords: Vec<String>,
}

impl RelevanceFilter {
    pub fn new(vocab: &Vocabulary) -> Self {
        let investment_keywords = vocab
            .funding_keywords
            .iter()
            .chain(&vocab.mna_keywords)
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            ai: KeywordMatcher::from_vocabulary(vocab),
            investment_keywords,
        }
    }

    pub fn is_ai_related(&self, article: &Article) -> bool {
        self.ai.matches(&filter_text(article))
    }

    /// Funding or M&A vocabulary anywhere in title, summary or categories.
    ///
    /// Matching is case-insensitive, like the AI check.
    pub fn is_investment_related(&self, article: &Article) -> bool {
        let haystack = filter_text(article).to_lowercase();
        self.investment_keywords
            .iter()
            .any(|k| haystack.contains(k.as_str()))
    }

    pub fn is_relevant(&self, article: &Article) -> bool {
        self.is_ai_related(article) && self.is_investment_related(article)
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

/// Title, summary and space-joined categories, one per line.
fn filter_text(article: &Article) -> String {
    let categories = article.categories.join(" ");
    [
        article.title.as_str(),
        article.summary.as_deref().unwrap_or_default(),
        categories.as_str(),
    ]
    .join("\n")
}
