//! Keyword vocabularies used by the matcher, filter and extractor.
//!
//! The defaults cover TechCrunch's AI and funding coverage. A YAML file can
//! override any subset of the lists; omitted lists keep their defaults.
//!
//! ```yaml
//! ai_phrases:
//!   - artificial intelligence
//!   - computer vision
//! ai_tokens:
//!   - ai
//!   - ml
//! ```

use crate::error::IntelError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Phrase and token lists driving relevance decisions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Multi-word phrases matched as case-insensitive substrings.
    pub ai_phrases: Vec<String>,
    /// Short tokens matched as case-insensitive whole words.
    pub ai_tokens: Vec<String>,
    /// Funding vocabulary for the investment check.
    pub funding_keywords: Vec<String>,
    /// Mergers and acquisitions vocabulary for the investment check.
    pub mna_keywords: Vec<String>,
}

const DEFAULT_AI_PHRASES: &[&str] = &[
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural network",
    "generative ai",
    "genai",
    "large language model",
    "large language models",
    "llm",
    "foundation model",
    "foundation models",
];

const DEFAULT_AI_TOKENS: &[&str] = &["ai"];

const DEFAULT_FUNDING_KEYWORDS: &[&str] = &[
    "raises",
    "raised",
    "lands",
    "secures",
    "closes",
    "funding",
    "seed",
    "pre-seed",
    "series a",
    "series b",
    "series c",
    "series d",
    "series e",
    "round",
    "valuation",
    "backed by",
    "led by",
    "participation from",
];

const DEFAULT_MNA_KEYWORDS: &[&str] = &["acquires", "acquired", "acquisition"];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            ai_phrases: owned(DEFAULT_AI_PHRASES),
            ai_tokens: owned(DEFAULT_AI_TOKENS),
            funding_keywords: owned(DEFAULT_FUNDING_KEYWORDS),
            mna_keywords: owned(DEFAULT_MNA_KEYWORDS),
        }
    }
}

impl Vocabulary {
    /// Parse a YAML vocabulary document.
    pub fn from_yaml(yaml: &str) -> Result<Self, IntelError> {
        let vocab: Vocabulary = serde_yaml::from_str(yaml)?;
        if vocab.ai_phrases.is_empty() && vocab.ai_tokens.is_empty() {
            return Err(IntelError::Config(
                "vocabulary must define at least one AI phrase or token".to_string(),
            ));
        }
        Ok(vocab)
    }
}

/// Load the vocabulary from `path`, or the defaults when no path is given.
#[instrument(level = "info", skip_all, fields(path = ?path))]
pub async fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary, IntelError> {
    let Some(path) = path else {
        return Ok(Vocabulary::default());
    };
    let yaml = fs::read_to_string(path).await?;
    let vocab = Vocabulary::from_yaml(&yaml)?;
    info!(
        ai_phrases = vocab.ai_phrases.len(),
        ai_tokens = vocab.ai_tokens.len(),
        funding_keywords = vocab.funding_keywords.len(),
        mna_keywords = vocab.mna_keywords.len(),
        "Loaded vocabulary override"
    );
    Ok(vocab)
}
