//! Rule-based topical relevance matching.
//!
//! Phrases are matched as case-insensitive substrings. Short tokens such as
//! `ai` are matched as whole words so that "laid" or "chair" do not count.

use crate::config::Vocabulary;
use regex::{Regex, RegexBuilder};

/// Phrase and whole-token matcher built from a [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    phrases: Vec<String>,
    tokens: Vec<Regex>,
}

impl KeywordMatcher {
    pub fn new<P, T>(phrases: P, tokens: T) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter_map(|t| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&t)))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        Self { phrases, tokens }
    }

    /// AI matcher over the vocabulary's phrase and token lists.
    pub fn from_vocabulary(vocab: &Vocabulary) -> Self {
        Self::new(&vocab.ai_phrases, &vocab.ai_tokens)
    }

    /// True when any phrase or whole token occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let haystack = text.to_lowercase();
        if self.phrases.iter().any(|p| haystack.contains(p.as_str())) {
            return true;
        }
        self.tokens.iter().any(|re| re.is_match(text))
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::from_vocabulary(&Vocabulary::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_boundary() {
        let matcher = KeywordMatcher::default();
        assert!(matcher.matches("We build AI models"));
        assert!(!matcher.matches("We were laid off yesterday"));
        assert!(!matcher.matches("The chair resigned"));
    }

    #[test]
    fn test_token_at_punctuation() {
        let matcher = KeywordMatcher::default();
        assert!(matcher.matches("Acme (AI) raises"));
        assert!(matcher.matches("ai-powered search"));
    }

    #[test]
    fn test_phrase_is_case_insensitive_substring() {
        let matcher = KeywordMatcher::default();
        assert!(matcher.matches("A new Large Language Model startup"));
        assert!(matcher.matches("GenAI tooling"));
        assert!(matcher.matches("built on LLMs"));
    }

    #[test]
    fn test_empty_text_never_matches() {
        assert!(!KeywordMatcher::default().matches(""));
    }

    #[test]
    fn test_custom_vocabulary() {
        let matcher = KeywordMatcher::new(["quantum computing"], ["qpu"]);
        assert!(matcher.matches("Quantum Computing startup raises"));
        assert!(matcher.matches("a faster QPU"));
        assert!(!matcher.matches("We build AI models"));
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        let matcher = KeywordMatcher::new(["", "  "], [" "]);
        assert!(!matcher.matches("anything at all"));
    }
}
