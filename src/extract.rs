//! Best-effort investment signal extraction from article text.
//!
//! Each field is pulled independently with a regular expression or a marker
//! scan over the title, summary and (when fetched) the article body. Fields
//! that cannot be found stay `None`; nothing is guessed.
//!
//! | Field        | Looks at                         | Example            |
//! |--------------|----------------------------------|--------------------|
//! | `company`    | title only                       | `Acme AI`          |
//! | `amount_text`| title + summary + body           | `$25M`             |
//! | `stage`      | title + summary + body           | `series a`         |
//! | `investors`  | title + summary + body           | `["Sequoia"]`      |
//! | `notes`      | title + summary + body           | `fund_raise_story` |

use crate::config::Vocabulary;
use crate::keywords::KeywordMatcher;
use crate::models::{Article, InvestmentSignal};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Annotation for stories about investment firms closing a fund.
pub const FUND_RAISE_NOTE: &str = "fund_raise_story";

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<currency>\$|€|£)\s?(?P<value>\d{1,3}(?:,\d{3})*(?:\.\d+)?)\s?(?P<unit>k|m|b|thousand|million|billion)?\b",
    )
    .expect("valid amount regex")
});

static STAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(pre-seed\b|seed\b|series\s+[a-h](?:\s+extension\b|\+|\b))",
    )
    .expect("valid stage regex")
});

static RAISES_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<company>.+?)\s+(raises|raised|lands|secures|closes)\b")
        .expect("valid raises regex")
});

static ACQUIRES_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<company>.+?)\s+(acquires|acquired|buys|to\s+buy)\b")
        .expect("valid acquires regex")
});

static TITLE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(exclusive:|report:)\s*").expect("valid prefix regex"));

static FUNDLIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(fund|funds)\b").expect("valid fund regex"));

static FILLER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(including|such as)\s+").expect("valid filler regex"));

/// Phrases that introduce investor lists, scanned in this order.
static INVESTOR_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["led by", "participation from", "backed by"]
        .iter()
        .map(|m| Regex::new(&format!("(?i){}", regex::escape(m))).expect("valid marker regex"))
        .collect()
});

const FRAGMENT_STOPS: [&str; 4] = [". ", "\n", ")", ";"];

/// Turns an article into an [`InvestmentSignal`].
#[derive(Debug, Clone, Default)]
pub struct SignalExtractor {
    ai: KeywordMatcher,
}

impl SignalExtractor {
    pub fn new(vocab: &Vocabulary) -> Self {
        Self {
            ai: KeywordMatcher::from_vocabulary(vocab),
        }
    }

    /// Extract a signal from the article and, optionally, its full body text.
    pub fn extract(&self, article: &Article, full_text: Option<&str>) -> InvestmentSignal {
        let summary = article.summary.as_deref().unwrap_or_default();
        let body = full_text.unwrap_or_default();
        let text = [article.title.as_str(), summary, body].join("\n");
        let text = text.trim();

        // Categories widen the AI check here, unlike the relevance filter's text.
        let categories = article.categories.join(" ");
        let ai_context = [article.title.as_str(), summary, categories.as_str(), body].join("\n");

        let title_lower = article.title.to_lowercase();
        let notes = (FUNDLIKE_RE.is_match(text)
            && (title_lower.contains("raises") || title_lower.contains("raised")))
        .then(|| FUND_RAISE_NOTE.to_string());

        InvestmentSignal {
            ai_relevant: self.ai.matches(&ai_context),
            company: extract_company(&article.title),
            amount_text: extract_amount(text),
            stage: extract_stage(text),
            investors: extract_investors(text),
            notes,
        }
    }
}

/// Company name from a "X raises ..." or "X acquires ..." headline.
fn extract_company(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let caps = RAISES_TITLE_RE
        .captures(title)
        .or_else(|| ACQUIRES_TITLE_RE.captures(title))?;
    let company = caps.name("company")?.as_str().trim();
    let company = TITLE_PREFIX_RE.replace(company, "");
    let company = company.trim();
    (!company.is_empty()).then(|| company.to_string())
}

/// First currency amount, kept verbatim minus inner whitespace.
fn extract_amount(text: &str) -> Option<String> {
    let caps = AMOUNT_RE.captures(text)?;
    let currency = caps.name("currency")?.as_str();
    let value = caps.name("value")?.as_str();
    let unit = caps.name("unit").map(|m| m.as_str()).unwrap_or_default();
    Some(format!("{currency}{value}{unit}"))
}

fn extract_stage(text: &str) -> Option<String> {
    STAGE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
}

/// Investor names following "led by", "participation from" and "backed by".
fn extract_investors(text: &str) -> Vec<String> {
    INVESTOR_MARKERS
        .iter()
        .filter_map(|marker| slice_after(text, marker))
        .flat_map(split_org_list)
        .map(|name| {
            name.trim_matches(|c: char| " ,.;:-\n\t".contains(c))
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .unique()
        .collect()
}

/// Text after the first `marker` match, cut at the nearest sentence-ish stop.
fn slice_after<'a>(text: &'a str, marker: &Regex) -> Option<&'a str> {
    let m = marker.find(text)?;
    let rest = &text[m.end()..];
    let end = FRAGMENT_STOPS
        .iter()
        .filter_map(|stop| rest.find(stop))
        .min()
        .unwrap_or(rest.len());
    let fragment = rest[..end].trim();
    (!fragment.is_empty()).then_some(fragment)
}

/// Split "A, B and C" into names, dropping "including"/"such as" lead-ins.
fn split_org_list(fragment: &str) -> Vec<String> {
    fragment
        .replace(" and ", ",")
        .split(',')
        .map(|part| FILLER_RE.replace(part.trim(), "").trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
