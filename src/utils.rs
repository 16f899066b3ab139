//! Small helpers shared by the extraction core and the I/O collaborators:
//! name normalization for graph ids, timestamp formatting, HTML-to-text
//! flattening, log truncation, and output path preparation.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Lowercase, trim and collapse internal whitespace.
///
/// Used as the key for company and investor ids, so "Acme  AI" and
/// "acme ai" land on the same node.
pub fn normalize_name(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(name.trim(), " ")
        .to_lowercase()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// RFC 3339 / ISO-8601 with a `Z` suffix, matching the serde encoding.
pub fn iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Elements whose boundaries separate words.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p",
    "pre", "section", "table", "td", "th", "tr", "ul",
];

fn push_text(element: ElementRef<'_>, out: &mut String) {
    let block = BLOCK_TAGS.contains(&element.value().name());
    if block {
        out.push(' ');
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            push_text(child, out);
        }
    }
    if block {
        out.push(' ');
    }
}

/// Flatten an HTML fragment (e.g. an RSS `<description>`) to plain text.
///
/// Inline markup is dropped without adding spaces, so `Open<em>AI</em>`
/// stays one word; block elements and line breaks separate words.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    push_text(fragment.root_element(), &mut text);
    collapse_whitespace(&text)
}

/// Truncate a string for logging purposes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure the parent directory of an output file exists.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            info!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Acme   AI "), "acme ai");
        assert_eq!(normalize_name("Sequoia\tCapital\n"), "sequoia capital");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_iso8601_uses_z_suffix() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(iso8601(&dt), "2025-01-02T03:04:05Z");
    }

    #[test]
    fn test_html_to_text() {
        let html = "<p>Acme raises <b>$25M</b>.</p>\n<p>The post <a href=\"x\">appeared</a> first.</p>";
        assert_eq!(html_to_text(html), "Acme raises $25M. The post appeared first.");
        assert_eq!(html_to_text("plain &amp; simple"), "plain & simple");
        assert_eq!(html_to_text("<p>one</p><p>two<br>three</p>"), "one two three");
    }

    #[test]
    fn test_html_to_text_keeps_inline_words_whole() {
        let text = html_to_text("<p>Open<em>AI</em> rival Mistr<b>al</b> raises</p>");
        assert_eq!(text, "OpenAI rival Mistral raises");
        assert!(!crate::keywords::KeywordMatcher::default().matches(&text));
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let result = truncate_for_log("€€€", 4);
        assert_eq!(result, "€…(+6 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested_dirs() {
        let base = std::env::temp_dir().join(format!("tci-utils-{}", std::process::id()));
        let file = base.join("a/b/records.jsonl");
        ensure_parent_dir(&file).await.unwrap();
        assert!(base.join("a/b").is_dir());
        let _ = std::fs::remove_dir_all(&base);
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_bare_filename() {
        ensure_parent_dir(Path::new("records.jsonl")).await.unwrap();
    }
}
