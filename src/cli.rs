//! Command-line interface definitions for techcrunch_intel.
//!
//! Every option can also come from the environment where noted, so the tool
//! drops into cron jobs and containers without wrapper scripts.

use crate::scrapers::techcrunch::{DEFAULT_FEED_URL, DEFAULT_USER_AGENT};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Record encoding used when writing to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One compact JSON object per line
    Jsonl,
    /// A single pretty-printed JSON array
    Json,
}

/// Extract AI investment signals from the TechCrunch feed.
///
/// # Examples
///
/// ```sh
/// # Records to stdout, RSS text only
/// techcrunch_intel --limit 20
///
/// # Full-text extraction, records and graph to files
/// techcrunch_intel --fetch-full-text --records-out out/records.jsonl --kg-out out/kg.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// RSS feed to read
    #[arg(long, env = "TECHCRUNCH_FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Maximum number of feed items to consider (1-200)
    #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u16).range(1..=200))]
    pub limit: u16,

    /// Fetch each relevant article page and extract from its body text too
    #[arg(long)]
    pub fetch_full_text: bool,

    /// Write records as JSONL to this file instead of stdout
    #[arg(short, long)]
    pub records_out: Option<PathBuf>,

    /// Encoding for records written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Write the knowledge-graph bundle to this JSON file
    #[arg(short, long)]
    pub kg_out: Option<PathBuf>,

    /// YAML file overriding the keyword vocabulary
    #[arg(long, env = "TECHCRUNCH_INTEL_VOCABULARY")]
    pub vocabulary: Option<PathBuf>,

    /// User agent sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Retries for transient HTTP failures
    #[arg(long, default_value_t = 3)]
    pub max_retries: usize,
}
