//! # techcrunch_intel
//!
//! Reads the TechCrunch RSS feed, keeps the AI funding and M&A stories, pulls
//! best-effort investment facts out of their text, and assembles the results
//! into a knowledge-graph bundle.
//!
//! ## Usage
//!
//! ```sh
//! techcrunch_intel --limit 50 --records-out out/records.jsonl --kg-out out/kg.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Ingestion**: fetch the feed and normalize each item into an `Article`
//! 2. **Filtering**: keep articles that are both AI-related and about investment
//! 3. **Extraction**: company, amount, stage, investors from title + text
//! 4. **Graph**: merge records into deterministic entities and relationships
//! 5. **Output**: records as JSONL (file or stdout), bundle as JSON
//!
//! Logs go to stderr so stdout can carry records.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};
use url::Url;

mod api;
mod cli;
mod config;
mod error;
mod extract;
mod filter;
mod keywords;
mod kg;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::{Cli, OutputFormat};
use error::IntelError;
use outputs::json;
use pipeline::{NoFullText, Pipeline};
use scrapers::techcrunch::TechCrunchClient;

const COMMAND: &str = "extract";

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("techcrunch_intel starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let status = match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Run failed");
            eprintln!("{}", error_payload(&e, COMMAND));
            ExitCode::FAILURE
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    status
}

#[instrument(level = "info", skip_all, fields(feed_url = %args.feed_url, limit = args.limit))]
async fn run(args: &Cli) -> Result<(), IntelError> {
    let feed_url = Url::parse(&args.feed_url)
        .map_err(|e| IntelError::Config(format!("invalid feed URL {:?}: {e}", args.feed_url)))?;
    let vocab = config::load_vocabulary(args.vocabulary.as_deref()).await?;

    // Fail on unwritable output paths before touching the network.
    for path in [&args.records_out, &args.kg_out].into_iter().flatten() {
        utils::ensure_parent_dir(path).await?;
    }

    let client = TechCrunchClient::new(
        &args.user_agent,
        Duration::from_secs(args.timeout_secs),
        args.max_retries,
    )?;
    let articles = client
        .fetch_entries(feed_url.as_str(), usize::from(args.limit))
        .await?;

    let pipeline = Pipeline::new(&vocab);
    let records = if args.fetch_full_text {
        pipeline.build(&articles, &client, true).await
    } else {
        pipeline.build(&articles, &NoFullText, false).await
    };

    match &args.records_out {
        Some(path) => json::write_records_jsonl(&records, path).await?,
        None => {
            let body = match args.format {
                OutputFormat::Jsonl => json::records_to_jsonl(&records)?,
                OutputFormat::Json => json::records_to_json(&records)? + "\n",
            };
            print!("{body}");
        }
    }

    let bundle = kg::build_kg_bundle(&records);
    if let Some(path) = &args.kg_out {
        json::write_kg_json(&bundle, path).await?;
    }

    info!(
        articles = articles.len(),
        records = records.len(),
        entities = bundle.entities.len(),
        relationships = bundle.relationships.len(),
        "Run summary"
    );
    Ok(())
}

/// Structured error object printed to stderr on a fatal failure.
fn error_payload(err: &IntelError, command: &str) -> serde_json::Value {
    serde_json::json!({
        "ok": false,
        "error": {
            "kind": err.kind(),
            "message": err.to_string(),
            "command": command,
            "details": {},
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_payload_shape() {
        let err = IntelError::from_status(403, "https://techcrunch.com/feed/");
        let payload = error_payload(&err, COMMAND);
        assert_eq!(payload["ok"], false);
        assert_eq!(payload["error"]["kind"], "access_denied");
        assert_eq!(payload["error"]["command"], "extract");
        assert_eq!(payload["error"]["details"], serde_json::json!({}));
        assert!(payload["error"]["message"].as_str().unwrap().contains("403"));
    }

    #[test]
    fn test_config_error_payload() {
        let err = IntelError::Config("vocabulary has no AI terms".to_string());
        let payload = error_payload(&err, COMMAND);
        assert_eq!(payload["error"]["kind"], "config_error");
    }
}
