//! JSON and JSONL serialization for records and graph bundles.
//!
//! Records go out as JSON Lines by default so that downstream tools can stream
//! them; the pretty array form is for people reading stdout. The graph bundle
//! is always a single pretty document.

use crate::error::IntelError;
use crate::kg::KgBundle;
use crate::models::IntelRecord;
use crate::utils::ensure_parent_dir;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Pretty-printed JSON array of records.
pub fn records_to_json(records: &[IntelRecord]) -> Result<String, IntelError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// One compact JSON object per line, newline-terminated when non-empty.
pub fn records_to_jsonl(records: &[IntelRecord]) -> Result<String, IntelError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write records as JSONL to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records_jsonl(records: &[IntelRecord], path: &Path) -> Result<(), IntelError> {
    let body = records_to_jsonl(records)?;
    ensure_parent_dir(path).await?;
    fs::write(path, body).await?;
    info!("Wrote records JSONL");
    Ok(())
}

/// Write the graph bundle as pretty JSON to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_kg_json(bundle: &KgBundle, path: &Path) -> Result<(), IntelError> {
    let mut body = serde_json::to_string_pretty(bundle)?;
    body.push('\n');
    ensure_parent_dir(path).await?;
    fs::write(path, body).await?;
    info!(
        entities = bundle.entities.len(),
        relationships = bundle.relationships.len(),
        "Wrote knowledge-graph bundle"
    );
    Ok(())
}
