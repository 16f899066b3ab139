//! Output writers for extracted records and the knowledge-graph bundle.
//!
//! # Output Structure
//!
//! ```text
//! records.jsonl   # one IntelRecord per line (or stdout)
//! kg.json         # {"entities": [...], "relationships": [...]}
//! ```

pub mod json;
