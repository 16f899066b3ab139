//! Feed sources.
//!
//! Each source turns its native feed into normalized [`Article`]s and can
//! optionally supply article body text through
//! [`FullTextSource`](crate::pipeline::FullTextSource).
//!
//! | Source     | Module          | Method                    |
//! |------------|-----------------|---------------------------|
//! | TechCrunch | [`techcrunch`]  | RSS + `<article>` scrape  |
//!
//! [`Article`]: crate::models::Article

pub mod techcrunch;
