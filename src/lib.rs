//! # boolit
//!
//! `boolit` builds an on-disk inverted index over a corpus of crawled HTML
//! documents and answers boolean keyword queries against it.
//!
//! Construction is streaming and bounded-memory: documents are read one at a
//! time, deduplicated (exact via SHA-256, near via SimHash banding),
//! tokenized and stemmed, and accumulated into an in-memory index that spills
//! to a size-bounded partial index on disk every `batch_size` documents. The
//! partials are then combined with a disk-based k-way merge into a final
//! index sharded by a token's leading character.
//!
//! Queries are boolean (`AND`/`OR`) over posting lists fetched only from the
//! shards a query's tokens touch, ranked by term frequency plus a bonus for
//! title and heading occurrences.
//!
//! ## Example
//!
//! ```no_run
//! use boolit::config::IndexBuilderConfig;
//! use boolit::builder::build_index;
//! use boolit::query::{search, SearchMode};
//!
//! let config = IndexBuilderConfig::load().unwrap();
//! let stats = build_index(&config).unwrap();
//! println!("{}", stats.report());
//!
//! let results = search(&config.final_index_dir, "rust programming", SearchMode::And).unwrap();
//! for result in &results {
//!     println!("{} ({})", result.url, result.score);
//! }
//! ```

pub mod analytics;
pub mod builder;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod dedup;
pub mod doc_mapping;
pub mod errors;
pub mod extract;
pub mod index_io;
pub mod merge;
pub mod models;
pub mod query;
pub mod tokenizer;

// Tests are defined in their respective modules with #[cfg(test)]
