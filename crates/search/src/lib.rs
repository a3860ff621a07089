//! Fuzzy text-search index built on the lazyseq pipeline
//!
//! This crate provides:
//! - IndexOptions: traversal and matching configuration with extractor hooks
//! - Term derivation: nested-value traversal, normalization, camel splitting
//! - Scoring: the tiered heuristic (exact, word-boundary, substring, bounded
//!   edit distance)
//! - SearchIndex: build once, incremental upsert/delete by id, ranked queries
//!
//! Items are traversed through their `serde_json::Value` projection
//! (`T: Serialize`), so any serializable item can be indexed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod options;
pub mod scorer;
pub mod terms;

pub use index::{SearchIndex, TreeItem};
pub use options::IndexOptions;
pub use terms::{normalize, uncamel, MAX_TRAVERSAL_DEPTH};
