//! lazyseq - Lazy, restartable sequence pipelines with fuzzy search
//!
//! Pipelines describe a computation without running it: construction and
//! chaining are free, and every terminal operation pulls a fresh cursor from
//! the source, so one pipeline value can be evaluated any number of times.
//! A mirrored asynchronous surface awaits its callbacks strictly in
//! sequence, and a fuzzy text-search index is built on top of the pipeline.
//!
//! # Quick Start
//!
//! ```
//! use lazyseq::Seq;
//!
//! let evens = Seq::from(vec![1, 2, 3, 4, 5, 6])
//!     .filter(|n, _| n % 2 == 0)
//!     .map(|n, _| n * 10);
//!
//! // Nothing has run yet; each terminal replays the chain from the source
//! assert_eq!(evens.to_array().unwrap(), vec![20, 40, 60]);
//! assert_eq!(evens.count(), 3);
//! ```
//!
//! # Architecture
//!
//! - [`lazyseq_core`]: error taxonomy, capacity-guard configuration and the
//!   value traits shared by the pipelines
//! - [`lazyseq_pipeline`]: the synchronous [`Seq`] and asynchronous
//!   [`AsyncSeq`] pipelines
//! - [`lazyseq_search`]: the [`SearchIndex`] built on top of the pipeline

pub use lazyseq_core::{
    capacity_guard, set_capacity_guard, Error, Result, Tagged, Truthy, ValueKind,
    DEFAULT_CAPACITY_GUARD,
};
pub use lazyseq_pipeline::{AsyncCursor, AsyncSeq, Cursor, Seq};
pub use lazyseq_search::{normalize, uncamel, IndexOptions, SearchIndex, TreeItem};
