//! Lazy, restartable sequence pipelines
//!
//! This crate provides:
//! - `Seq<T>`: a chainable synchronous pipeline over a restartable sequence
//! - `AsyncSeq<T>`: the same combinator set where every pull may suspend
//!
//! A pipeline stage owns a cursor *factory*, never a cursor: nothing runs at
//! construction time, and every terminal operation pulls a brand-new cursor,
//! replaying the whole upstream chain (including any side effects in
//! transform callbacks). Collecting terminals enforce the capacity guard from
//! `lazyseq_core::config`.
//!
//! # Example
//!
//! ```
//! use lazyseq_pipeline::Seq;
//!
//! let seq = Seq::from(vec![1, 2, 3, 4])
//!     .filter(|x, _| x % 2 == 0)
//!     .map(|x, _| x * 10);
//! assert_eq!(seq.to_array().unwrap(), vec![20, 40]);
//! // Pipelines are restartable: a second terminal replays the chain.
//! assert_eq!(seq.to_array().unwrap(), vec![20, 40]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod async_seq;
pub mod seq;

pub use async_seq::{AsyncCursor, AsyncSeq};
pub use seq::{Cursor, Seq};
