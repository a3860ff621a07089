//! Core types and traits shared by the lazyseq crates
//!
//! This crate defines the foundation the pipeline and search crates build on:
//! - Error: the error taxonomy for terminal operations and index mutation
//! - Capacity guard: the process-wide bound enforced by collecting terminals
//! - ValueKind / Tagged: explicit runtime type descriptors for `instances_of`
//! - Truthy: the truthiness capability behind `not_default`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{capacity_guard, set_capacity_guard, DEFAULT_CAPACITY_GUARD};
pub use error::{Error, Result};
pub use types::{Tagged, Truthy, ValueKind};
