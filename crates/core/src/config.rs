//! Capacity-guard configuration
//!
//! Collecting terminal operations (`to_array`, `to_map`, `to_dictionary`,
//! `to_lookup` and friends) refuse to iterate past a fixed element count.
//! Exceeding the guard is a fatal error, not a truncation: it distinguishes a
//! deliberate "stop after N" (`take`) from accidental consumption of an
//! unbounded source.
//!
//! The guard is process-wide and can be overridden per pipeline with
//! `with_capacity_guard` for tests that need a small bound.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default upper bound on elements iterated by a collecting terminal
pub const DEFAULT_CAPACITY_GUARD: usize = 100_000;

static CAPACITY_GUARD: AtomicUsize = AtomicUsize::new(DEFAULT_CAPACITY_GUARD);

/// Current process-wide capacity guard
pub fn capacity_guard() -> usize {
    CAPACITY_GUARD.load(Ordering::Acquire)
}

/// Replace the process-wide capacity guard
///
/// Affects every collecting terminal that has no per-pipeline override.
/// Intended for host configuration at startup; tests should prefer the
/// per-pipeline override to stay parallel-safe.
pub fn set_capacity_guard(limit: usize) {
    CAPACITY_GUARD.store(limit, Ordering::Release);
}
