//! Error types for the sequence engine and search index
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. All failures surface synchronously (or through the
//! returned future in the async pipeline) to the caller of the terminal
//! operation; there is no internal suppression or partial-result return.

use thiserror::Error;

/// Result type alias for lazyseq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pipeline terminals and index mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `first()` was called on an exhausted sequence
    #[error("sequence contains no elements")]
    EmptySequence,

    /// A collecting terminal operation iterated past the capacity guard
    #[error("capacity guard exceeded: iterated more than {limit} elements")]
    CapacityExceeded {
        /// The guard value that was in effect
        limit: usize,
    },

    /// A map/dictionary collector encountered a repeated key with no
    /// collision resolver supplied
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Search index `update`/`delete` called without a configured id
    /// extractor (a configuration precondition, not a recoverable condition)
    #[error("operation `{0}` requires a configured id extractor")]
    MissingIdExtractor(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_empty_sequence() {
        let msg = Error::EmptySequence.to_string();
        assert!(msg.contains("no elements"));
    }

    #[test]
    fn test_error_display_capacity_exceeded() {
        let err = Error::CapacityExceeded { limit: 100_000 };
        let msg = err.to_string();
        assert!(msg.contains("capacity guard"));
        assert!(msg.contains("100000"));
    }

    #[test]
    fn test_error_display_duplicate_key() {
        let err = Error::DuplicateKey("user:42".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Duplicate key") || msg.contains("duplicate key"));
        assert!(msg.contains("user:42"));
    }

    #[test]
    fn test_error_display_missing_id_extractor() {
        let err = Error::MissingIdExtractor("update");
        let msg = err.to_string();
        assert!(msg.contains("update"));
        assert!(msg.contains("id extractor"));
    }

    #[test]
    fn test_error_is_cloneable_and_comparable() {
        let err = Error::CapacityExceeded { limit: 10 };
        assert_eq!(err.clone(), err);
        assert_ne!(err, Error::EmptySequence);
    }
}
