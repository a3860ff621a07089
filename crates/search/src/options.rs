//! Index configuration
//!
//! Options are supplied once at build time and shared by every later
//! `update`/`delete`/`search` call. Extractor hooks are stored as
//! `Arc<dyn Fn>` so the options (and the index holding them) stay cheaply
//! cloneable.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

/// Extracts the external id of an item
pub type IdExtractor<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Supplies raw terms for an item directly, bypassing traversal
pub type TextExtractor<T> = Arc<dyn Fn(&T) -> Vec<String> + Send + Sync>;

/// Substitutes direct terms for a traversed value; `None` descends normally
pub type ValueToText = Arc<dyn Fn(&Value) -> Option<Vec<String>> + Send + Sync>;

/// Configuration for a [`SearchIndex`](crate::SearchIndex)
///
/// # Example
///
/// ```
/// use lazyseq_search::IndexOptions;
///
/// let options: IndexOptions<serde_json::Value> = IndexOptions::new()
///     .ignore_properties(["internal_id"])
///     .no_uncamel();
/// ```
pub struct IndexOptions<T> {
    pub(crate) fetch_id: Option<IdExtractor<T>>,
    pub(crate) only_properties: Option<HashSet<String>>,
    pub(crate) ignore_properties: HashSet<String>,
    pub(crate) no_levenshtein: bool,
    pub(crate) no_uncamel: bool,
    pub(crate) fetch_text: Option<TextExtractor<T>>,
    pub(crate) any_to_text: Option<ValueToText>,
}

impl<T> Clone for IndexOptions<T> {
    fn clone(&self) -> Self {
        IndexOptions {
            fetch_id: self.fetch_id.clone(),
            only_properties: self.only_properties.clone(),
            ignore_properties: self.ignore_properties.clone(),
            no_levenshtein: self.no_levenshtein,
            no_uncamel: self.no_uncamel,
            fetch_text: self.fetch_text.clone(),
            any_to_text: self.any_to_text.clone(),
        }
    }
}

impl<T> Default for IndexOptions<T> {
    fn default() -> Self {
        IndexOptions {
            fetch_id: None,
            only_properties: None,
            ignore_properties: HashSet::new(),
            no_levenshtein: false,
            no_uncamel: false,
            fetch_text: None,
            any_to_text: None,
        }
    }
}

impl<T> IndexOptions<T> {
    /// Default options: full traversal, all scoring tiers enabled, no id
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: configure the id extractor (required for `update`/`delete`
    /// and for id short-circuit ranking)
    pub fn fetch_id<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.fetch_id = Some(Arc::new(f));
        self
    }

    /// Builder: restrict traversal to these property names
    pub fn only_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_properties = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: skip these property names during traversal
    pub fn ignore_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_properties = names.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: disable the edit-distance fallback tier
    pub fn no_levenshtein(mut self) -> Self {
        self.no_levenshtein = true;
        self
    }

    /// Builder: do not emit the camel-case-split term variant
    pub fn no_uncamel(mut self) -> Self {
        self.no_uncamel = true;
        self
    }

    /// Builder: supply raw terms per item directly, bypassing traversal
    pub fn fetch_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Vec<String> + Send + Sync + 'static,
    {
        self.fetch_text = Some(Arc::new(f));
        self
    }

    /// Builder: partial traversal override; returning `Some(terms)` for a
    /// value substitutes those terms without descending further
    pub fn any_to_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.any_to_text = Some(Arc::new(f));
        self
    }
}
