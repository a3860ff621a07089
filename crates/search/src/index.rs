//! The fuzzy search index
//!
//! Built once over a collection; supports incremental upsert/delete by
//! external id and ranked queries. The backing store is the original ordered
//! list plus an id-to-position map that is maintained only when an id
//! extractor is configured.
//!
//! The index is not designed for concurrent mutation during a scan:
//! `search` borrows `&self` while `update`/`delete` take `&mut self`, so the
//! borrow checker rules out interleaving within one host.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use lazyseq_core::{Error, Result};

use crate::options::IndexOptions;
use crate::scorer::QueryMatcher;
use crate::terms::{derive_terms, normalize};

/// Rank of an exact, unnormalized id hit
const ID_MATCH_SCORE: f64 = 100_001.0;
/// Rank of an id hit after normalization
const NORMALIZED_ID_MATCH_SCORE: f64 = 100_000.0;

/// An indexed item paired with its derived term list
///
/// Replaced in place (same slot, new terms and item) when the item is
/// updated.
pub struct TreeItem<T> {
    item: T,
    terms: Vec<String>,
}

impl<T> TreeItem<T> {
    /// The original item
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The derived, normalized term list
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Fuzzy text-search index over an ordered collection
pub struct SearchIndex<T> {
    entries: Vec<TreeItem<T>>,
    by_id: HashMap<String, usize>,
    options: IndexOptions<T>,
}

impl<T: Serialize> SearchIndex<T> {
    /// Build the index over `items` with the given options
    pub fn new(items: Vec<T>, options: IndexOptions<T>) -> Self {
        let mut index = SearchIndex {
            entries: Vec::with_capacity(items.len()),
            by_id: HashMap::new(),
            options,
        };
        for item in items {
            index.append(item);
        }
        debug!(items = index.entries.len(), "built search index");
        index
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no items
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The indexed items in their original order
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(TreeItem::item)
    }

    /// The indexed entries (item + terms) in their original order
    pub fn entries(&self) -> impl Iterator<Item = &TreeItem<T>> {
        self.entries.iter()
    }

    /// Look an item up by its external id
    ///
    /// Always `None` when no id extractor is configured.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&pos| self.entries[pos].item())
    }

    /// Insert or replace an item, keyed by its external id
    ///
    /// A new id appends to the collection; a known id replaces the stored
    /// item and its terms in place (last write wins). Requires a configured
    /// id extractor.
    pub fn update(&mut self, item: T) -> Result<()> {
        let fetch_id = self
            .options
            .fetch_id
            .as_ref()
            .ok_or(Error::MissingIdExtractor("update"))?;
        let id = fetch_id(&item);
        let terms = derive_terms(&item, &self.options);
        match self.by_id.get(&id) {
            Some(&pos) => {
                self.entries[pos] = TreeItem { item, terms };
                debug!(%id, "replaced indexed item");
            }
            None => {
                self.by_id.insert(id, self.entries.len());
                self.entries.push(TreeItem { item, terms });
            }
        }
        Ok(())
    }

    /// Remove an item by id; returns whether anything was removed
    ///
    /// Requires a configured id extractor.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if self.options.fetch_id.is_none() {
            return Err(Error::MissingIdExtractor("delete"));
        }
        match self.by_id.remove(id) {
            None => Ok(false),
            Some(pos) => {
                self.entries.remove(pos);
                // Positions after the removed slot all shifted down by one
                for position in self.by_id.values_mut() {
                    if *position > pos {
                        *position -= 1;
                    }
                }
                debug!(%id, "deleted indexed item");
                Ok(true)
            }
        }
    }

    /// Remove an item by extracting its id; returns whether anything was
    /// removed
    pub fn delete_item(&mut self, item: &T) -> Result<bool> {
        let fetch_id = self
            .options
            .fetch_id
            .as_ref()
            .ok_or(Error::MissingIdExtractor("delete"))?;
        let id = fetch_id(item);
        self.delete(&id)
    }

    /// Ranked search over all items
    pub fn search(&self, query: &str) -> Vec<&T> {
        self.search_where(query, |_| true)
    }

    /// Ranked search over the items accepted by `predicate`
    ///
    /// An empty query returns the accepted items in their original order
    /// without scoring. Otherwise items are ranked by the average of their
    /// strictly-positive term scores; items with no qualifying term are
    /// excluded. An exact id hit ranks above any text score and skips term
    /// scoring entirely.
    pub fn search_where<P>(&self, query: &str, predicate: P) -> Vec<&T>
    where
        P: Fn(&T) -> bool,
    {
        if query.is_empty() {
            return self
                .entries
                .iter()
                .map(TreeItem::item)
                .filter(|item| predicate(item))
                .collect();
        }

        let matcher = QueryMatcher::new(normalize(query), self.options.no_levenshtein);
        let mut scored: Vec<(f64, &T)> = Vec::new();
        for entry in &self.entries {
            if !predicate(&entry.item) {
                continue;
            }
            if let Some(fetch_id) = &self.options.fetch_id {
                let id = fetch_id(&entry.item);
                if id == query {
                    scored.push((ID_MATCH_SCORE, &entry.item));
                    continue;
                }
                if normalize(&id) == matcher.normalized() {
                    scored.push((NORMALIZED_ID_MATCH_SCORE, &entry.item));
                    continue;
                }
            }

            let mut total = 0.0;
            let mut qualifying = 0usize;
            for term in &entry.terms {
                let score = matcher.score_term(term);
                if score > 0.0 {
                    total += score;
                    qualifying += 1;
                }
            }
            if qualifying > 0 {
                scored.push((total / qualifying as f64, &entry.item));
            }
        }

        // Stable sort: ties keep encounter order, so results stay
        // deterministic
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        debug!(query, results = scored.len(), "search ranked");
        scored.into_iter().map(|(_, item)| item).collect()
    }

    fn append(&mut self, item: T) {
        let terms = derive_terms(&item, &self.options);
        if let Some(fetch_id) = &self.options.fetch_id {
            self.by_id.insert(fetch_id(&item), self.entries.len());
        }
        self.entries.push(TreeItem { item, terms });
    }
}

// ============================================================================
// Tests
// ============================================================================
