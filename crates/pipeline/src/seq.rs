//! Synchronous pipeline
//!
//! `Seq<T>` wraps a restartable sequence behind a cursor factory. Each chain
//! operation returns a new `Seq` whose factory closes over the upstream
//! factory; pulling a fresh cursor re-executes the whole chain from the
//! source. Stage-local state (the take/skip countdowns, filter indices, the
//! `unique` seen-set) lives inside the cursor, so it resets on every pull.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use lazyseq_core::{capacity_guard, Error, Result, Tagged, Truthy};
use tracing::warn;

use crate::async_seq::AsyncSeq;

/// Single-use iteration state pulled from a sequence
pub type Cursor<T> = Box<dyn Iterator<Item = T> + Send>;

type Factory<T> = Arc<dyn Fn() -> Cursor<T> + Send + Sync>;

/// A chainable, restartable synchronous sequence pipeline
pub struct Seq<T: 'static> {
    factory: Factory<T>,
    guard: Option<usize>,
}

impl<T> Clone for Seq<T> {
    fn clone(&self) -> Self {
        Seq {
            factory: Arc::clone(&self.factory),
            guard: self.guard,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for Seq<T> {
    fn from(items: Vec<T>) -> Self {
        Seq::from_factory(move || items.clone().into_iter())
    }
}

// ============================================================================
// Construction
// ============================================================================

impl<T: 'static> Seq<T> {
    /// Create a pipeline from a cursor factory
    ///
    /// The factory is invoked once per terminal operation; each invocation
    /// must yield an independent cursor over the source.
    pub fn from_factory<I, F>(factory: F) -> Self
    where
        I: Iterator<Item = T> + Send + 'static,
        F: Fn() -> I + Send + Sync + 'static,
    {
        Seq {
            factory: Arc::new(move || Box::new(factory()) as Cursor<T>),
            guard: None,
        }
    }

    /// A pipeline that yields nothing
    pub fn empty() -> Self {
        Seq::from_factory(|| std::iter::empty())
    }

    /// Pull a fresh cursor (the raw sequence protocol, no capacity guard)
    pub fn cursor(&self) -> Cursor<T> {
        (self.factory)()
    }

    /// Override the capacity guard for this pipeline's collecting terminals
    pub fn with_capacity_guard(&self, limit: usize) -> Self {
        Seq {
            factory: Arc::clone(&self.factory),
            guard: Some(limit),
        }
    }

    fn effective_guard(&self) -> usize {
        self.guard.unwrap_or_else(capacity_guard)
    }
}

impl Seq<i64> {
    /// Arithmetic range, mirroring the host utility it replaces: empty when
    /// `start == end` or `step == 0`, stride `|step|`, counting down when
    /// `start > end`
    pub fn range(start: i64, end: i64, step: i64) -> Seq<i64> {
        if start == end || step == 0 {
            return Seq::empty();
        }
        // Unsigned stride plus checked stepping keep the whole i64 domain
        // panic-free, including step == i64::MIN and spans wider than i64
        let stride = step.unsigned_abs();
        Seq::from_factory(move || {
            std::iter::successors(Some(start), move |&v| {
                let next = if start > end {
                    v.checked_sub_unsigned(stride)
                } else {
                    v.checked_add_unsigned(stride)
                };
                next.filter(|&n| if start > end { n > end } else { n < end })
            })
        })
    }
}

// ============================================================================
// Chain operations
// ============================================================================

impl<T: 'static> Seq<T> {
    /// Yield up to `n` items then stop; a fresh pull restarts the countdown
    pub fn take(&self, n: usize) -> Seq<T> {
        let up = Arc::clone(&self.factory);
        self.derive(move || up().take(n))
    }

    /// Discard the first `n` items of each fresh pull, yield the rest
    pub fn skip(&self, n: usize) -> Seq<T> {
        let up = Arc::clone(&self.factory);
        self.derive(move || up().skip(n))
    }

    /// Pair items positionally with `other`, stopping at the shorter side
    pub fn zip<U: 'static>(&self, other: &Seq<U>) -> Seq<(T, U)> {
        let a = Arc::clone(&self.factory);
        let b = Arc::clone(&other.factory);
        self.derive(move || a().zip(b()))
    }

    /// Transform each item; the index is the 0-based position within this
    /// stage's pull and resets on every fresh pull
    pub fn map<U, F>(&self, f: F) -> Seq<U>
    where
        U: 'static,
        F: Fn(T, usize) -> U + Send + Sync + 'static,
    {
        let up = Arc::clone(&self.factory);
        let f = Arc::new(f);
        self.derive(move || {
            let f = Arc::clone(&f);
            up().enumerate().map(move |(i, x)| f(x, i))
        })
    }

    /// Keep items where the predicate holds; the index counts every item this
    /// stage has seen, including filtered-out ones
    pub fn filter<F>(&self, predicate: F) -> Seq<T>
    where
        F: Fn(&T, usize) -> bool + Send + Sync + 'static,
    {
        let up = Arc::clone(&self.factory);
        let predicate = Arc::new(predicate);
        self.derive(move || {
            let predicate = Arc::clone(&predicate);
            up().enumerate()
                .filter(move |(i, x)| predicate(x, *i))
                .map(|(_, x)| x)
        })
    }

    /// Keep items whose runtime tag matches `tag`
    pub fn instances_of(&self, tag: T::Tag) -> Seq<T>
    where
        T: Tagged,
        T::Tag: Send + Sync + 'static,
    {
        self.filter(move |x, _| x.tag() == tag)
    }

    /// Flatten per-item sub-sequences into a single stream; an absent
    /// sub-sequence counts as empty
    pub fn select_many<U, I, F>(&self, f: F) -> Seq<U>
    where
        U: 'static,
        I: IntoIterator<Item = U> + Send + 'static,
        I::IntoIter: Send + 'static,
        F: Fn(T) -> Option<I> + Send + Sync + 'static,
    {
        let up = Arc::clone(&self.factory);
        let f = Arc::new(f);
        self.derive(move || {
            let f = Arc::clone(&f);
            up().flat_map(move |x| f(x).into_iter().flat_map(I::into_iter))
        })
    }

    /// Keep only truthy items
    ///
    /// This is a truthiness filter, not a null-check: 0, 0.0, "" and `None`
    /// are all dropped (a documented quirk of the original surface).
    pub fn not_default(&self) -> Seq<T>
    where
        T: Truthy,
    {
        self.filter(|x, _| x.is_truthy())
    }

    /// Yield this sequence fully, then `other`; `None` behaves as identity
    pub fn concat<S>(&self, other: Option<S>) -> Seq<T>
    where
        S: Into<Seq<T>>,
    {
        match other {
            None => self.clone(),
            Some(other) => {
                let a = Arc::clone(&self.factory);
                let b = Arc::clone(&other.into().factory);
                self.derive(move || a().chain(b()))
            }
        }
    }

    /// Yield the first-seen item per derived key, suppressing later
    /// duplicates; the seen-set is per cursor and not capacity-bounded
    pub fn unique_by<K, F>(&self, key: F) -> Seq<T>
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let up = Arc::clone(&self.factory);
        let key = Arc::new(key);
        self.derive(move || {
            let key = Arc::clone(&key);
            let mut seen = HashSet::new();
            up().filter(move |x| seen.insert(key(x)))
        })
    }

    /// `unique_by` with the item itself as the key
    pub fn unique(&self) -> Seq<T>
    where
        T: Clone + Eq + Hash + Send,
    {
        self.unique_by(|x| x.clone())
    }

    /// Bridge to the asynchronous pipeline, re-wrapping the same restartable
    /// source
    pub fn to_async(&self) -> AsyncSeq<T>
    where
        T: Send,
    {
        let bridged = AsyncSeq::from_seq(self);
        match self.guard {
            Some(limit) => bridged.with_capacity_guard(limit),
            None => bridged,
        }
    }

    fn derive<U, I, F>(&self, factory: F) -> Seq<U>
    where
        U: 'static,
        I: Iterator<Item = U> + Send + 'static,
        F: Fn() -> I + Send + Sync + 'static,
    {
        Seq {
            factory: Arc::new(move || Box::new(factory()) as Cursor<U>),
            guard: self.guard,
        }
    }
}

// ============================================================================
// Terminal operations
// ============================================================================

impl<T: 'static> Seq<T> {
    /// Collect into a `Vec`, enforcing the capacity guard
    pub fn to_array(&self) -> Result<Vec<T>> {
        self.collect_guarded(Vec::new(), |out, item| {
            out.push(item);
            Ok(())
        })
    }

    /// Collect into a map keyed by `key`; a repeated key is an error
    pub fn to_map<K, F>(&self, key: F) -> Result<HashMap<K, T>>
    where
        K: Eq + Hash + Debug,
        F: Fn(&T) -> K,
    {
        self.to_map_select(key, |item| item)
    }

    /// Collect into a map of selected values; a repeated key is an error
    pub fn to_map_select<K, V, FK, FV>(&self, key: FK, select: FV) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash + Debug,
        FK: Fn(&T) -> K,
        FV: Fn(T) -> V,
    {
        self.collect_guarded(HashMap::new(), |map, item| {
            let k = key(&item);
            if map.contains_key(&k) {
                return Err(Error::DuplicateKey(format!("{:?}", k)));
            }
            map.insert(k, select(item));
            Ok(())
        })
    }

    /// Collect into a map of selected values, resolving key collisions with
    /// `resolve(existing, incoming)`; the resolver's return value is stored
    pub fn to_map_resolving<K, V, FK, FV, FR>(
        &self,
        key: FK,
        select: FV,
        resolve: FR,
    ) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash,
        FK: Fn(&T) -> K,
        FV: Fn(T) -> V,
        FR: Fn(V, V) -> V,
    {
        self.collect_guarded(HashMap::new(), |map, item| {
            let k = key(&item);
            let incoming = select(item);
            let value = match map.remove(&k) {
                Some(existing) => resolve(existing, incoming),
                None => incoming,
            };
            map.insert(k, value);
            Ok(())
        })
    }

    /// Collect into an ordered string-keyed dictionary; a repeated key is an
    /// error
    pub fn to_dictionary<F>(&self, key: F) -> Result<BTreeMap<String, T>>
    where
        F: Fn(&T) -> String,
    {
        self.to_dictionary_select(key, |item| item)
    }

    /// Dictionary variant selecting the stored value
    pub fn to_dictionary_select<V, FK, FV>(&self, key: FK, select: FV) -> Result<BTreeMap<String, V>>
    where
        FK: Fn(&T) -> String,
        FV: Fn(T) -> V,
    {
        self.collect_guarded(BTreeMap::new(), |map, item| {
            let k = key(&item);
            if map.contains_key(&k) {
                return Err(Error::DuplicateKey(k));
            }
            map.insert(k, select(item));
            Ok(())
        })
    }

    /// Dictionary variant resolving key collisions with
    /// `resolve(existing, incoming)`
    pub fn to_dictionary_resolving<V, FK, FV, FR>(
        &self,
        key: FK,
        select: FV,
        resolve: FR,
    ) -> Result<BTreeMap<String, V>>
    where
        FK: Fn(&T) -> String,
        FV: Fn(T) -> V,
        FR: Fn(V, V) -> V,
    {
        self.collect_guarded(BTreeMap::new(), |map, item| {
            let k = key(&item);
            let incoming = select(item);
            let value = match map.remove(&k) {
                Some(existing) => resolve(existing, incoming),
                None => incoming,
            };
            map.insert(k, value);
            Ok(())
        })
    }

    /// Group items by key, preserving encounter order within each group
    pub fn to_lookup<K, F>(&self, key: F) -> Result<HashMap<K, Vec<T>>>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        self.to_lookup_select(key, |item| item)
    }

    /// Lookup variant selecting the grouped values
    pub fn to_lookup_select<K, V, FK, FV>(&self, key: FK, select: FV) -> Result<HashMap<K, Vec<V>>>
    where
        K: Eq + Hash,
        FK: Fn(&T) -> K,
        FV: Fn(T) -> V,
    {
        self.collect_guarded(HashMap::new(), |map: &mut HashMap<K, Vec<V>>, item| {
            let k = key(&item);
            map.entry(k).or_default().push(select(item));
            Ok(())
        })
    }

    /// Strict left fold over a single pass
    pub fn reduce<A, F>(&self, initial: A, f: F) -> A
    where
        F: Fn(A, T) -> A,
    {
        self.cursor().fold(initial, f)
    }

    /// Sum of items converted to `f64`
    pub fn sum(&self) -> f64
    where
        T: Into<f64>,
    {
        self.sum_by(Into::into)
    }

    /// Sum of a selected value per item
    pub fn sum_by<F>(&self, selector: F) -> f64
    where
        F: Fn(T) -> f64,
    {
        self.cursor().map(selector).sum()
    }

    /// Average of items converted to `f64`; 0 for an empty sequence
    pub fn avg(&self) -> f64
    where
        T: Into<f64>,
    {
        self.avg_by(Into::into)
    }

    /// Average of a selected value per item; 0 for an empty sequence
    pub fn avg_by<F>(&self, selector: F) -> f64
    where
        F: Fn(T) -> f64,
    {
        let mut count = 0usize;
        let mut total = 0.0;
        for item in self.cursor() {
            count += 1;
            total += selector(item);
        }
        // Explicit zero-length guard: an empty sequence averages to 0, not NaN
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Number of items in a fresh pull
    pub fn count(&self) -> usize {
        self.cursor().count()
    }

    /// Number of items in a fresh pull, counting at most `limit`
    pub fn count_up_to(&self, limit: usize) -> usize {
        self.cursor().take(limit).count()
    }

    /// First item of a fresh pull; errors on an empty sequence
    pub fn first(&self) -> Result<T> {
        self.cursor().next().ok_or(Error::EmptySequence)
    }

    /// First item of a fresh pull, or `None` on an empty sequence
    pub fn first_or_default(&self) -> Option<T> {
        self.cursor().next()
    }

    fn collect_guarded<A, F>(&self, mut acc: A, mut push: F) -> Result<A>
    where
        F: FnMut(&mut A, T) -> Result<()>,
    {
        let limit = self.effective_guard();
        let mut iterated = 0usize;
        for item in self.cursor() {
            if iterated == limit {
                warn!(limit, "collecting terminal exceeded the capacity guard");
                return Err(Error::CapacityExceeded { limit });
            }
            iterated += 1;
            push(&mut acc, item)?;
        }
        Ok(acc)
    }
}

// ============================================================================
// Tests
// ============================================================================
