//! Asynchronous pipeline
//!
//! `AsyncSeq<T>` mirrors the synchronous combinator surface, but every pull
//! may suspend awaiting the upstream, and transform/predicate callbacks
//! return futures that are awaited before use. There is no fan-out: within
//! one terminal operation items are awaited strictly in sequence, one
//! in-flight pull at a time. Construction accepts either a synchronous or an
//! asynchronous source and normalizes to asynchronous internally.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::ready;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use lazyseq_core::{capacity_guard, Error, Result, Tagged, Truthy};
use tracing::warn;

use crate::seq::Seq;

/// Single-use asynchronous iteration state pulled from a sequence
pub type AsyncCursor<T> = BoxStream<'static, T>;

type Factory<T> = Arc<dyn Fn() -> AsyncCursor<T> + Send + Sync>;

/// A chainable, restartable asynchronous sequence pipeline
pub struct AsyncSeq<T: 'static> {
    factory: Factory<T>,
    guard: Option<usize>,
}

impl<T> Clone for AsyncSeq<T> {
    fn clone(&self) -> Self {
        AsyncSeq {
            factory: Arc::clone(&self.factory),
            guard: self.guard,
        }
    }
}

impl<T: Send + 'static> From<Seq<T>> for AsyncSeq<T> {
    fn from(seq: Seq<T>) -> Self {
        AsyncSeq::from_seq(&seq)
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for AsyncSeq<T> {
    fn from(items: Vec<T>) -> Self {
        AsyncSeq::from_factory(move || stream::iter(items.clone()))
    }
}

// ============================================================================
// Construction
// ============================================================================

impl<T: 'static> AsyncSeq<T> {
    /// Create a pipeline from a stream factory
    ///
    /// The factory is invoked once per terminal operation; nothing is polled
    /// before a terminal runs.
    pub fn from_factory<S, F>(factory: F) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        AsyncSeq {
            factory: Arc::new(move || factory().boxed()),
            guard: None,
        }
    }

    /// Wrap a synchronous pipeline, re-using its restartable source
    pub fn from_seq(seq: &Seq<T>) -> Self
    where
        T: Send,
    {
        let src = seq.clone();
        AsyncSeq::from_factory(move || stream::iter(src.cursor()))
    }

    /// A pipeline that yields nothing
    pub fn empty() -> Self
    where
        T: Send,
    {
        AsyncSeq::from_factory(|| stream::empty())
    }

    /// Pull a fresh cursor (no capacity guard)
    pub fn cursor(&self) -> AsyncCursor<T> {
        (self.factory)()
    }

    /// Override the capacity guard for this pipeline's collecting terminals
    pub fn with_capacity_guard(&self, limit: usize) -> Self {
        AsyncSeq {
            factory: Arc::clone(&self.factory),
            guard: Some(limit),
        }
    }

    fn effective_guard(&self) -> usize {
        self.guard.unwrap_or_else(capacity_guard)
    }

    fn derive<U, S, F>(&self, factory: F) -> AsyncSeq<U>
    where
        U: 'static,
        S: Stream<Item = U> + Send + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        AsyncSeq {
            factory: Arc::new(move || factory().boxed()),
            guard: self.guard,
        }
    }
}

// ============================================================================
// Chain operations
// ============================================================================

impl<T: Send + 'static> AsyncSeq<T> {
    /// Yield up to `n` items then stop; a fresh pull restarts the countdown
    pub fn take(&self, n: usize) -> AsyncSeq<T> {
        let up = Arc::clone(&self.factory);
        self.derive(move || up().take(n))
    }

    /// Discard the first `n` items of each fresh pull, yield the rest
    pub fn skip(&self, n: usize) -> AsyncSeq<T> {
        let up = Arc::clone(&self.factory);
        self.derive(move || up().skip(n))
    }

    /// Pair items positionally with `other`, stopping at the shorter side
    pub fn zip<U: Send + 'static>(&self, other: &AsyncSeq<U>) -> AsyncSeq<(T, U)> {
        let a = Arc::clone(&self.factory);
        let b = Arc::clone(&other.factory);
        self.derive(move || a().zip(b()))
    }

    /// Transform each item through an awaited callback; the index resets on
    /// every fresh pull
    pub fn map<U, F, Fut>(&self, f: F) -> AsyncSeq<U>
    where
        U: Send + 'static,
        F: Fn(T, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        let up = Arc::clone(&self.factory);
        let f = Arc::new(f);
        self.derive(move || {
            let f = Arc::clone(&f);
            up().enumerate().then(move |(i, x)| f(x, i))
        })
    }

    /// Keep items where the awaited predicate holds; the index counts every
    /// item this stage has seen
    pub fn filter<F, Fut>(&self, predicate: F) -> AsyncSeq<T>
    where
        F: Fn(&T, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let up = Arc::clone(&self.factory);
        let predicate = Arc::new(predicate);
        self.derive(move || {
            let predicate = Arc::clone(&predicate);
            up().enumerate().filter_map(move |(i, x)| {
                let predicate = Arc::clone(&predicate);
                async move {
                    if predicate(&x, i).await {
                        Some(x)
                    } else {
                        None
                    }
                }
            })
        })
    }

    /// Keep items whose runtime tag matches `tag`
    pub fn instances_of(&self, tag: T::Tag) -> AsyncSeq<T>
    where
        T: Tagged,
        T::Tag: Send + Sync + 'static,
    {
        self.filter(move |x, _| ready(x.tag() == tag))
    }

    /// Flatten awaited per-item sub-sequences; an absent sub-sequence counts
    /// as empty
    pub fn select_many<U, F, Fut>(&self, f: F) -> AsyncSeq<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Vec<U>>> + Send + 'static,
    {
        let up = Arc::clone(&self.factory);
        let f = Arc::new(f);
        self.derive(move || {
            let f = Arc::clone(&f);
            up().then(move |x| f(x))
                .flat_map(|sub| stream::iter(sub.into_iter().flatten()))
        })
    }

    /// Keep only truthy items (same truthiness quirk as the sync pipeline)
    pub fn not_default(&self) -> AsyncSeq<T>
    where
        T: Truthy,
    {
        self.filter(|x, _| ready(x.is_truthy()))
    }

    /// Yield this sequence fully, then `other`; `None` behaves as identity.
    /// The second source may be synchronous (`Seq`) or asynchronous.
    pub fn concat<S>(&self, other: Option<S>) -> AsyncSeq<T>
    where
        S: Into<AsyncSeq<T>>,
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
    /// duplicates
    pub fn unique_by<K, F>(&self, key: F) -> AsyncSeq<T>
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let up = Arc::clone(&self.factory);
        let key = Arc::new(key);
        self.derive(move || {
            let key = Arc::clone(&key);
            let mut seen = HashSet::new();
            up().filter_map(move |x| ready(if seen.insert(key(&x)) { Some(x) } else { None }))
        })
    }

    /// `unique_by` with the item itself as the key
    pub fn unique(&self) -> AsyncSeq<T>
    where
        T: Clone + Eq + Hash,
    {
        self.unique_by(|x| x.clone())
    }
}

// ============================================================================
// Terminal operations
// ============================================================================

impl<T: Send + 'static> AsyncSeq<T> {
    /// Collect into a `Vec`, enforcing the capacity guard
    pub async fn to_array(&self) -> Result<Vec<T>> {
        self.collect_guarded(Vec::new(), |out, item| {
            out.push(item);
            Ok(())
        })
        .await
    }

    /// Collect into a map keyed by `key`; a repeated key is an error
    pub async fn to_map<K, F>(&self, key: F) -> Result<HashMap<K, T>>
    where
        K: Eq + Hash + Debug,
        F: Fn(&T) -> K,
    {
        self.to_map_select(key, |item| item).await
    }

    /// Collect into a map of selected values; a repeated key is an error
    pub async fn to_map_select<K, V, FK, FV>(&self, key: FK, select: FV) -> Result<HashMap<K, V>>
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
        .await
    }

    /// Map collector resolving key collisions with `resolve(existing,
    /// incoming)`
    pub async fn to_map_resolving<K, V, FK, FV, FR>(
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
        .await
    }

    /// Collect into an ordered string-keyed dictionary; a repeated key is an
    /// error
    pub async fn to_dictionary<F>(&self, key: F) -> Result<BTreeMap<String, T>>
    where
        F: Fn(&T) -> String,
    {
        self.to_dictionary_select(key, |item| item).await
    }

    /// Dictionary variant selecting the stored value
    pub async fn to_dictionary_select<V, FK, FV>(
        &self,
        key: FK,
        select: FV,
    ) -> Result<BTreeMap<String, V>>
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
        .await
    }

    /// Dictionary variant resolving key collisions with
    /// `resolve(existing, incoming)`
    pub async fn to_dictionary_resolving<V, FK, FV, FR>(
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
        .await
    }

    /// Group items by key, preserving encounter order within each group
    pub async fn to_lookup<K, F>(&self, key: F) -> Result<HashMap<K, Vec<T>>>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        self.to_lookup_select(key, |item| item).await
    }

    /// Lookup variant selecting the grouped values
    pub async fn to_lookup_select<K, V, FK, FV>(
        &self,
        key: FK,
        select: FV,
    ) -> Result<HashMap<K, Vec<V>>>
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
        .await
    }

    /// Strict left fold with an awaited step, single pass
    pub async fn reduce<A, F, Fut>(&self, initial: A, f: F) -> A
    where
        F: Fn(A, T) -> Fut,
        Fut: Future<Output = A>,
    {
        let mut cursor = self.cursor();
        let mut acc = initial;
        while let Some(item) = cursor.next().await {
            acc = f(acc, item).await;
        }
        acc
    }

    /// Sum of items converted to `f64`
    pub async fn sum(&self) -> f64
    where
        T: Into<f64>,
    {
        self.sum_by(Into::into).await
    }

    /// Sum of a selected value per item
    pub async fn sum_by<F>(&self, selector: F) -> f64
    where
        F: Fn(T) -> f64,
    {
        let mut cursor = self.cursor();
        let mut total = 0.0;
        while let Some(item) = cursor.next().await {
            total += selector(item);
        }
        total
    }

    /// Average of items converted to `f64`; 0 for an empty sequence
    pub async fn avg(&self) -> f64
    where
        T: Into<f64>,
    {
        self.avg_by(Into::into).await
    }

    /// Average of a selected value per item; 0 for an empty sequence
    pub async fn avg_by<F>(&self, selector: F) -> f64
    where
        F: Fn(T) -> f64,
    {
        let mut cursor = self.cursor();
        let mut count = 0usize;
        let mut total = 0.0;
        while let Some(item) = cursor.next().await {
            count += 1;
            total += selector(item);
        }
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Number of items in a fresh pull
    pub async fn count(&self) -> usize {
        let mut cursor = self.cursor();
        let mut n = 0usize;
        while cursor.next().await.is_some() {
            n += 1;
        }
        n
    }

    /// Number of items in a fresh pull, counting at most `limit`
    pub async fn count_up_to(&self, limit: usize) -> usize {
        let mut cursor = self.cursor().take(limit);
        let mut n = 0usize;
        while cursor.next().await.is_some() {
            n += 1;
        }
        n
    }

    /// First item of a fresh pull; errors on an empty sequence
    pub async fn first(&self) -> Result<T> {
        self.cursor().next().await.ok_or(Error::EmptySequence)
    }

    /// First item of a fresh pull, or `None` on an empty sequence
    pub async fn first_or_default(&self) -> Option<T> {
        self.cursor().next().await
    }

    async fn collect_guarded<A, F>(&self, mut acc: A, mut push: F) -> Result<A>
    where
        F: FnMut(&mut A, T) -> Result<()>,
    {
        let limit = self.effective_guard();
        let mut cursor = self.cursor();
        let mut iterated = 0usize;
        while let Some(item) = cursor.next().await {
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
