//! Term derivation
//!
//! Builds the searchable term list for an item by walking its
//! `serde_json::Value` projection: strings are leaf terms, arrays traverse
//! their elements, objects traverse property values subject to the
//! allow/deny filters, and the `any_to_text` hook can substitute direct
//! terms for a subtree without descending further.
//!
//! Every leaf term is emitted normalized (diacritics stripped, lower-cased)
//! and, unless disabled, also as its camel-case-split variant. The final list
//! is deduplicated through a `Seq` pipeline.

use serde::Serialize;
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use lazyseq_pipeline::Seq;

use crate::options::IndexOptions;

/// Maximum structural depth traversed when deriving terms
pub const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Normalize a term: NFD-decompose, strip combining marks, lower-case
///
/// # Example
///
/// ```
/// use lazyseq_search::normalize;
///
/// assert_eq!(normalize("Café"), "cafe");
/// assert_eq!(normalize("HELLO"), "hello");
/// ```
pub fn normalize(term: &str) -> String {
    term.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Split camel-case boundaries into space-separated words
///
/// # Example
///
/// ```
/// use lazyseq_search::uncamel;
///
/// assert_eq!(uncamel("helloWorld"), "hello World");
/// assert_eq!(uncamel("already plain"), "already plain");
/// ```
pub fn uncamel(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 4);
    let mut prev_splittable = false;
    for c in term.chars() {
        if c.is_uppercase() && prev_splittable {
            out.push(' ');
        }
        prev_splittable = c.is_lowercase() || c.is_ascii_digit();
        out.push(c);
    }
    out
}

/// Derive the deduplicated, normalized term list for an item
pub(crate) fn derive_terms<T: Serialize>(item: &T, options: &IndexOptions<T>) -> Vec<String> {
    let raw = match &options.fetch_text {
        Some(fetch) => fetch(item),
        None => match serde_json::to_value(item) {
            Ok(value) => {
                let mut acc = Vec::new();
                collect_text(&value, options, 0, &mut acc);
                acc
            }
            Err(_) => Vec::new(),
        },
    };

    let mut expanded = Vec::with_capacity(raw.len() * 2);
    for term in &raw {
        expanded.push(normalize(term));
        if !options.no_uncamel {
            expanded.push(normalize(&uncamel(term)));
        }
    }
    expanded.retain(|t| !t.is_empty());

    let mut terms: Vec<String> = Seq::from(expanded).unique().cursor().collect();

    // Short noise terms are dropped, but only when the item has at least one
    // substantial term to search by
    if terms.iter().any(|t| t.chars().count() >= 3) {
        terms.retain(|t| t.chars().count() >= 3);
    }
    terms
}

fn collect_text<T>(value: &Value, options: &IndexOptions<T>, depth: usize, acc: &mut Vec<String>) {
    if depth > MAX_TRAVERSAL_DEPTH {
        return;
    }
    if let Some(any_to_text) = &options.any_to_text {
        if let Some(direct) = any_to_text(value) {
            acc.extend(direct);
            return;
        }
    }
    match value {
        Value::String(s) => acc.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_text(item, options, depth + 1, acc);
            }
        }
        Value::Object(map) => {
            for (name, child) in map {
                if let Some(only) = &options.only_properties {
                    if !only.contains(name) {
                        continue;
                    }
                }
                if options.ignore_properties.contains(name) {
                    continue;
                }
                collect_text(child, options, depth + 1, acc);
            }
        }
        // Numbers, booleans and nulls carry no searchable text
        _ => {}
    }
}
