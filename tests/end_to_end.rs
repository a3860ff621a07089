//! End-to-End Tests
//!
//! Exercises the facade crate the way a consumer would: pipelines feeding a
//! search index, async bridging, and the process-wide capacity guard.

use serde::Serialize;

use lazyseq::{Error, IndexOptions, SearchIndex, Seq, DEFAULT_CAPACITY_GUARD};

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    in_stock: bool,
}

fn product(sku: &str, name: &str, price: f64, in_stock: bool) -> Product {
    Product {
        sku: sku.to_string(),
        name: name.to_string(),
        price,
        in_stock,
    }
}

fn catalog() -> Vec<Product> {
    vec![
        product("sku-1", "mechanicalKeyboard", 120.0, true),
        product("sku-2", "Wireless Mouse", 45.0, true),
        product("sku-3", "Keyboard Cover", 15.0, false),
        product("sku-4", "USB Hub", 30.0, true),
    ]
}

// ============================================================================
// Pipeline into Search
// ============================================================================

/// A pipeline shapes the collection, the index makes it searchable
#[test]
fn test_pipeline_feeds_search_index() {
    let in_stock = Seq::from(catalog())
        .filter(|p, _| p.in_stock)
        .to_array()
        .unwrap();

    let index = SearchIndex::new(
        in_stock,
        IndexOptions::new()
            .fetch_id(|p: &Product| p.sku.clone())
            .ignore_properties(["sku"]),
    );
    assert_eq!(index.len(), 3);

    // Camel-cased name matches through its split variant
    let hits = index.search("keyboard");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].sku, "sku-1");

    // Id lookup short-circuits scoring
    assert_eq!(index.search("sku-4")[0].name, "USB Hub");
}

/// Search results flow back into a pipeline for aggregation
#[test]
fn test_search_results_feed_pipeline() {
    let index = SearchIndex::new(catalog(), IndexOptions::new());
    let matches: Vec<Product> = index.search("keyboard").into_iter().cloned().collect();
    assert_eq!(matches.len(), 2);

    let avg_price = Seq::from(matches).avg_by(|p| p.price);
    assert_eq!(avg_price, 67.5);
}

// ============================================================================
// Async Bridge
// ============================================================================

/// A sync pipeline crosses into async and stays restartable
#[tokio::test]
async fn test_async_roundtrip() {
    let names = Seq::from(catalog())
        .map(|p, _| p.name)
        .to_async()
        .filter(|name, _| {
            let keep = name.len() > 10;
            async move { keep }
        });
    assert_eq!(names.count().await, 3);
    assert_eq!(names.first().await.unwrap(), "mechanicalKeyboard");
}

// ============================================================================
// Capacity Guard
// ============================================================================

/// The per-pipeline override wins over the process-wide default
#[test]
fn test_guard_override_beats_default() {
    let seq = Seq::range(0, 1000, 1);
    assert_eq!(seq.to_array().unwrap().len(), 1000);

    let guarded = seq.with_capacity_guard(100);
    assert_eq!(
        guarded.to_array().unwrap_err(),
        Error::CapacityExceeded { limit: 100 }
    );
    // The original pipeline is untouched by the override
    assert_eq!(seq.to_array().unwrap().len(), 1000);
    assert!(DEFAULT_CAPACITY_GUARD >= 1000);
}
