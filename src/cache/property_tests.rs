//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the engine's externally visible guarantees.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{CacheEngine, CacheStrategy, Priority, MENU_STRATEGY};
use crate::kv::MemoryStore;

// == Test Configuration ==
const TEN_MINUTES: CacheStrategy = CacheStrategy::new(600, &["prop"], Priority::Normal, 0);
const TAG_POOL: [&str; 4] = ["menu", "table", "analytics", "qrcode"];

fn new_engine() -> CacheEngine {
    CacheEngine::new(Arc::new(MemoryStore::new()))
}

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit, never reserved)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_:]{0,63}".prop_map(|s| s)
}

/// Generates structured values to cache
fn value_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<i64>>> {
    prop::collection::btree_map("[a-z]{1,8}", prop::collection::vec(any::<i64>(), 0..6), 0..6)
}

/// Generates a non-empty subset of the tag pool
fn tag_set_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(TAG_POOL.to_vec(), 1..=TAG_POOL.len())
}

/// Leaks a tag list into a `'static` strategy for the duration of the test run
fn strategy_with_tags(tags: Vec<&'static str>) -> CacheStrategy {
    CacheStrategy::new(600, Box::leak(tags.into_boxed_slice()), Priority::Normal, 0)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so gets and deletes hit existing keys
    let key = "[a-d]";
    prop_oneof![
        (key, "[a-z ]{0,16}").prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Storing a value and reading it back before expiry yields an equal value.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in value_strategy()) {
        let engine = new_engine();

        let retrieved = tokio_test::block_on(async {
            engine.set(&key, &value, &TEN_MINUTES).await.unwrap();
            engine.get::<BTreeMap<String, Vec<i64>>>(&key).await
        });

        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // The hit rate always equals hits / (hits + misses) over the observed reads.
    #[test]
    fn prop_hit_rate_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        let engine = new_engine();

        let (hits, misses, rate) = tokio_test::block_on(async {
            engine.stats().reset().await.unwrap();
            let mut hits: u64 = 0;
            let mut misses: u64 = 0;

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        engine.set(&key, &value, &TEN_MINUTES).await.unwrap();
                    }
                    CacheOp::Get { key } => match engine.get::<String>(&key).await {
                        Some(_) => hits += 1,
                        None => misses += 1,
                    },
                    CacheOp::Delete { key } => {
                        engine.delete(&key).await;
                    }
                }
            }

            (hits, misses, engine.stats().snapshot().await.average_hit_rate)
        });

        let expected = if hits + misses == 0 {
            0.0
        } else {
            hits as f64 / (hits + misses) as f64
        };
        prop_assert!(!rate.is_nan());
        prop_assert_eq!(rate, expected, "Hit rate mismatch");
    }

    // Invalidation deletes exactly the keys sharing at least one requested tag.
    #[test]
    fn prop_invalidation_scope(
        entries in prop::collection::vec(tag_set_strategy(), 1..8),
        requested in tag_set_strategy()
    ) {
        let engine = new_engine();

        let expected: HashSet<String> = entries
            .iter()
            .enumerate()
            .filter(|(_, tags)| tags.iter().any(|t| requested.contains(t)))
            .map(|(i, _)| format!("key{}", i))
            .collect();

        let (count, survivors) = tokio_test::block_on(async {
            for (i, tags) in entries.iter().enumerate() {
                let strategy = strategy_with_tags(tags.clone());
                engine.set(&format!("key{}", i), &i, &strategy).await.unwrap();
            }

            let count = engine.invalidate_by_tags(&requested).await;

            let mut survivors = HashSet::new();
            for i in 0..entries.len() {
                let key = format!("key{}", i);
                if engine.get::<usize>(&key).await.is_some() {
                    survivors.insert(key);
                }
            }
            (count, survivors)
        });

        prop_assert_eq!(count, expected.len(), "Invalidated count mismatch");
        prop_assert!(survivors.is_disjoint(&expected), "Invalidated key still readable");
        prop_assert_eq!(survivors.len() + expected.len(), entries.len());
    }

    // Deleting a key any number of times never reports failure.
    #[test]
    fn prop_delete_idempotent(key in valid_key_strategy(), times in 1usize..4) {
        let engine = new_engine();

        let results = tokio_test::block_on(async {
            let mut results = Vec::new();
            for _ in 0..times {
                results.push(engine.delete(&key).await);
            }
            results
        });

        prop_assert!(results.into_iter().all(|ok| ok));
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(3))]

    // Once the TTL has elapsed with no grace window, reads miss and the key
    // is no longer reported as expiring.
    #[test]
    fn prop_ttl_expiration_behavior(key in valid_key_strategy(), value in "[a-z]{1,32}") {
        let engine = new_engine();
        let one_second = CacheStrategy::new(1, &["prop"], Priority::Normal, 0);

        let before = tokio_test::block_on(async {
            engine.set(&key, &value, &one_second).await.unwrap();
            engine.get::<String>(&key).await
        });
        prop_assert_eq!(before, Some(value), "Entry should exist before TTL expires");

        // Wait for TTL to expire (add small buffer for timing)
        sleep(Duration::from_millis(1100));

        let (after, expiring) = tokio_test::block_on(async {
            let after = engine.get::<String>(&key).await;
            (after, engine.get_expiring_keys(60).await)
        });
        prop_assert_eq!(after, None, "Entry should not be found after TTL expires");
        prop_assert!(expiring.iter().all(|e| e.key != key));
    }
}

#[test]
fn test_menu_invalidation_scenario() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Menu {
        items: Vec<String>,
    }

    let engine = new_engine();
    tokio_test::block_on(async {
        let menu = Menu {
            items: vec!["tea".to_string()],
        };
        engine.set("menu:7", &menu, &MENU_STRATEGY).await.unwrap();
        assert_eq!(engine.get::<Menu>("menu:7").await, Some(menu));

        assert_eq!(engine.invalidate_by_tags(&["menu"]).await, 1);
        assert_eq!(engine.get::<Menu>("menu:7").await, None);
    });
}
