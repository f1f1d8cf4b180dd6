//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the tiered cache against randomly generated
//! operation sequences.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{current_timestamp_ms, CacheEntry, TieredCache};
use crate::config::CacheConfig;
use crate::storage::{MemoryStore, PersistentStore};

// == Test Configuration ==
const TEST_MAX_ITEMS: usize = 50;

fn new_cache(max_items: usize) -> (TieredCache, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = CacheConfig {
        max_items,
        ..CacheConfig::named("prop-cache")
    };
    let cache = TieredCache::new(config, store.clone()).unwrap();
    (cache, store)
}

// == Strategies ==
/// Generates valid cache keys (non-empty, within length limit)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}".prop_map(|s| s)
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}".prop_map(|s| s)
}

/// Generates distinct keys, order preserved
fn distinct_keys_strategy(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(valid_key_strategy(), range).prop_map(|keys| {
        let mut seen = HashSet::new();
        keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Remove { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Capacity bound: after inserting max_items + k distinct keys, memory holds
    // exactly the max_items most recently inserted ones.
    #[test]
    fn prop_capacity_keeps_newest_insertions(
        keys in distinct_keys_strategy(2..40),
        max_items in 1usize..10
    ) {
        prop_assume!(keys.len() > max_items);
        let (cache, _) = new_cache(max_items);

        tokio_test::block_on(async {
            for key in &keys {
                cache.set(key, &format!("value_{}", key), None).await.unwrap();
            }

            let expected: Vec<String> = keys[keys.len() - max_items..].to_vec();
            prop_assert_eq!(cache.memory_len().await, max_items);
            prop_assert_eq!(cache.memory_keys().await, expected);
            prop_assert_eq!(cache.stats().await.evictions as usize, keys.len() - max_items);
            Ok(())
        })?;
    }

    // The memory bound holds after any operation sequence, and the eviction
    // queue always mirrors the memory map.
    #[test]
    fn prop_memory_never_exceeds_bound(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let (cache, _) = new_cache(8);

        tokio_test::block_on(async {
            for op in ops {
                match op {
                    CacheOp::Set { key, value } => cache.set(&key, &value, None).await.unwrap(),
                    CacheOp::Get { key } => {
                        let _: Option<String> = cache.get(&key).await.unwrap();
                    }
                    CacheOp::Remove { key } => cache.remove(&key).await,
                }

                let len = cache.memory_len().await;
                prop_assert!(len <= 8, "Memory tier size {} exceeds bound", len);
                prop_assert_eq!(cache.memory_keys().await.len(), len);
            }
            Ok(())
        })?;
    }

    // Overwrite leaves exactly one entry holding the newest value.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let (cache, store) = new_cache(TEST_MAX_ITEMS);

        tokio_test::block_on(async {
            cache.set(&key, &value1, None).await.unwrap();
            cache.set(&key, &value2, None).await.unwrap();

            let retrieved: Option<String> = cache.get(&key).await.unwrap();
            prop_assert_eq!(retrieved, Some(value2.clone()));
            prop_assert_eq!(cache.memory_len().await, 1);
            prop_assert_eq!(store.len().await, 1);
            Ok(())
        })?;
    }

    // After clear, every previously set key misses and the store is empty.
    #[test]
    fn prop_clear_empties_both_tiers(keys in distinct_keys_strategy(1..30)) {
        let (cache, store) = new_cache(TEST_MAX_ITEMS);

        tokio_test::block_on(async {
            for key in &keys {
                cache.set(key, key, None).await.unwrap();
            }
            cache.clear().await;

            for key in &keys {
                let value: Option<String> = cache.get(key).await.unwrap();
                prop_assert!(value.is_none(), "Key '{}' survived clear", key);
            }
            prop_assert!(store.keys().await.unwrap().is_empty());
            Ok(())
        })?;
    }

    // A sweep removes exactly the expired persistent entries and leaves the
    // others byte-for-byte intact.
    #[test]
    fn prop_sweep_removes_exactly_expired(
        entries in prop::collection::vec((valid_key_strategy(), any::<bool>()), 1..30)
    ) {
        let (cache, store) = new_cache(TEST_MAX_ITEMS);
        let now = current_timestamp_ms();

        tokio_test::block_on(async {
            let mut live = std::collections::HashMap::new();
            let mut expired = HashSet::new();
            for (key, is_expired) in entries {
                live.remove(&key);
                expired.remove(&key);
                let entry = if is_expired {
                    expired.insert(key.clone());
                    CacheEntry::with_timestamp(json!(key), now - 60_000, 1_000)
                } else {
                    let entry = CacheEntry::with_timestamp(json!(key), now, 600_000);
                    live.insert(key.clone(), entry.clone());
                    entry
                };
                store.set(&key, &entry).await.unwrap();
            }

            let report = cache.cleanup_expired().await;

            prop_assert_eq!(report.persistent_removed, expired.len());
            prop_assert_eq!(store.len().await, live.len());
            for (key, entry) in &live {
                let stored = store.get(key).await.unwrap();
                prop_assert_eq!(stored.as_ref(), Some(entry));
            }
            Ok(())
        })?;
    }
}

// == Property Test for Error Response Format ==
// This tests the CacheError -> HTTP response conversion

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // For any error condition, the HTTP response includes a JSON body with an
    // "error" field carrying the error message.
    #[test]
    fn prop_error_response_format(
        error_msg in "[a-zA-Z0-9 _-]{1,100}"
    ) {
        use crate::error::{CacheError, FetchError};
        use axum::response::IntoResponse;
        use axum::body::to_bytes;

        let error_variants = vec![
            CacheError::InvalidKey(error_msg.clone()),
            CacheError::InvalidConfig(error_msg.clone()),
            CacheError::Fetch(FetchError::Transport(error_msg.clone())),
            CacheError::Fetch(FetchError::Decode(error_msg.clone())),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent callers never break the memory bound or return a value that
    // was never written under the key.
    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let (cache, _) = new_cache(16);
            let cache = Arc::new(cache);
            let written: HashSet<(String, String)> = operations
                .iter()
                .filter_map(|op| match op {
                    CacheOp::Set { key, value } => Some((key.clone(), value.clone())),
                    _ => None,
                })
                .collect();

            let mut handles = vec![];
            for op in operations {
                let cache = Arc::clone(&cache);
                let written = written.clone();
                handles.push(tokio::spawn(async move {
                    match op {
                        CacheOp::Set { key, value } => {
                            cache.set(&key, &value, None).await.map_err(|e| e.to_string())
                        }
                        CacheOp::Get { key } => {
                            let value: Option<String> =
                                cache.get(&key).await.map_err(|e| e.to_string())?;
                            match value {
                                Some(v) if !written.contains(&(key.clone(), v.clone())) => {
                                    Err(format!("Key '{}' returned unwritten value '{}'", key, v))
                                }
                                _ => Ok(()),
                            }
                        }
                        CacheOp::Remove { key } => {
                            cache.remove(&key).await;
                            Ok(())
                        }
                    }
                }));
            }

            for handle in handles {
                let result = handle.await.expect("Task should not panic");
                prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
            }

            prop_assert!(cache.memory_len().await <= 16);
            prop_assert_eq!(cache.memory_keys().await.len(), cache.memory_len().await);

            let hit_rate = cache.stats().await.hit_rate();
            prop_assert!((0.0..=1.0).contains(&hit_rate));
            Ok(())
        })?;
    }
}
