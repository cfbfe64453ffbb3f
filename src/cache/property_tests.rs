//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store and key resolution behavior over random inputs.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{
    resolve, Cache, CacheConfig, CacheKey, CacheOptions, CacheStore, KeySegment, ManualClock,
    KEY_SEPARATOR,
};

// == Test Configuration ==
const START_MS: u64 = 1_700_000_000_000;

fn fresh_store() -> (CacheStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    (CacheStore::new(clock.clone()), clock)
}

// == Strategies ==
/// Generates cache keys made of word characters
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}"
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}"
}

/// Generates a single key segment, undefined included
fn segment_strategy() -> impl Strategy<Value = KeySegment> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(KeySegment::Text),
        any::<i64>().prop_map(KeySegment::Int),
        any::<u64>().prop_map(KeySegment::UInt),
        Just(KeySegment::Undefined),
    ]
}

/// Generates a sequence of store operations
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Unset { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Unset { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Property 1: Statistics Accuracy
    // For any sequence of operations, hits and misses match the observed reads.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let (mut store, _) = fresh_store();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key, value, CacheOptions::default());
                }
                CacheOp::Get { key } => {
                    match store.get::<String>(&key) {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                CacheOp::Unset { key } => {
                    store.unset(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // Property 2: Round-trip Storage Consistency
    // A stored value reads back unchanged before it expires.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let (mut store, _) = fresh_store();

        store.set(key.clone(), value.clone(), CacheOptions::default());

        prop_assert_eq!(store.get::<String>(&key), Some(value));
    }

    // Property 3: Unset Removes Entry
    #[test]
    fn prop_unset_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let (mut store, _) = fresh_store();

        store.set(key.clone(), value, CacheOptions::default());
        prop_assert!(store.get::<String>(&key).is_some(), "Key should exist before unset");

        store.unset(&key);
        prop_assert!(store.get::<String>(&key).is_none(), "Key should not exist after unset");
    }

    // Property 4: Overwrite Semantics
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let (mut store, _) = fresh_store();

        store.set(key.clone(), value1, CacheOptions::lifetime(1));
        store.set(key.clone(), value2.clone(), CacheOptions::lifetime(60));

        prop_assert_eq!(store.get::<String>(&key), Some(value2));
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // Property 5: TTL Expiration Behavior
    // An entry is readable until its lifetime has fully elapsed and gone right after,
    // with the read itself removing it.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        lifetime in 0u64..3_600
    ) {
        let (mut store, clock) = fresh_store();
        store.set(key.clone(), value.clone(), CacheOptions::lifetime(lifetime));

        clock.advance(Duration::from_secs(lifetime));
        prop_assert_eq!(store.get::<String>(&key), Some(value));

        clock.advance(Duration::from_millis(1));
        prop_assert_eq!(store.get::<String>(&key), None);
        prop_assert_eq!(store.len(), 0, "Expired read should remove the entry");
    }

    // Property 6: Sweep Removes Exactly The Expired Entries
    #[test]
    fn prop_sweep_removes_only_expired(
        entries in prop::collection::vec((valid_key_strategy(), 1u64..100), 1..40),
        elapsed in 0u64..120
    ) {
        let (mut store, clock) = fresh_store();
        let mut lifetimes = std::collections::HashMap::new();
        for (key, lifetime) in entries {
            store.set(key.clone(), lifetime, CacheOptions::lifetime(lifetime));
            lifetimes.insert(key, lifetime);
        }

        clock.advance(Duration::from_secs(elapsed));
        let expected_removed = lifetimes.values().filter(|&&l| l < elapsed).count();

        prop_assert_eq!(store.sweep_expired(), expected_removed);
        prop_assert_eq!(store.len(), lifetimes.len() - expected_removed);
    }

    // Property 7: Prefix Removal
    // Exactly the keys starting with the prefix are removed.
    #[test]
    fn prop_remove_prefixed(
        keys in prop::collection::hash_set(valid_key_strategy(), 1..30),
        prefix in "[a-c]{1,2}"
    ) {
        let (mut store, _) = fresh_store();
        for key in &keys {
            store.set(key.clone(), (), CacheOptions::default());
        }

        let matching: HashSet<&String> = keys.iter().filter(|k| k.starts_with(&prefix)).collect();
        prop_assert_eq!(store.remove_prefixed(&prefix), matching.len());

        for key in &keys {
            prop_assert_eq!(store.contains_key(key), !matching.contains(key));
        }
    }

    // Property 8: Key Resolution Is Deterministic And Skips Undefined
    #[test]
    fn prop_resolve_composite_keys(segments in prop::collection::vec(segment_strategy(), 0..8)) {
        let key = CacheKey::Segments(segments.clone());
        let resolved = resolve(&key);

        prop_assert_eq!(&resolved, &resolve(&key.clone()));

        let defined: Vec<String> = segments
            .iter()
            .filter_map(|segment| match segment {
                KeySegment::Text(text) => Some(text.clone()),
                KeySegment::Int(n) => Some(n.to_string()),
                KeySegment::UInt(n) => Some(n.to_string()),
                KeySegment::Float(_) => unreachable!("floats are not generated"),
                KeySegment::Undefined => None,
            })
            .collect();
        prop_assert_eq!(resolved, defined.join(KEY_SEPARATOR));
    }

    // Property 9: Raw Keys Resolve To Themselves
    #[test]
    fn prop_resolve_raw_key(raw in ".*") {
        prop_assert_eq!(resolve(&CacheKey::Raw(raw.clone())), raw);
    }
}

// Shared handle driven synchronously through tokio-test
proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    // Property 10: get_or_set Calls Its Factory Only On Miss
    #[test]
    fn prop_get_or_set_factory_calls(
        key in valid_key_strategy(),
        value in valid_value_strategy(),
        prefill in any::<bool>()
    ) {
        let clock = Arc::new(ManualClock::new(START_MS));
        let cache = Cache::without_sweeper(CacheConfig::default(), clock);
        let mut calls = 0u32;

        let got = tokio_test::block_on(async {
            if prefill {
                cache.set(key.as_str(), value.clone(), CacheOptions::default()).await;
            }
            cache
                .get_or_set(
                    &key,
                    || {
                        calls += 1;
                        let value = value.clone();
                        async move { Ok::<_, std::convert::Infallible>(value) }
                    },
                    CacheOptions::default(),
                )
                .await
        });

        prop_assert_eq!(got, Ok(value));
        prop_assert_eq!(calls, if prefill { 0 } else { 1 });
    }
}
