//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check resolution, expiry and maintenance invariants
//! against arbitrary URLs and record ages.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use tokio_test::block_on;

use crate::cache::{cache_key, CacheEntry, ImageCache, ManualClock, Outcome, DEFAULT_TTL_MS};
use crate::storage::{KeyValueStore, MemoryStore};

// == Test Configuration ==
const T0: u64 = 1_700_000_000_000;

// == Strategies ==
/// Generates image URLs
fn url_strategy() -> impl Strategy<Value = String> {
    "https://[a-z]{1,12}\\.example/[a-zA-Z0-9_/]{1,40}\\.(png|jpg|webp)"
}

/// Generates record ages spanning both sides of the TTL
fn age_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        0..DEFAULT_TTL_MS,
        DEFAULT_TTL_MS..DEFAULT_TTL_MS * 3,
        Just(DEFAULT_TTL_MS - 1),
        Just(DEFAULT_TTL_MS),
    ]
}

fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>, ImageCache) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(T0));
    let cache = ImageCache::new(store.clone()).with_clock(clock.clone());
    (store, clock, cache)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Resolving the same URL twice returns the same URI and leaves exactly
    // one durable record behind.
    #[test]
    fn prop_idempotent_resolution(url in url_strategy()) {
        let (store, _clock, cache) = setup();

        let first = block_on(cache.resolve(&url));
        let second = block_on(cache.resolve(&url));

        prop_assert_eq!(&first.uri, &url);
        prop_assert_eq!(&second.uri, &url);
        prop_assert_eq!(block_on(store.len()), 1);
        prop_assert!(block_on(store.peek(&cache_key(&url))).is_some());
    }

    // A second resolution in the same process never reaches the durable tier.
    #[test]
    fn prop_memory_short_circuit(url in url_strategy()) {
        let (store, _clock, cache) = setup();

        block_on(cache.resolve(&url));
        let calls = store.call_counts();
        let again = block_on(cache.resolve(&url));

        prop_assert_eq!(again.outcome, Outcome::MemoryHit);
        prop_assert_eq!(store.call_counts(), calls);
    }

    // A stored record is served iff its age is below the TTL.
    #[test]
    fn prop_ttl_boundary(url in url_strategy(), age in age_strategy()) {
        let (store, clock, cache) = setup();
        let written = CacheEntry::new(url.clone(), T0);
        block_on(store.set(&cache_key(&url), &written.encode().unwrap())).unwrap();

        clock.set(T0 + age);
        let resolution = block_on(cache.resolve(&url));

        if age < DEFAULT_TTL_MS {
            prop_assert_eq!(resolution.outcome, Outcome::DurableHit);
            prop_assert_eq!(block_on(store.peek(&cache_key(&url))), Some(written.encode().unwrap()));
        } else {
            prop_assert_eq!(resolution.outcome, Outcome::Populated);
            let rewritten = CacheEntry::new(url.clone(), T0 + age);
            prop_assert_eq!(block_on(store.peek(&cache_key(&url))), Some(rewritten.encode().unwrap()));
        }
    }

    // A failing durable tier never changes the displayed URI.
    #[test]
    fn prop_fail_open(url in url_strategy()) {
        let (store, _clock, cache) = setup();
        store.set_failing(true);

        let resolution = block_on(cache.resolve(&url));

        prop_assert_eq!(resolution.uri, url);
        prop_assert_eq!(resolution.outcome, Outcome::Fallback);
    }

    // The sweep removes exactly the records whose age reached the TTL.
    #[test]
    fn prop_sweep_selectivity(
        records in prop::collection::hash_map(url_strategy(), age_strategy(), 1..20)
    ) {
        let (store, _clock, cache) = setup();
        for (url, age) in &records {
            let entry = CacheEntry::new(url.clone(), T0 - age);
            block_on(store.set(&cache_key(url), &entry.encode().unwrap())).unwrap();
        }

        let report = block_on(cache.sweep_expired());

        let expected_stale = records.values().filter(|age| **age >= DEFAULT_TTL_MS).count();
        prop_assert_eq!(report.removed, expected_stale);
        prop_assert!(!report.aborted);
        for (url, age) in &records {
            let present = block_on(store.peek(&cache_key(url))).is_some();
            prop_assert_eq!(present, *age < DEFAULT_TTL_MS);
        }
    }

    // Clear empties both tiers and leaves keys outside the namespace alone.
    #[test]
    fn prop_clear_completeness(
        urls in prop::collection::hash_set(url_strategy(), 1..20),
        foreign in prop::collection::hash_set("@[a-z]{1,10}", 0..5)
    ) {
        let (store, _clock, cache) = setup();
        for key in &foreign {
            block_on(store.set(key, "unrelated")).unwrap();
        }
        for url in &urls {
            block_on(cache.resolve(url));
        }

        let report = block_on(cache.clear());

        prop_assert!(report.cleared);
        prop_assert_eq!(report.removed, urls.len());
        prop_assert_eq!(block_on(cache.memory_len()), 0);

        let remaining: HashSet<String> = block_on(store.list_keys()).unwrap().into_iter().collect();
        prop_assert_eq!(remaining, foreign);

        for url in &urls {
            prop_assert_eq!(block_on(cache.resolve(url)).outcome, Outcome::Populated);
        }
    }
}
