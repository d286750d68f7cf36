//! Integration tests for the reference cache
//!
//! Exercises staleness rules against the real monotonic clock (with short
//! sleeps) and single-flight behaviour under concurrent access.

mod common;

use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use sensorgate_core::{CacheConfig, CacheError, MockTimeSource, ReferenceCache};

use common::{source_types, CountingLoader, SourceType, INVALIDATE_AFTER, RETRY_AFTER};

fn config() -> CacheConfig {
    CacheConfig::new()
        .invalidate_after(INVALIDATE_AFTER)
        .retry_after(RETRY_AFTER)
}

fn cache(loader: &CountingLoader) -> ReferenceCache<String, SourceType> {
    ReferenceCache::new("source-types", loader.clone(), SourceType::key, config())
}

#[test]
fn first_read_loads_and_second_read_is_served_from_memory() {
    let loader = CountingLoader::with(source_types());
    let cache = cache(&loader);

    assert_eq!(cache.all().unwrap().len(), 2);
    assert_eq!(loader.calls(), 1);

    cache.all().unwrap();
    assert_eq!(loader.calls(), 1);
}

#[test]
fn read_after_invalidate_threshold_reloads_once() {
    let loader = CountingLoader::with(source_types());
    let cache = cache(&loader);

    cache.all().unwrap();
    thread::sleep(Duration::from_millis(350));

    cache.all().unwrap();
    assert_eq!(loader.calls(), 2);

    cache.all().unwrap();
    assert_eq!(loader.calls(), 2);
}

#[test]
fn forced_refreshes_each_load() {
    let loader = CountingLoader::with(source_types());
    let cache = cache(&loader);

    for n in 1..=4 {
        cache.refresh().unwrap();
        assert_eq!(loader.calls(), n);
    }
}

#[test]
fn miss_reloads_only_after_retry_threshold() {
    let loader = CountingLoader::with(source_types());
    let cache = cache(&loader);
    let absent = "seismometer".to_string();

    cache.all().unwrap();
    assert!(matches!(cache.get(&absent), Err(CacheError::NotFound(_))));
    assert_eq!(loader.calls(), 1);

    thread::sleep(Duration::from_millis(200));
    let err = cache.get(&absent).unwrap_err();
    assert!(matches!(err, CacheError::NotFound(_)));
    assert_eq!(err.kind().status_code(), 404);
    assert_eq!(loader.calls(), 2);

    assert_eq!(
        cache.get(&"air_quality".to_string()).unwrap().name,
        "Air quality monitor"
    );
    assert_eq!(loader.calls(), 2);
}

#[test]
fn concurrent_first_reads_share_one_load() {
    let loader = CountingLoader::with(source_types());
    loader.set_latency(Duration::from_millis(100));
    let cache = cache(&loader);
    let barrier = Barrier::new(8);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                barrier.wait();
                assert_eq!(cache.all().unwrap().len(), 2);
            });
        }
    });

    assert_eq!(loader.calls(), 1);
}

#[test]
fn concurrent_stale_reads_share_one_reload() {
    let loader = CountingLoader::with(source_types());
    let clock = MockTimeSource::new(0);
    let cache = ReferenceCache::with_time_source(
        "source-types",
        loader.clone(),
        SourceType::key,
        config(),
        clock.clone(),
    );

    cache.all().unwrap();
    loader.set_latency(Duration::from_millis(100));
    loader.push(SourceType::new("noise", "Noise meter"));
    clock.advance(1_000);

    let barrier = Barrier::new(8);
    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                barrier.wait();
                // late arrivals get the previous snapshot, never a partial one
                let len = cache.all().unwrap().len();
                assert!(len == 2 || len == 3);
            });
        }
    });

    assert_eq!(loader.calls(), 2);
    assert_eq!(cache.all().unwrap().len(), 3);
}

#[test]
fn outage_is_masked_once_populated() {
    let loader = CountingLoader::with(source_types());
    let cache = cache(&loader);

    cache.all().unwrap();
    loader.set_offline(true);
    thread::sleep(Duration::from_millis(350));

    assert_eq!(cache.all().unwrap().len(), 2);
    assert_eq!(cache.refresh().unwrap().len(), 2);
    assert!(cache.last_fetch_age().unwrap() >= Duration::from_millis(350));
    assert_eq!(cache.stats().load_failures, 2);
}

#[test]
fn hanging_registry_times_out() {
    let loader = CountingLoader::with(source_types());
    loader.set_latency(Duration::from_millis(400));
    let cache = ReferenceCache::new(
        "source-types",
        loader.clone(),
        SourceType::key,
        config().load_timeout(Duration::from_millis(50)),
    );

    let err = cache.all().unwrap_err();
    assert_eq!(err, CacheError::Timeout(Duration::from_millis(50)));
    assert!(!err.kind().is_client_error());
}

#[test]
fn hung_reload_serves_stale_without_piling_up_loads() {
    let loader = CountingLoader::with(source_types());
    let clock = MockTimeSource::new(0);
    let cache = ReferenceCache::with_time_source(
        "source-types",
        loader.clone(),
        SourceType::key,
        config().load_timeout(Duration::from_millis(50)),
        clock.clone(),
    );

    assert_eq!(cache.all().unwrap().len(), 2);

    loader.push(SourceType::new("noise", "Noise meter"));
    loader.set_latency(Duration::from_millis(600));
    clock.advance(1_000);

    for _ in 0..5 {
        assert_eq!(cache.all().unwrap().len(), 2);
    }

    let stats = cache.stats();
    assert_eq!(stats.load_failures, 5);
    assert_eq!(stats.stale_served, 5);
    assert_eq!(loader.calls(), 2);
    assert_eq!(loader.peak_running(), 1);

    // once the hung load returns its result replaces the snapshot
    thread::sleep(Duration::from_millis(700));
    assert_eq!(cache.all().unwrap().len(), 3);
    assert_eq!(loader.calls(), 2);
}
