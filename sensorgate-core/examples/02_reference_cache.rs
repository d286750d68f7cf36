//! Reference Cache Example
//!
//! Demonstrates the two staleness thresholds of the catalog cache and its
//! behaviour when the upstream registry goes away.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_reference_cache
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sensorgate_core::{CacheConfig, LoadError, MockTimeSource, ReferenceCache};

#[derive(Debug, Clone)]
struct SourceType {
    id: String,
    channels: u32,
}

fn main() {
    println!("SensorGate Reference Cache Example");
    println!("==================================\n");

    let registry_online = Arc::new(AtomicBool::new(true));
    let registered = Arc::new(AtomicU32::new(2));

    let online = Arc::clone(&registry_online);
    let count = Arc::clone(&registered);
    let loader = move || -> Result<Vec<SourceType>, LoadError> {
        if !online.load(Ordering::SeqCst) {
            return Err(LoadError::new("registry unreachable"));
        }
        println!("  [registry] bulk fetch");
        Ok((0..count.load(Ordering::SeqCst))
            .map(|i| SourceType {
                id: format!("kind-{}", i),
                channels: 3 + i,
            })
            .collect())
    };

    let clock = MockTimeSource::new(0);
    let cache = ReferenceCache::with_time_source(
        "source-types",
        loader,
        |t: &SourceType| t.id.clone(),
        CacheConfig::new()
            .invalidate_after(Duration::from_secs(3600))
            .retry_after(Duration::from_secs(60)),
        clock.clone(),
    );

    println!("First read populates the cache:");
    println!("  {} entries\n", cache.all().map(|m| m.len()).unwrap_or(0));

    println!("A new kind is registered upstream; an immediate miss does not reload:");
    registered.store(3, Ordering::SeqCst);
    println!("  kind-2 -> {:?}\n", cache.get(&"kind-2".to_string()).map(|t| t.channels));

    println!("A minute later the miss triggers a retry reload:");
    clock.advance(60_000);
    println!("  kind-2 -> {:?}\n", cache.get(&"kind-2".to_string()).map(|t| t.channels));

    println!("The registry goes down and the snapshot ages past the hour:");
    registry_online.store(false, Ordering::SeqCst);
    clock.advance(3_600_000);
    println!("  {} entries (stale)\n", cache.all().map(|m| m.len()).unwrap_or(0));

    println!("Stats: {:?}", cache.stats());
}
