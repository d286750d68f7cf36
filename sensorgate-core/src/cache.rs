//! Read-Through Reference Cache for Upstream Catalogs
//!
//! ## Overview
//!
//! Catalog lookups (source types, registered sources) sit on every request
//! path, but the upstream registry changes rarely. `ReferenceCache` keeps the
//! whole catalog in memory as an immutable snapshot and decides, lazily on
//! access, when the snapshot has to be refreshed.
//!
//! ## Two-Tier Staleness
//!
//! ```text
//!            hit                          miss
//! all()      reload if age >= invalidate  (n/a)
//! get(key)   never reload                 reload if age >= retry
//! refresh()  always reload                always reload
//! ```
//!
//! `retry_after` is the shorter threshold: a key that is probably newly
//! registered becomes visible sooner than a full `invalidate_after` period,
//! without reloading on every miss.
//!
//! ## Failure Handling
//!
//! A failed reload never replaces the snapshot. If a previous snapshot
//! exists it keeps being served and its fetch time is left untouched, so
//! the next access retries under the same rule. Only a cache that has
//! never loaded surfaces the failure to the caller.
//!
//! ## Concurrency
//!
//! - Readers take a short read lock to clone an `Arc` of the snapshot and
//!   never wait on a reload.
//! - Reloads are single-flight: a gate mutex is held around
//!   check-and-reload. A caller that finds the gate taken while a snapshot
//!   exists is served that snapshot instead of queueing.
//! - Snapshots are swapped whole, so a partially loaded catalog is never
//!   observable.
//! - A load that outlives `load_timeout` is not abandoned. Its result
//!   channel is parked in the cache and the next reload waits on that same
//!   load instead of starting another one, so at most one loader call runs
//!   at any time.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use sensorgate_core::{CacheConfig, LoadError, ReferenceCache};
//!
//! let cache = ReferenceCache::new(
//!     "units",
//!     || -> Result<Vec<(String, String)>, LoadError> {
//!         Ok(vec![("temp".into(), "celsius".into()), ("rh".into(), "percent".into())])
//!     },
//!     |entry: &(String, String)| entry.0.clone(),
//!     CacheConfig::new().invalidate_after(Duration::from_secs(300)),
//! );
//!
//! assert_eq!(cache.all()?.len(), 2);
//! assert_eq!(cache.get(&"rh".to_string())?.1, "percent");
//! # Ok::<(), sensorgate_core::CacheError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::config::CacheConfig;
use crate::errors::{CacheError, CacheResult, LoadError};
use crate::time::{MonotonicTime, Timestamp};
use crate::traits::{CatalogLoader, TimeSource};

type KeyFn<K, V> = dyn Fn(&V) -> K + Send + Sync;

/// Result channel of a load running on a helper thread
type PendingLoad<V> = mpsc::Receiver<Result<Vec<V>, LoadError>>;

/// Immutable catalog contents plus the time they were fetched
struct Snapshot<K, V> {
    entries: Arc<HashMap<K, V>>,
    fetched_at: Timestamp,
}

impl<K, V> Clone for Snapshot<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            fetched_at: self.fetched_at,
        }
    }
}

/// Point-in-time copy of the cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reload attempts, successful or not
    pub loads: u64,
    /// Loader invocations that failed or timed out
    pub load_failures: u64,
    /// Responses served from an older snapshot because a reload failed or was in flight
    pub stale_served: u64,
    /// Requests answered from the snapshot without reloading
    pub hits: u64,
    /// Keyed lookups that ended in `NotFound`
    pub misses: u64,
}

#[derive(Default)]
struct Counters {
    loads: AtomicU64,
    load_failures: AtomicU64,
    stale_served: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Thread-safe read-through cache over a bulk-loadable catalog
///
/// `K` is extracted from every loaded value by the `key_of` function given
/// at construction, which must be total and injective over valid values.
/// Later duplicates overwrite earlier ones.
pub struct ReferenceCache<K, V, T = MonotonicTime> {
    name: String,
    loader: Arc<dyn CatalogLoader<V>>,
    key_of: Box<KeyFn<K, V>>,
    config: CacheConfig,
    clock: T,
    state: RwLock<Option<Snapshot<K, V>>>,
    reload_gate: Mutex<()>,
    pending: Mutex<Option<PendingLoad<V>>>,
    counters: Counters,
}

impl<K, V> ReferenceCache<K, V, MonotonicTime>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Create an empty cache aged by a monotonic clock
    ///
    /// Nothing is loaded until the first access.
    pub fn new<L, F>(name: impl Into<String>, loader: L, key_of: F, config: CacheConfig) -> Self
    where
        L: CatalogLoader<V> + 'static,
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self::with_time_source(name, loader, key_of, config, MonotonicTime::new())
    }
}

impl<K, V, T> ReferenceCache<K, V, T>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    T: TimeSource,
{
    /// Create an empty cache aged by `clock`
    pub fn with_time_source<L, F>(
        name: impl Into<String>,
        loader: L,
        key_of: F,
        config: CacheConfig,
        clock: T,
    ) -> Self
    where
        L: CatalogLoader<V> + 'static,
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        let name = name.into();
        if clock.is_wall_clock() {
            log::warn!(
                "{}: snapshots aged by a wall clock; clock adjustments shift staleness",
                name
            );
        }

        Self {
            name,
            loader: Arc::new(loader),
            key_of: Box::new(key_of),
            config,
            clock,
            state: RwLock::new(None),
            reload_gate: Mutex::new(()),
            pending: Mutex::new(None),
            counters: Counters::default(),
        }
    }

    /// Cache name used in log lines
    /// Name used in log lines
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timing configuration in effect
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current snapshot, reloading first if it is older than `invalidate_after`
    ///
    /// A failed reload serves the previous snapshot when there is one.
    pub fn all(&self) -> CacheResult<Arc<HashMap<K, V>>> {
        let threshold = self.config.invalidate_after;

        if let Some(snapshot) = self.current()? {
            if !self.is_older_than(&snapshot, threshold) {
                Counters::bump(&self.counters.hits);
                return Ok(snapshot.entries);
            }
        }

        self.reload_when(|current| current.map_or(true, |s| self.is_older_than(s, threshold)))
    }

    /// Reload unconditionally and return the resulting snapshot
    ///
    /// Waits for any reload already in flight, then issues its own.
    pub fn refresh(&self) -> CacheResult<Arc<HashMap<K, V>>> {
        let _gate = self.lock_gate()?;
        let previous = self.current()?;
        self.reload(previous)
    }

    /// Look up a single entry
    ///
    /// Hits never reload. A miss reloads first when the snapshot is at least
    /// `retry_after` old, then answers from the new snapshot.
    pub fn get(&self, key: &K) -> CacheResult<V>
    where
        K: fmt::Display,
        V: Clone,
    {
        let threshold = self.config.retry_after;

        let entries = match self.current()? {
            Some(snapshot) => {
                if let Some(value) = snapshot.entries.get(key) {
                    Counters::bump(&self.counters.hits);
                    return Ok(value.clone());
                }
                if !self.is_older_than(&snapshot, threshold) {
                    return Err(self.not_found(key));
                }
                self.reload_when(|current| {
                    current.map_or(true, |s| {
                        !s.entries.contains_key(key) && self.is_older_than(s, threshold)
                    })
                })?
            }
            None => self.reload_when(|current| current.is_none())?,
        };

        entries.get(key).cloned().ok_or_else(|| self.not_found(key))
    }

    /// Whether a snapshot has ever been loaded
    pub fn is_populated(&self) -> bool {
        self.current().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Time since the last successful load, `None` before the first one
    pub fn last_fetch_age(&self) -> Option<Duration> {
        let snapshot = self.current().ok().flatten()?;
        Some(Duration::from_millis(self.age_ms(&snapshot)))
    }

    /// Point-in-time copy of the counters
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    fn current(&self) -> CacheResult<Option<Snapshot<K, V>>> {
        let state = self.state.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(state.clone())
    }

    fn age_ms(&self, snapshot: &Snapshot<K, V>) -> u64 {
        self.clock.now().saturating_sub(snapshot.fetched_at)
    }

    fn is_older_than(&self, snapshot: &Snapshot<K, V>, threshold: Duration) -> bool {
        u128::from(self.age_ms(snapshot)) >= threshold.as_millis()
    }

    fn not_found(&self, key: &K) -> CacheError
    where
        K: fmt::Display,
    {
        Counters::bump(&self.counters.misses);
        log::debug!("{}: no entry for key {}", self.name, key);
        CacheError::NotFound(key.to_string())
    }

    fn lock_gate(&self) -> CacheResult<MutexGuard<'_, ()>> {
        self.reload_gate.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Single-flight reload, re-checking `still_needed` once the gate is held
    fn reload_when<P>(&self, still_needed: P) -> CacheResult<Arc<HashMap<K, V>>>
    where
        P: Fn(Option<&Snapshot<K, V>>) -> bool,
    {
        let _gate = match self.reload_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                if let Some(snapshot) = self.current()? {
                    log::trace!("{}: reload in flight, serving previous snapshot", self.name);
                    Counters::bump(&self.counters.stale_served);
                    return Ok(snapshot.entries);
                }
                self.lock_gate()?
            }
            Err(TryLockError::Poisoned(_)) => return Err(CacheError::LockPoisoned),
        };

        let current = self.current()?;
        if let Some(snapshot) = &current {
            if !still_needed(Some(snapshot)) {
                Counters::bump(&self.counters.hits);
                return Ok(Arc::clone(&snapshot.entries));
            }
        }

        self.reload(current)
    }

    /// Fetch and install a new snapshot. Caller must hold the reload gate.
    fn reload(&self, previous: Option<Snapshot<K, V>>) -> CacheResult<Arc<HashMap<K, V>>> {
        Counters::bump(&self.counters.loads);
        log::debug!("{}: reloading from {}", self.name, self.loader.describe());

        let values = match self.fetch() {
            Ok(values) => values,
            Err(err) => {
                Counters::bump(&self.counters.load_failures);
                return match previous {
                    Some(snapshot) => {
                        log::warn!(
                            "{}: reload failed ({}), serving snapshot aged {} ms",
                            self.name,
                            err,
                            self.age_ms(&snapshot)
                        );
                        Counters::bump(&self.counters.stale_served);
                        Ok(snapshot.entries)
                    }
                    None => {
                        log::warn!("{}: initial load failed: {}", self.name, err);
                        Err(err)
                    }
                };
            }
        };

        let entries: HashMap<K, V> = values
            .into_iter()
            .map(|value| ((self.key_of)(&value), value))
            .collect();
        let snapshot = Snapshot {
            entries: Arc::new(entries),
            fetched_at: self.clock.now(),
        };

        {
            let mut state = self.state.write().map_err(|_| CacheError::LockPoisoned)?;
            *state = Some(snapshot.clone());
        }

        if previous.is_none() {
            log::info!("{}: loaded {} entries", self.name, snapshot.entries.len());
        } else {
            log::debug!("{}: reloaded {} entries", self.name, snapshot.entries.len());
        }

        Ok(snapshot.entries)
    }

    /// Run the loader, bounded by `load_timeout` when configured
    ///
    /// Caller must hold the reload gate. A load still running from an
    /// earlier timed-out reload is waited on again instead of starting a
    /// second one.
    fn fetch(&self) -> CacheResult<Vec<V>> {
        let Some(timeout) = self.config.load_timeout else {
            return self.loader.load().map_err(CacheError::UpstreamUnavailable);
        };

        let mut pending = self.pending.lock().map_err(|_| CacheError::LockPoisoned)?;
        let rx = match pending.take() {
            Some(rx) => {
                log::debug!("{}: waiting on load still in flight", self.name);
                rx
            }
            None => self.spawn_load()?,
        };

        match rx.recv_timeout(timeout) {
            Ok(result) => result.map_err(CacheError::UpstreamUnavailable),
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("{}: load exceeded {:?}", self.name, timeout);
                *pending = Some(rx);
                Err(CacheError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(CacheError::UpstreamUnavailable(
                LoadError::new("loader thread exited without a result"),
            )),
        }
    }

    fn spawn_load(&self) -> CacheResult<PendingLoad<V>> {
        let loader = Arc::clone(&self.loader);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("{}-loader", self.name))
            .spawn(move || {
                // Receiver is gone once the cache is dropped
                let _ = tx.send(loader.load());
            })
            .map_err(|e| CacheError::UpstreamUnavailable(LoadError::new(e.to_string())))?;
        Ok(rx)
    }
}

impl<K, V, T> fmt::Debug for ReferenceCache<K, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCache")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("stats", &self.counters.snapshot())
            .finish()
    }
}
