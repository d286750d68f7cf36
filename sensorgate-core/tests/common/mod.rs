//! Shared fixtures for sensorgate-core integration tests
//!
//! Provides:
//! - A counting catalog loader whose contents, latency and availability can
//!   be changed between loads
//! - Source kind fixtures with realistic channel frequencies
//! - Fixed instants for window tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sensorgate_core::{CatalogLoader, ChannelSpec, LoadError, SourceSpec};

// ===== TEST CONSTANTS =====

/// Staleness threshold used by timing tests.
pub const INVALIDATE_AFTER: Duration = Duration::from_millis(300);

/// Miss retry threshold used by timing tests.
pub const RETRY_AFTER: Duration = Duration::from_millis(150);

/// Catalog record used by cache tests
#[derive(Debug, Clone, PartialEq)]
pub struct SourceType {
    pub id: String,
    pub name: String,
}

impl SourceType {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    pub fn key(&self) -> String {
        self.id.clone()
    }
}

/// Loader double counting every call
#[derive(Clone, Default)]
pub struct CountingLoader {
    calls: Arc<AtomicU64>,
    running: Arc<AtomicU64>,
    peak_running: Arc<AtomicU64>,
    records: Arc<Mutex<Vec<SourceType>>>,
    offline: Arc<AtomicBool>,
    latency: Arc<Mutex<Duration>>,
}

impl CountingLoader {
    pub fn with(records: Vec<SourceType>) -> Self {
        let loader = Self::default();
        *loader.records.lock().unwrap() = records;
        loader
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most loads ever observed running at the same time
    pub fn peak_running(&self) -> u64 {
        self.peak_running.load(Ordering::SeqCst)
    }

    pub fn push(&self, record: SourceType) {
        self.records.lock().unwrap().push(record);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }
}

impl CatalogLoader<SourceType> for CountingLoader {
    fn load(&self) -> Result<Vec<SourceType>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(running, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        let result = if self.offline.load(Ordering::SeqCst) {
            Err(LoadError::new("registry unreachable"))
        } else {
            Ok(self.records.lock().unwrap().clone())
        };

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn describe(&self) -> String {
        "counting-loader".to_string()
    }
}

/// Default catalog contents
pub fn source_types() -> Vec<SourceType> {
    vec![
        SourceType::new("weather_station", "Weather station"),
        SourceType::new("air_quality", "Air quality monitor"),
    ]
}

/// Seven-channel station sampled mostly at 1 Hz
pub fn weather_station() -> SourceSpec {
    SourceSpec::new("weather_station")
        .with_channel(ChannelSpec::new("temperature", 1.0, "celsius"))
        .with_channel(ChannelSpec::new("humidity", 1.0, "percent"))
        .with_channel(ChannelSpec::new("pressure", 1.0, "hPa"))
        .with_channel(ChannelSpec::new("wind_speed", 4.0, "m/s"))
        .with_channel(ChannelSpec::new("wind_direction", 4.0, "degree"))
        .with_channel(ChannelSpec::new("rain", 0.1, "mm"))
        .with_channel(ChannelSpec::new("irradiance", 0.5, "W/m2"))
}

/// Counts matching `fraction` of each channel's expectation over `seconds`
pub fn counts_at(spec: &SourceSpec, seconds: f64, fraction: f64) -> HashMap<String, i64> {
    spec.channels
        .iter()
        .map(|c| (c.id.clone(), (c.frequency_hz * seconds * fraction).round() as i64))
        .collect()
}

pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 12, 0, 0).unwrap()
}
