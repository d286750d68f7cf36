//! Runtime configuration
//!
//! Every knob the policy engines expose, grouped per component. All groups
//! have working defaults matching the reference deployment and can be
//! overridden from a JSON document:
//!
//! ```json
//! {
//!   "cache":   { "invalidate_after_ms": 3600000, "retry_after_ms": 60000, "load_timeout_ms": 30000 },
//!   "window":  { "default_window_count": 100, "max_buckets": 1000, "bucket_sizes": ["10s", "1min", "1h"] },
//!   "monitor": { "window_length_ms": 60000, "grid_ms": 10000 }
//! }
//! ```
//!
//! Durations are written in milliseconds. Missing fields fall back to defaults.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INVALIDATE_AFTER_MS, DEFAULT_LOAD_TIMEOUT_MS, DEFAULT_RETRY_AFTER_MS,
    DEFAULT_SPAN_DAYS, DEFAULT_WINDOW_COUNT, MAX_BUCKETS, MAX_SPAN_DAYS, MONITOR_GRID_S,
    MONITOR_WINDOW_S,
};
use crate::errors::ConfigError;
use crate::time::TimeSpan;
use crate::window::BucketSize;

/// Staleness policy for a [`ReferenceCache`](crate::cache::ReferenceCache)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age after which a bulk read reloads the snapshot
    #[serde(rename = "invalidate_after_ms", with = "duration_ms")]
    pub invalidate_after: Duration,
    /// Age after which a keyed miss reloads the snapshot
    #[serde(rename = "retry_after_ms", with = "duration_ms")]
    pub retry_after: Duration,
    /// Upper bound on a single load; `None` waits for the loader indefinitely
    #[serde(rename = "load_timeout_ms", with = "option_duration_ms")]
    pub load_timeout: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            invalidate_after: Duration::from_millis(DEFAULT_INVALIDATE_AFTER_MS),
            retry_after: Duration::from_millis(DEFAULT_RETRY_AFTER_MS),
            load_timeout: Some(Duration::from_millis(DEFAULT_LOAD_TIMEOUT_MS)),
        }
    }
}

impl CacheConfig {
    /// Defaults from [`crate::constants`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bulk staleness threshold
    pub fn invalidate_after(mut self, threshold: Duration) -> Self {
        self.invalidate_after = threshold;
        self
    }

    /// Set the keyed-miss retry threshold
    pub fn retry_after(mut self, threshold: Duration) -> Self {
        self.retry_after = threshold;
        self
    }

    /// Bound every load by `timeout`
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Run loads inline on the calling thread with no time bound
    pub fn without_load_timeout(mut self) -> Self {
        self.load_timeout = None;
        self
    }

    /// Reject a zero load timeout; warn when `retry_after` exceeds `invalidate_after`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.load_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid("load_timeout must be positive".into()));
        }
        if self.retry_after > self.invalidate_after {
            log::warn!(
                "retry_after ({:?}) exceeds invalidate_after ({:?}); misses will never trigger an early reload",
                self.retry_after,
                self.invalidate_after
            );
        }
        Ok(())
    }
}

/// Bucket budget and defaults for [`WindowResolver`](crate::window::WindowResolver)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Buckets a derived resolution aims for
    pub default_window_count: u32,
    /// Upper bound on buckets per resolution
    pub max_buckets: u64,
    /// Lookback when neither start nor bucket is given
    pub default_span_days: i64,
    /// Candidate bucket sizes for derivation
    pub bucket_sizes: Vec<BucketSize>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_window_count: DEFAULT_WINDOW_COUNT,
            max_buckets: MAX_BUCKETS,
            default_span_days: DEFAULT_SPAN_DAYS,
            bucket_sizes: BucketSize::ALL.to_vec(),
        }
    }
}

impl WindowConfig {
    /// Defaults from [`crate::constants`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets spanned when only a bucket size is given
    pub fn default_window_count(mut self, count: u32) -> Self {
        self.default_window_count = count;
        self
    }

    /// Upper bound on buckets per request
    pub fn max_buckets(mut self, max: u64) -> Self {
        self.max_buckets = max;
        self
    }

    /// Set the lookback used when neither start nor bucket is given
    pub fn default_span_days(mut self, days: i64) -> Self {
        self.default_span_days = days;
        self
    }

    /// Set the candidate bucket sizes
    pub fn bucket_sizes(mut self, sizes: &[BucketSize]) -> Self {
        self.bucket_sizes = sizes.to_vec();
        self
    }

    /// Check every field is usable
    ///
    /// `default_window_count` must lie in `1..=max_buckets` and
    /// `default_span_days` in `1..=MAX_SPAN_DAYS`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buckets == 0 {
            return Err(ConfigError::Invalid("max_buckets must be positive".into()));
        }
        if self.default_window_count == 0 || u64::from(self.default_window_count) > self.max_buckets {
            return Err(ConfigError::Invalid(format!(
                "default_window_count must be between 1 and max_buckets ({})",
                self.max_buckets
            )));
        }
        if !(1..=MAX_SPAN_DAYS).contains(&self.default_span_days) {
            return Err(ConfigError::Invalid(format!(
                "default_span_days must be between 1 and {}",
                MAX_SPAN_DAYS
            )));
        }
        if self.bucket_sizes.is_empty() {
            return Err(ConfigError::Invalid("bucket_sizes must not be empty".into()));
        }
        Ok(())
    }
}

/// Trailing window used for source health queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Length of the evaluation window
    #[serde(rename = "window_length_ms", with = "duration_ms")]
    pub window_length: Duration,
    /// Grid the window end is aligned to
    #[serde(rename = "grid_ms", with = "duration_ms")]
    pub grid: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_length: Duration::from_secs(MONITOR_WINDOW_S as u64),
            grid: Duration::from_secs(MONITOR_GRID_S as u64),
        }
    }
}

impl MonitorConfig {
    /// Evaluation window for a health query issued at `now`
    pub fn window_at(&self, now: DateTime<Utc>) -> TimeSpan {
        TimeSpan::trailing(now, to_chrono(self.window_length), to_chrono(self.grid))
    }

    /// Reject an empty evaluation window
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_length.is_zero() {
            return Err(ConfigError::Invalid("window_length must be positive".into()));
        }
        Ok(())
    }
}

/// Complete configuration for one serving process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorGateConfig {
    /// Shared by every reference cache
    pub cache: CacheConfig,
    /// Request window resolution
    pub window: WindowConfig,
    /// Health evaluation window
    pub monitor: MonitorConfig,
}

impl SensorGateConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.window.validate()?;
        self.monitor.validate()
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::max_value())
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod option_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = SensorGateConfig::default();
        assert_eq!(config.window.default_window_count, 100);
        assert_eq!(config.window.max_buckets, 1000);
        assert_eq!(config.window.bucket_sizes.len(), 6);
        assert!(config.cache.retry_after < config.cache.invalidate_after);
        assert_eq!(config.monitor.window_length, Duration::from_secs(MONITOR_WINDOW_S as u64));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = SensorGateConfig::from_json_str(
            r#"{ "cache": { "retry_after_ms": 150 }, "window": { "bucket_sizes": ["1min", "1h"] } }"#,
        )
        .unwrap();

        assert_eq!(config.cache.retry_after, Duration::from_millis(150));
        assert_eq!(
            config.cache.invalidate_after,
            Duration::from_millis(DEFAULT_INVALIDATE_AFTER_MS)
        );
        assert_eq!(
            config.window.bucket_sizes,
            vec![BucketSize::OneMinute, BucketSize::OneHour]
        );
    }

    #[test]
    fn null_timeout_disables_bound() {
        let config =
            SensorGateConfig::from_json_str(r#"{ "cache": { "load_timeout_ms": null } }"#).unwrap();
        assert_eq!(config.cache.load_timeout, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            SensorGateConfig::from_json_str(r#"{ "window": { "bucket_sizes": [] } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SensorGateConfig::from_json_str(r#"{ "cache": { "load_timeout_ms": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SensorGateConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn oversized_window_defaults_are_rejected() {
        assert!(matches!(
            SensorGateConfig::from_json_str(r#"{ "window": { "default_span_days": 100000000 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SensorGateConfig::from_json_str(r#"{ "window": { "default_window_count": 4000000000 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(WindowConfig::new().default_span_days(MAX_SPAN_DAYS).validate().is_ok());
        assert!(WindowConfig::new()
            .default_window_count(1000)
            .max_buckets(1000)
            .validate()
            .is_ok());
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensorgate.json");
        let config = SensorGateConfig {
            cache: CacheConfig::new()
                .invalidate_after(Duration::from_millis(300))
                .retry_after(Duration::from_millis(150))
                .without_load_timeout(),
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert_eq!(SensorGateConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn monitor_window_is_aligned() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 4).unwrap();
        let span = MonitorConfig::default().window_at(now);

        assert_eq!(span.end(), Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 0).unwrap());
        assert_eq!(span.duration_seconds() as u64, MONITOR_WINDOW_S as u64);
    }
}
