//! Time Window and Bucket Resolution
//!
//! ## Overview
//!
//! Range queries arrive with an optional start, an optional end and an
//! optional bucket size. `WindowResolver` turns that into a concrete
//! [`Resolution`]: a span plus the bucket size to aggregate it with, never
//! producing more than `max_buckets` buckets.
//!
//! ## Span Defaults
//!
//! ```text
//! start  end   bucket   span
//! -----  ----  ------   ------------------------------------------
//!  yes    any   any     [start, end or now]
//!  no     any   yes     [end − window_count × bucket, end or now]
//!  no     any   no      [end − 365 d, end or now]
//! ```
//!
//! ## Bucket Derivation
//!
//! Without an explicit bucket the resolver aims for `default_window_count`
//! buckets. Candidates are compared in log-space,
//!
//! ```text
//! target = ln(span_seconds / window_count)
//! choose argmin |ln(bucket_seconds) − target|
//! ```
//!
//! so the same relative tolerance applies to a ten-minute span and to a
//! year, the way time-series charts pick axis ticks.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WindowConfig;
use crate::constants::{
    MS_PER_SECOND, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, SECONDS_PER_WEEK,
};
use crate::errors::{WindowError, WindowResult};
use crate::time::TimeSpan;

/// Enumerated aggregation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BucketSize {
    /// `10s`
    #[serde(rename = "10s")]
    TenSeconds,
    /// `1min`
    #[serde(rename = "1min")]
    OneMinute,
    /// `10min`
    #[serde(rename = "10min")]
    TenMinutes,
    /// `1h`
    #[serde(rename = "1h")]
    OneHour,
    /// `1d`
    #[serde(rename = "1d")]
    OneDay,
    /// `1w`
    #[serde(rename = "1w")]
    OneWeek,
}

impl BucketSize {
    /// Every size, strictly increasing
    pub const ALL: [BucketSize; 6] = [
        BucketSize::TenSeconds,
        BucketSize::OneMinute,
        BucketSize::TenMinutes,
        BucketSize::OneHour,
        BucketSize::OneDay,
        BucketSize::OneWeek,
    ];

    /// Length in seconds
    pub const fn seconds(self) -> i64 {
        match self {
            BucketSize::TenSeconds => 10,
            BucketSize::OneMinute => SECONDS_PER_MINUTE,
            BucketSize::TenMinutes => 10 * SECONDS_PER_MINUTE,
            BucketSize::OneHour => SECONDS_PER_HOUR,
            BucketSize::OneDay => SECONDS_PER_DAY,
            BucketSize::OneWeek => SECONDS_PER_WEEK,
        }
    }

    /// Length as a chrono duration
    pub fn duration(self) -> Duration {
        Duration::seconds(self.seconds())
    }

    /// Query-string token
    pub const fn token(self) -> &'static str {
        match self {
            BucketSize::TenSeconds => "10s",
            BucketSize::OneMinute => "1min",
            BucketSize::TenMinutes => "10min",
            BucketSize::OneHour => "1h",
            BucketSize::OneDay => "1d",
            BucketSize::OneWeek => "1w",
        }
    }
}

impl fmt::Display for BucketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for BucketSize {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        BucketSize::ALL
            .iter()
            .copied()
            .find(|size| size.token().eq_ignore_ascii_case(token))
            .ok_or_else(|| WindowError::UnknownBucket(s.to_string()))
    }
}

/// Element of `items` minimizing `metric`; the first one wins ties
pub fn nearest_by<T, I, F>(items: I, metric: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> f64,
{
    items
        .into_iter()
        .map(|item| {
            let distance = metric(&item);
            (item, distance)
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(item, _)| item)
}

/// Candidate bucket sizes with their precomputed log-durations, ascending
#[derive(Debug, Clone, PartialEq)]
struct BucketTable {
    entries: Vec<(BucketSize, f64)>,
}

impl BucketTable {
    fn new(sizes: &[BucketSize]) -> WindowResult<Self> {
        let mut sizes = sizes.to_vec();
        sizes.sort();
        sizes.dedup();
        if sizes.is_empty() {
            return Err(WindowError::EmptyBucketTable);
        }

        let entries = sizes
            .into_iter()
            .map(|size| (size, (size.seconds() as f64).ln()))
            .collect();
        Ok(Self { entries })
    }

    fn smallest(&self) -> BucketSize {
        self.entries[0].0
    }

    fn nearest(&self, target_log_seconds: f64) -> BucketSize {
        nearest_by(self.entries.iter(), |(_, ln)| (ln - target_log_seconds).abs())
            .map(|(size, _)| *size)
            .unwrap_or_else(|| self.smallest())
    }
}

/// A span paired with the bucket size to aggregate it with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolved `[start, end]`
    pub span: TimeSpan,
    /// Bucket size, requested or derived
    pub bucket: BucketSize,
}

impl Resolution {
    /// Number of whole buckets in the span
    pub fn bucket_count(&self) -> u64 {
        let span_ms = self.span.duration().num_milliseconds().max(0) as u64;
        span_ms / (self.bucket.seconds() as u64 * MS_PER_SECOND)
    }
}

/// Raw request parameters, typed but not yet resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowRequest {
    /// `start` parameter
    pub start: Option<DateTime<Utc>>,
    /// `end` parameter
    pub end: Option<DateTime<Utc>>,
    /// `bucket` parameter
    pub bucket: Option<BucketSize>,
}

impl WindowRequest {
    /// Parse query-string values; empty strings count as absent
    ///
    /// ```rust
    /// use sensorgate_core::window::{BucketSize, WindowRequest};
    ///
    /// let request = WindowRequest::parse(Some("2024-05-01T00:00:00Z"), None, Some("1h"))?;
    /// assert_eq!(request.bucket, Some(BucketSize::OneHour));
    /// assert!(request.end.is_none());
    /// # Ok::<(), sensorgate_core::WindowError>(())
    /// ```
    pub fn parse(start: Option<&str>, end: Option<&str>, bucket: Option<&str>) -> WindowResult<Self> {
        Ok(Self {
            start: parse_instant(start)?,
            end: parse_instant(end)?,
            bucket: present(bucket).map(str::parse::<BucketSize>).transpose()?,
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_instant(value: Option<&str>) -> WindowResult<Option<DateTime<Utc>>> {
    present(value)
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|_| WindowError::InvalidTimestamp(raw.to_string()))
        })
        .transpose()
}

fn saturating_seconds(seconds: i64) -> Duration {
    Duration::try_seconds(seconds).unwrap_or_else(Duration::max_value)
}

/// Picks the span and bucket size answering a range query
#[derive(Debug, Clone)]
pub struct WindowResolver {
    config: WindowConfig,
    table: BucketTable,
}

impl Default for WindowResolver {
    fn default() -> Self {
        let config = WindowConfig::default();
        let table = BucketTable {
            entries: BucketSize::ALL
                .iter()
                .map(|size| (*size, (size.seconds() as f64).ln()))
                .collect(),
        };
        Self { config, table }
    }
}

impl WindowResolver {
    /// Build a resolver from a validated config
    ///
    /// Fails with `EmptyBucketTable` when no bucket sizes are configured and
    /// with `InvalidConfig` when any other field is out of range.
    pub fn new(config: WindowConfig) -> WindowResult<Self> {
        let table = BucketTable::new(&config.bucket_sizes)?;
        config
            .validate()
            .map_err(|e| WindowError::InvalidConfig(e.to_string()))?;
        Ok(Self { config, table })
    }

    /// Validated configuration
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Resolve a range query issued at `now`
    pub fn resolve(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        bucket: Option<BucketSize>,
        now: DateTime<Utc>,
    ) -> WindowResult<Resolution> {
        let end = end.unwrap_or(now);
        let span = match (start, bucket) {
            (Some(start), _) => TimeSpan::new(start, end)?,
            (None, Some(bucket)) => TimeSpan::ending_at(
                end,
                saturating_seconds(bucket.seconds().saturating_mul(i64::from(self.config.default_window_count))),
            ),
            (None, None) => TimeSpan::ending_at(
                end,
                saturating_seconds(self.config.default_span_days.saturating_mul(SECONDS_PER_DAY)),
            ),
        };

        let bucket = bucket.unwrap_or_else(|| self.derive_bucket(&span));

        let buckets = span.duration_seconds() / bucket.seconds() as f64;
        if buckets > self.config.max_buckets as f64 {
            log::trace!(
                "rejecting {} over {} s: {:.0} buckets exceed {}",
                bucket,
                span.duration_seconds(),
                buckets,
                self.config.max_buckets
            );
            return Err(WindowError::ResolutionTooFine {
                buckets: buckets.ceil() as u64,
                max: self.config.max_buckets,
            });
        }

        Ok(Resolution { span, bucket })
    }

    /// Resolve an already parsed request
    pub fn resolve_request(&self, request: &WindowRequest, now: DateTime<Utc>) -> WindowResult<Resolution> {
        self.resolve(request.start, request.end, request.bucket, now)
    }

    /// Nearest configured bucket in log-space to `span / default_window_count`
    pub fn derive_bucket(&self, span: &TimeSpan) -> BucketSize {
        let seconds = span.duration_seconds();
        if seconds <= 0.0 {
            return self.table.smallest();
        }
        let target = (seconds / f64::from(self.config.default_window_count)).ln();
        self.table.nearest(target)
    }
}
