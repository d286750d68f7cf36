//! Source Completeness Monitoring
//!
//! ## Overview
//!
//! A source (one physical device) delivers several channels, each sampled at
//! its own nominal frequency. Over a window of `d` seconds a channel sampled
//! at `f` Hz should deliver `f × d` samples. Comparing that with what storage
//! actually holds tells us whether the source is healthy.
//!
//! ## Classification
//!
//! ```text
//! p = received / expected          (0 when expected is 0)
//!
//!   p >  0.95          FINE
//!   0.80 < p <= 0.95   OK
//!   0    < p <= 0.80   WARNING
//!   p == 0             DISCONNECTED
//!   p <  0             UNKNOWN
//! ```
//!
//! The source as a whole is classified with the same boundaries applied to
//! the mean of its per-channel percentages, averaged over the channels
//! actually evaluated.
//!
//! ## Statelessness
//!
//! `CompletenessMonitor` holds nothing between calls. Counts come from a
//! storage collaborator that already restricted samples to the window, so
//! the monitor can be shared freely across threads.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{COMPLETENESS_DISCONNECTED, COMPLETENESS_FINE, COMPLETENESS_OK};
use crate::time::TimeSpan;
use crate::traits::SampleCounter;

/// Discrete health of a channel or a whole source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    /// Above 95% of expected samples
    Fine,
    /// Above 80%
    Ok,
    /// Above 0%
    Warning,
    /// Nothing received
    Disconnected,
    /// Counts could not be interpreted
    Unknown,
}

impl HealthState {
    /// Classify a received/expected ratio
    pub fn classify(percentage: f64) -> Self {
        if percentage.is_nan() || percentage < 0.0 {
            HealthState::Unknown
        } else if percentage > COMPLETENESS_FINE {
            HealthState::Fine
        } else if percentage > COMPLETENESS_OK {
            HealthState::Ok
        } else if percentage > COMPLETENESS_DISCONNECTED {
            HealthState::Warning
        } else {
            HealthState::Disconnected
        }
    }

    /// FINE and OK are healthy
    pub fn is_healthy(self) -> bool {
        matches!(self, HealthState::Fine | HealthState::Ok)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthState::Fine => "FINE",
            HealthState::Ok => "OK",
            HealthState::Warning => "WARNING",
            HealthState::Disconnected => "DISCONNECTED",
            HealthState::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// One measurement stream of a source kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Channel identifier, unique within its source kind
    pub id: String,
    /// Nominal sampling frequency (Hz)
    pub frequency_hz: f64,
    /// Unit of the measured value
    pub unit: String,
}

impl ChannelSpec {
    /// Describe a channel sampled at `frequency_hz`
    pub fn new(id: impl Into<String>, frequency_hz: f64, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            frequency_hz,
            unit: unit.into(),
        }
    }

    /// Samples this channel should deliver over `window`
    pub fn expected_samples(&self, window: &TimeSpan) -> f64 {
        self.frequency_hz * window.duration_seconds()
    }
}

/// Static description of a source kind: which channels it has and how often they sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Source kind identifier
    pub kind: String,
    /// Channels, order irrelevant
    pub channels: Vec<ChannelSpec>,
}

impl SourceSpec {
    /// Kind with no channels yet
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            channels: Vec::new(),
        }
    }

    /// Add a channel
    pub fn with_channel(mut self, channel: ChannelSpec) -> Self {
        self.channels.push(channel);
        self
    }

    /// Look up a channel by id
    pub fn channel(&self, id: &str) -> Option<&ChannelSpec> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// Completeness of one channel over the evaluated window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    /// Evaluated channel
    pub channel_id: String,
    /// Samples storage holds for the window
    pub received: i64,
    /// Samples the nominal frequency predicts for the window
    pub expected: f64,
    /// `received / expected`, 0 when nothing was expected
    pub percentage: f64,
    /// Classification of `percentage`
    pub state: HealthState,
    /// `1 − percentage`, clamped to `[0, 1]`
    pub loss: f64,
}

/// Aggregate completeness of a source over the evaluated window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Evaluated source instance
    pub source_id: String,
    /// Kind whose spec drove the evaluation
    pub source_kind: String,
    /// Window the counts cover
    pub window: TimeSpan,
    /// Classification of the mean channel percentage
    pub state: HealthState,
    /// Sum of per-channel received counts
    pub total_received: i64,
    /// `1 − mean percentage`, clamped to `[0, 1]`
    pub average_loss: f64,
    /// One report per declared channel
    pub channels: Vec<ChannelReport>,
}

impl SourceReport {
    /// Report for one channel
    pub fn channel(&self, id: &str) -> Option<&ChannelReport> {
        self.channels.iter().find(|c| c.channel_id == id)
    }
}

/// Stateless completeness evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessMonitor;

impl CompletenessMonitor {
    /// Create a monitor
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `source_id` against `spec` using per-channel counts for `window`
    ///
    /// Channels missing from `counts` are treated as having received nothing.
    /// Counts for channels the spec does not declare are ignored.
    pub fn evaluate(
        &self,
        source_id: &str,
        spec: &SourceSpec,
        window: &TimeSpan,
        counts: &HashMap<String, i64>,
    ) -> SourceReport {
        let channels: Vec<ChannelReport> = spec
            .channels
            .iter()
            .map(|channel| {
                let received = counts.get(&channel.id).copied().unwrap_or(0);
                channel_report(channel, window, received)
            })
            .collect();

        let total_received = channels.iter().map(|c| c.received).sum();
        let mean = if channels.is_empty() {
            0.0
        } else {
            channels.iter().map(|c| c.percentage).sum::<f64>() / channels.len() as f64
        };

        SourceReport {
            source_id: source_id.to_string(),
            source_kind: spec.kind.clone(),
            window: *window,
            state: HealthState::classify(mean),
            total_received,
            average_loss: loss_fraction(mean),
            channels,
        }
    }

    /// Evaluate with counts pulled from a storage collaborator, one query per channel
    pub fn evaluate_from<S: SampleCounter>(
        &self,
        source_id: &str,
        spec: &SourceSpec,
        window: &TimeSpan,
        storage: &S,
    ) -> Result<SourceReport, S::Error> {
        let mut counts = HashMap::with_capacity(spec.channels.len());
        for channel in &spec.channels {
            let received = storage.count(source_id, &channel.id, window)?;
            counts.insert(channel.id.clone(), received);
        }
        Ok(self.evaluate(source_id, spec, window, &counts))
    }
}

fn channel_report(channel: &ChannelSpec, window: &TimeSpan, received: i64) -> ChannelReport {
    let expected = channel.expected_samples(window);
    let percentage = if expected > 0.0 && expected.is_finite() {
        received as f64 / expected
    } else {
        0.0
    };

    ChannelReport {
        channel_id: channel.id.clone(),
        received,
        expected,
        percentage,
        state: HealthState::classify(percentage),
        loss: loss_fraction(percentage),
    }
}

fn loss_fraction(percentage: f64) -> f64 {
    if percentage.is_nan() {
        return 1.0;
    }
    (1.0 - percentage).clamp(0.0, 1.0)
}
