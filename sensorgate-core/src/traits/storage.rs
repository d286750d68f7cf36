//! Windowed sample counting
//!
//! The storage collaborator owns the samples; the completeness monitor only
//! needs to know how many arrived per channel inside a window.

use crate::time::TimeSpan;

/// Counts samples stored for one channel of one source inside `[start, end)`
pub trait SampleCounter {
    /// Storage specific failure
    type Error;

    /// Number of samples received for `channel_id` of `source_id` within `span`
    fn count(&self, source_id: &str, channel_id: &str, span: &TimeSpan) -> Result<i64, Self::Error>;
}
