//! Window Resolution Example
//!
//! Shows how a request handler turns raw query-string parameters into a
//! span and bucket size for the aggregation query.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_window_resolution
//! ```

use chrono::Utc;
use sensorgate_core::{WindowRequest, WindowResolver};

fn main() {
    println!("SensorGate Window Resolution Example");
    println!("====================================\n");

    let resolver = WindowResolver::default();
    let now = Utc::now();

    let queries = [
        (None, None, None),
        (None, None, Some("1min")),
        (Some("2024-01-01T00:00:00Z"), Some("2024-01-02T00:00:00Z"), None),
        (Some("2024-01-01T00:00:00Z"), Some("2024-03-01T00:00:00Z"), Some("10s")),
        (Some("2024-03-01T00:00:00Z"), Some("2024-01-01T00:00:00Z"), None),
        (Some("last tuesday"), None, None),
    ];

    for (start, end, bucket) in queries {
        println!("start={:?} end={:?} bucket={:?}", start, end, bucket);

        let resolution = WindowRequest::parse(start, end, bucket)
            .and_then(|request| resolver.resolve_request(&request, now));

        match resolution {
            Ok(resolution) => println!(
                "  -> {} .. {} in {} buckets of {}\n",
                resolution.span.start(),
                resolution.span.end(),
                resolution.bucket_count(),
                resolution.bucket
            ),
            Err(e) => println!("  -> HTTP {}: {}\n", e.kind().status_code(), e),
        }
    }
}
