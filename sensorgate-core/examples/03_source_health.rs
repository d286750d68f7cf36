//! Source Health Example
//!
//! Evaluates a weather station over the trailing health window and prints a
//! per-channel report.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 03_source_health
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sensorgate_core::{ChannelSpec, CompletenessMonitor, MonitorConfig, SourceSpec};

fn main() {
    println!("SensorGate Source Health Example");
    println!("================================\n");

    let spec = SourceSpec::new("weather_station")
        .with_channel(ChannelSpec::new("temperature", 1.0, "celsius"))
        .with_channel(ChannelSpec::new("humidity", 1.0, "percent"))
        .with_channel(ChannelSpec::new("wind_speed", 4.0, "m/s"))
        .with_channel(ChannelSpec::new("rain", 0.1, "mm"));

    let window = MonitorConfig::default().window_at(Utc::now());
    println!("Window: {} .. {}\n", window.start(), window.end());

    // What the storage collaborator would return for this window
    let counts: HashMap<String, i64> = [
        ("temperature", 60),
        ("humidity", 51),
        ("wind_speed", 120),
        ("rain", 0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let report = CompletenessMonitor::new().evaluate("station-7", &spec, &window, &counts);

    for channel in &report.channels {
        println!(
            "  {:<12} {:>4}/{:<6.0} {:>6.1}%  {}",
            channel.channel_id,
            channel.received,
            channel.expected,
            channel.percentage * 100.0,
            channel.state
        );
    }
    println!(
        "\nSource {}: {} (loss {:.1}%, {} samples)",
        report.source_id,
        report.state,
        report.average_loss * 100.0,
        report.total_received
    );
}
