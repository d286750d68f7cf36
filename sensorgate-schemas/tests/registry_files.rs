//! Registering source kinds shipped as files next to a deployment

use sensorgate_core::{CompletenessMonitor, TimeSpan};
use sensorgate_schemas::{SchemaError, SourceKindRegistry};

use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;

const TIDE_GAUGE: &str = r#"{
  "id": "tide_gauge",
  "name": "Tide gauge",
  "channels": [
    { "id": "level", "frequency_hz": 1.0, "unit": "m" },
    { "id": "battery", "frequency_hz": 0.1, "unit": "V" }
  ]
}"#;

#[test]
fn kinds_from_directory_extend_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tide_gauge.json");
    std::fs::write(&path, TIDE_GAUGE).unwrap();

    let registry = SourceKindRegistry::with_defaults().unwrap();
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let text = std::fs::read_to_string(&path).unwrap();
        registry
            .register_json(&path.display().to_string(), &text)
            .unwrap();
    }

    assert_eq!(registry.len(), 4);
    assert!(registry.kinds().unwrap().contains(&"tide_gauge".to_string()));
}

#[test]
fn embedded_kind_cannot_be_shadowed() {
    let registry = SourceKindRegistry::with_defaults().unwrap();
    let shadow = r#"{ "id": "weather_station", "name": "Impostor", "channels": [] }"#;

    assert!(matches!(
        registry.register_json("shadow.json", shadow),
        Err(SchemaError::ValidationError(_))
    ));
    assert_eq!(registry.get("weather_station").unwrap().name, "Weather station");
}

#[test]
fn registry_spec_drives_health_evaluation() {
    let registry = SourceKindRegistry::new();
    registry.register_json("inline", TIDE_GAUGE).unwrap();
    let spec = registry.spec("tide_gauge").unwrap();

    let end = Utc.with_ymd_and_hms(2024, 9, 2, 12, 0, 0).unwrap();
    let window = TimeSpan::ending_at(end, Duration::seconds(60));
    let counts: HashMap<String, i64> =
        [("level".to_string(), 60), ("battery".to_string(), 6)].into_iter().collect();

    let report = CompletenessMonitor::new().evaluate("gauge-1", &spec, &window, &counts);
    assert!(report.state.is_healthy());
    assert_eq!(report.source_kind, "tide_gauge");
}
