//! Catalog document decoding

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ConnectorError;

/// Decode a catalog document, bare array or `{ "items": [...] }` envelope
///
/// `origin` names the document in error messages.
pub fn decode_catalog<V: DeserializeOwned>(origin: &str, text: &str) -> Result<Vec<V>, ConnectorError> {
    let decode_error = |message: String| ConnectorError::Decode {
        origin: origin.to_string(),
        message,
    };

    let document: Value = serde_json::from_str(text).map_err(|e| decode_error(e.to_string()))?;

    let items = match document {
        items @ Value::Array(_) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(items @ Value::Array(_)) => items,
            Some(_) => return Err(decode_error("\"items\" is not an array".into())),
            None => return Err(decode_error("object without \"items\"".into())),
        },
        other => return Err(decode_error(format!("unexpected top-level value {}", kind_of(&other)))),
    };

    serde_json::from_value(items).map_err(|e| decode_error(e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorgate_schemas::SourceRecord;

    #[test]
    fn bare_array() {
        let records: Vec<SourceRecord> = decode_catalog(
            "inline",
            r#"[{ "id": "ws-1", "name": "Roof", "source_type_id": "weather_station" }]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_type_id, "weather_station");
    }

    #[test]
    fn envelope_ignores_extra_fields() {
        let records: Vec<SourceRecord> = decode_catalog(
            "inline",
            r#"{ "total": 2, "items": [
                { "id": "ws-1", "name": "Roof", "source_type_id": "weather_station" },
                { "id": "aq-1", "name": "Yard", "source_type_id": "air_quality" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_catalog_is_valid() {
        let records: Vec<SourceRecord> = decode_catalog("inline", "[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_documents() {
        let cases = [
            "{",
            r#"{ "data": [] }"#,
            r#"{ "items": {} }"#,
            "42",
            r#"[{ "id": "ws-1" }]"#,
        ];
        for case in cases {
            let result: Result<Vec<SourceRecord>, _> = decode_catalog("sources.json", case);
            match result {
                Err(ConnectorError::Decode { origin, .. }) => assert_eq!(origin, "sources.json"),
                other => panic!("{} decoded to {:?}", case, other),
            }
        }
    }
}
