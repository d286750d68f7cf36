//! Default source kinds embedded at compile time
//!
//! Every `*.json` file under the crate's `kinds/` directory is one
//! [`SourceTypeRecord`].

use include_dir::{include_dir, Dir};

use crate::{SchemaError, SourceTypeRecord};

static KINDS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/kinds");

/// Parse every embedded source kind, sorted by id
pub fn default_kinds() -> Result<Vec<SourceTypeRecord>, SchemaError> {
    let mut kinds = Vec::new();

    for file in KINDS_DIR.files() {
        let path = file.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let origin = path.display().to_string();
        let text = file.contents_utf8().ok_or_else(|| SchemaError::ParseError {
            origin: origin.clone(),
            message: "not valid UTF-8".into(),
        })?;
        kinds.push(parse_kind(&origin, text)?);
    }

    kinds.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(kinds)
}

/// Parse and validate a single source kind document
pub fn parse_kind(origin: &str, text: &str) -> Result<SourceTypeRecord, SchemaError> {
    let record: SourceTypeRecord =
        serde_json::from_str(text).map_err(|e| SchemaError::ParseError {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
    record.validate()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_kinds_parse() {
        let kinds = default_kinds().unwrap();
        let ids: Vec<&str> = kinds.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, ["air_quality", "water_level", "weather_station"]);
    }

    #[test]
    fn weather_station_channels() {
        let kinds = default_kinds().unwrap();
        let station = kinds.iter().find(|k| k.id == "weather_station").unwrap();
        assert_eq!(station.channels.len(), 7);
        assert!(station.channels.iter().all(|c| c.frequency_hz > 0.0));
    }

    #[test]
    fn parse_errors_name_their_origin() {
        let err = parse_kind("inline", "{").unwrap_err();
        assert!(err.to_string().contains("inline"));
    }
}
