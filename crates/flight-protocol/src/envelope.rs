//! Provider envelope reconciliation.
//!
//! The provider has been seen returning flights either as
//! `{"data": {"flights": [...]}}` or as `{"data": [...]}`. [`Envelope`] names
//! each accepted shape; anything else is a [`ParseError`]. Elements are then
//! mapped field by field into [`FlightRecord`]s, dropping the ones that cannot
//! be keyed. Every other field is optional.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::ParseError;
use crate::types::FlightRecord;

/// Accepted response envelopes.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{"data": {"flights": [...]}}`
    Nested(Vec<Value>),
    /// `{"data": [...]}`
    Flat(Vec<Value>),
    /// `data` or `data.flights` absent or null.
    Empty,
}

impl Envelope {
    /// Identify which envelope `body` uses.
    pub fn classify(body: Value) -> Result<Self, ParseError> {
        let Value::Object(mut top) = body else {
            return Err(ParseError::UnexpectedShape(format!(
                "top-level {}",
                json_type(&body)
            )));
        };

        match top.remove("data") {
            None | Some(Value::Null) => Ok(Envelope::Empty),
            Some(Value::Array(items)) => Ok(Envelope::Flat(items)),
            Some(Value::Object(mut data)) => match data.remove("flights") {
                None | Some(Value::Null) => Ok(Envelope::Empty),
                Some(Value::Array(items)) => Ok(Envelope::Nested(items)),
                Some(other) => Err(ParseError::UnexpectedShape(format!(
                    "data.flights is {}",
                    json_type(&other)
                ))),
            },
            Some(other) => Err(ParseError::UnexpectedShape(format!(
                "data is {}",
                json_type(&other)
            ))),
        }
    }

    /// The raw flight elements, in provider order.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Envelope::Nested(items) | Envelope::Flat(items) => items,
            Envelope::Empty => Vec::new(),
        }
    }
}

/// Per-reason counts of elements left out of the canonical list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCounts {
    pub not_an_object: usize,
    pub missing_id: usize,
    pub duplicate_id: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.not_an_object + self.missing_id + self.duplicate_id
    }
}

/// Result of normalizing one provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFlights {
    /// Canonical records in provider order.
    pub records: Vec<FlightRecord>,
    /// Number of elements the provider returned, before any drops.
    pub returned_count: usize,
    pub dropped: DropCounts,
}

/// Normalize a raw response body.
pub fn normalize(body: &[u8]) -> Result<NormalizedFlights, ParseError> {
    let value: Value = serde_json::from_slice(body)?;
    normalize_value(value)
}

/// Normalize an already-decoded response body.
pub fn normalize_value(body: Value) -> Result<NormalizedFlights, ParseError> {
    let items = Envelope::classify(body)?.into_items();
    let returned_count = items.len();

    let mut records = Vec::with_capacity(items.len());
    let mut dropped = DropCounts::default();
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        let Value::Object(fields) = item else {
            dropped.not_an_object += 1;
            continue;
        };

        let Some(record) = map_record(&fields) else {
            dropped.missing_id += 1;
            continue;
        };

        if !seen.insert(record.id.clone()) {
            dropped.duplicate_id += 1;
            continue;
        }

        records.push(record);
    }

    Ok(NormalizedFlights {
        records,
        returned_count,
        dropped,
    })
}

/// Map one element; `None` when it carries no usable id.
fn map_record(fields: &Map<String, Value>) -> Option<FlightRecord> {
    let id = first(fields, &["id", "flight_id"]).and_then(id_value)?;

    Some(FlightRecord {
        id,
        takeoff_time: first(fields, &["takeoff", "takeoff_time"]).and_then(timestamp_value),
        landing_time: first(fields, &["landing", "landing_time"]).and_then(timestamp_value),
        takeoff_latitude: first(fields, &["takeoff_latitude"])
            .and_then(number_value)
            .filter(|lat| lat.abs() <= 90.0),
        takeoff_longitude: first(fields, &["takeoff_longitude"])
            .and_then(number_value)
            .filter(|lon| lon.abs() <= 180.0),
        vehicle_serial: first(fields, &["vehicle_serial"]).and_then(string_value),
        operator_email: first(fields, &["user_email", "operator_email"]).and_then(string_value),
        has_telemetry: matches!(fields.get("has_telemetry"), Some(Value::Bool(true))),
    })
}

/// First non-null value among `keys`.
fn first<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // Try full datetime with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Without offset, assume UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ndt.and_utc());
        }
    }

    None
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_classify_shapes() {
        assert_eq!(
            Envelope::classify(json!({"data": {"flights": [1]}})).unwrap(),
            Envelope::Nested(vec![json!(1)])
        );
        assert_eq!(
            Envelope::classify(json!({"data": [1]})).unwrap(),
            Envelope::Flat(vec![json!(1)])
        );
        assert_eq!(Envelope::classify(json!({"data": null})).unwrap(), Envelope::Empty);
        assert_eq!(Envelope::classify(json!({"data": {}})).unwrap(), Envelope::Empty);
        assert_eq!(Envelope::classify(json!({})).unwrap(), Envelope::Empty);
    }

    #[test]
    fn test_classify_rejects_unknown_shapes() {
        assert!(matches!(
            Envelope::classify(json!([{"id": "f1"}])),
            Err(ParseError::UnexpectedShape(msg)) if msg == "top-level an array"
        ));
        assert!(matches!(
            Envelope::classify(json!({"data": "oops"})),
            Err(ParseError::UnexpectedShape(_))
        ));
        assert!(matches!(
            Envelope::classify(json!({"data": {"flights": {"id": "f1"}}})),
            Err(ParseError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_field_mapping_with_aliases() {
        let out = normalize_value(json!({"data": [{
            "flight_id": "abc",
            "takeoff": "2024-01-05T14:00:00Z",
            "landing": "2024-01-05T14:20:00+00:00",
            "takeoff_latitude": "35.46",
            "takeoff_longitude": -97.51,
            "vehicle_serial": "X10-001",
            "user_email": "pilot@example.gov",
            "has_telemetry": true
        }]}))
        .unwrap();

        let record = &out.records[0];
        assert_eq!(record.id, "abc");
        assert_eq!(record.takeoff_time, Some(Utc.with_ymd_and_hms(2024, 1, 5, 14, 0, 0).unwrap()));
        assert_eq!(record.landing_time, Some(Utc.with_ymd_and_hms(2024, 1, 5, 14, 20, 0).unwrap()));
        assert_eq!(record.takeoff_latitude, Some(35.46));
        assert_eq!(record.takeoff_longitude, Some(-97.51));
        assert_eq!(record.vehicle_serial.as_deref(), Some("X10-001"));
        assert_eq!(record.operator_email.as_deref(), Some("pilot@example.gov"));
        assert!(record.has_telemetry);
    }

    #[test]
    fn test_numeric_id_and_naive_timestamp() {
        let out = normalize_value(json!({"data": [{"id": 42, "takeoff_time": "2024-01-05 08:15:00"}]})).unwrap();
        assert_eq!(out.records[0].id, "42");
        assert_eq!(out.records[0].takeoff_time, Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 15, 0).unwrap()));
    }

    #[test]
    fn test_bad_coordinates_become_absent() {
        let out = normalize_value(json!({"data": [
            {"id": "a", "takeoff": "2024-01-05T14:00:00Z", "takeoff_latitude": "north", "takeoff_longitude": -97.5},
            {"id": "b", "takeoff": "2024-01-05T14:00:00Z", "takeoff_latitude": 135.0, "takeoff_longitude": -97.5},
            {"id": "c", "takeoff": "2024-01-05T14:00:00Z", "takeoff_latitude": true, "takeoff_longitude": null}
        ]}))
        .unwrap();

        assert_eq!(out.records.len(), 3);
        for record in &out.records {
            assert!(record.takeoff_latitude.is_none());
            assert!(!record.is_located());
        }
        assert_eq!(out.records[0].takeoff_longitude, Some(-97.5));
    }

    #[test]
    fn test_drop_reasons_are_counted() {
        let out = normalize_value(json!({"data": {"flights": [
            "not an object",
            {"takeoff": "2024-01-05T14:00:00Z"},
            {"id": "  ", "takeoff": "2024-01-05T14:00:00Z"},
            {"id": "ok", "takeoff": "2024-01-05T14:00:00Z"},
            {"id": "ok", "takeoff": "2024-01-06T14:00:00Z"}
        ]}}))
        .unwrap();

        assert_eq!(out.returned_count, 5);
        assert_eq!(out.records.len(), 1);
        assert_eq!(
            out.dropped,
            DropCounts {
                not_an_object: 1,
                missing_id: 2,
                duplicate_id: 1,
            }
        );
        assert_eq!(out.dropped.total(), 4);
        // First occurrence of a duplicated id wins.
        assert_eq!(out.records[0].takeoff_time, Some(Utc.with_ymd_and_hms(2024, 1, 5, 14, 0, 0).unwrap()));
    }

    #[test]
    fn test_missing_or_unreadable_takeoff_is_kept() {
        let out = normalize_value(json!({"data": [
            {"id": "x"},
            {"id": "y", "takeoff": "not a time"},
            {"id": "z", "takeoff": 1704463200}
        ]}))
        .unwrap();

        assert_eq!(out.records.len(), 3);
        assert_eq!(out.dropped.total(), 0);
        assert_eq!(out.records[0].takeoff_time, None);
        assert_eq!(out.records[1].takeoff_time, None);
        assert_eq!(out.records[2].takeoff_time, Some(Utc.with_ymd_and_hms(2024, 1, 5, 14, 0, 0).unwrap()));
    }

    #[test]
    fn test_malformed_bytes() {
        assert!(matches!(normalize(b"<html>502</html>"), Err(ParseError::MalformedJson(_))));
    }
}
