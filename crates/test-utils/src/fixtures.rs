//! Provider response fixtures.
//!
//! Bodies mirror what the flight-search endpoint has been seen to return.

use serde_json::{json, Value};

/// Locations around Oklahoma City used across tests.
pub mod places {
    /// Downtown Oklahoma City, the default map center.
    pub const OKC_DOWNTOWN: (f64, f64) = (35.4676, -97.5164);
    /// Will Rogers World Airport, ~12 km south-west of downtown.
    pub const OKC_AIRPORT: (f64, f64) = (35.3931, -97.6007);
    /// Edmond, ~20 km north of downtown.
    pub const EDMOND: (f64, f64) = (35.6528, -97.4781);
    /// Tulsa, ~160 km north-east.
    pub const TULSA: (f64, f64) = (36.1540, -95.9928);
}

/// One flight element as the provider sends it.
pub fn flight_json(id: &str, lat: f64, lon: f64) -> Value {
    json!({
        "flight_id": id,
        "takeoff": "2024-01-05T14:00:00Z",
        "landing": "2024-01-05T14:25:00Z",
        "takeoff_latitude": lat,
        "takeoff_longitude": lon,
        "vehicle_serial": "X10D-0001",
        "user_email": "pilot@okc.example",
        "has_telemetry": true
    })
}

/// A flight element carrying nothing but its id.
pub fn unlocated_flight_json(id: &str) -> Value {
    json!({ "id": id })
}

/// `{"data": {"flights": [...]}}`
pub fn nested_envelope(flights: Vec<Value>) -> Value {
    json!({ "data": { "flights": flights } })
}

/// `{"data": [...]}`
pub fn flat_envelope(flights: Vec<Value>) -> Value {
    json!({ "data": flights })
}

/// `{"data": {"flights": null}}`
pub fn null_flights_envelope() -> Value {
    json!({ "data": { "flights": null } })
}

/// Error body the provider returns with non-2xx statuses.
pub fn provider_error_body() -> Value {
    json!({
        "error": "Service temporarily unavailable",
        "request_id": "req-7f3a",
        "detail": "upstream maintenance window"
    })
}
