//! Canonical flight types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// One flight, independent of the provider's response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Provider flight identifier, unique within one result set.
    pub id: String,

    /// Takeoff instant, when the provider reports a readable one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeoff_time: Option<DateTime<Utc>>,

    /// Landing instant, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_time: Option<DateTime<Utc>>,

    /// Takeoff latitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeoff_latitude: Option<f64>,

    /// Takeoff longitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeoff_longitude: Option<f64>,

    /// Serial number of the aircraft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_serial: Option<String>,

    /// Email of the pilot account that flew the mission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_email: Option<String>,

    /// Whether the provider holds telemetry for this flight.
    #[serde(default)]
    pub has_telemetry: bool,
}

impl FlightRecord {
    /// Takeoff position, present only when both coordinates are known.
    pub fn takeoff_position(&self) -> Option<Coordinate> {
        match (self.takeoff_latitude, self.takeoff_longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }

    /// Whether this record can be placed on a map.
    pub fn is_located(&self) -> bool {
        self.takeoff_position().is_some()
    }
}
