//! Caller-facing response bodies.

use serde::{Deserialize, Serialize};

use crate::types::FlightRecord;

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of a successful flight query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub records: Vec<FlightRecord>,

    /// True when the provider filled the whole page, so more flights may exist.
    pub truncated: bool,

    pub page_size: u32,
    pub returned_count: usize,
    pub dropped_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_string(&ErrorResponse::new("Server error")).unwrap();
        assert_eq!(json, r#"{"error":"Server error"}"#);
    }

    #[test]
    fn test_query_response_field_names() {
        let response = QueryResponse {
            records: vec![],
            truncated: false,
            page_size: 500,
            returned_count: 0,
            dropped_count: 0,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert!(json["records"].as_array().unwrap().is_empty());
        assert_eq!(json["truncated"], false);
        assert_eq!(json["pageSize"], 500);
        assert_eq!(json["returnedCount"], 0);
        assert_eq!(json["droppedCount"], 0);
    }
}
