//! Flight query error types.

use std::fmt;

use thiserror::Error;

use crate::responses::ErrorResponse;

/// A date-range rule that a caller-supplied range broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// The end date falls inside the staleness window.
    EndTooRecent,
    /// The start date is older than the lookback limit.
    StartTooFarBack,
    /// The start date is later than the end date.
    StartAfterEnd,
}

impl RangeViolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeViolation::EndTooRecent => "end too recent",
            RangeViolation::StartTooFarBack => "start too far back",
            RangeViolation::StartAfterEnd => "start after end",
        }
    }
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-correctable problems with the requested dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A date parameter is absent (while its partner is present) or unparseable.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Both dates parsed but the range breaks a policy rule.
    #[error("Invalid date range: {0}")]
    InvalidRange(RangeViolation),
}

/// The provider's response body did not match an accepted envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Body was not valid JSON.
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// Valid JSON of an unexpected shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::MalformedJson(err.to_string())
    }
}

/// Pipeline stage a query was in when it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Validating,
    Building,
    Fetching,
    Parsing,
    Done,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStage::Validating => "validating",
            QueryStage::Building => "building",
            QueryStage::Fetching => "fetching",
            QueryStage::Parsing => "parsing",
            QueryStage::Done => "done",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a flight query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Caller input was rejected before any network traffic.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider could not be reached, or the call timed out.
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// The provider answered with a non-success status.
    #[error("Upstream returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    /// The provider answered successfully with an unrecognized body.
    #[error("Upstream response could not be parsed: {0}")]
    Parse(#[from] ParseError),
}

impl QueryError {
    /// Stage in which the query failed.
    pub fn stage(&self) -> QueryStage {
        match self {
            QueryError::Validation(_) => QueryStage::Validating,
            QueryError::UpstreamTransport(_) | QueryError::UpstreamStatus { .. } => {
                QueryStage::Fetching
            }
            QueryError::Parse(_) => QueryStage::Parsing,
        }
    }

    /// Get the HTTP status code reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::Validation(_) => 400,
            QueryError::UpstreamTransport(_) => 502,
            QueryError::UpstreamStatus { .. } => 500,
            QueryError::Parse(_) => 500,
        }
    }

    /// Message safe to show the caller.
    ///
    /// Validation messages are returned verbatim; everything else is generic so
    /// upstream bodies and headers never leave the server.
    pub fn public_message(&self) -> String {
        match self {
            QueryError::Validation(e) => e.to_string(),
            QueryError::UpstreamTransport(_) => {
                "Flight provider could not be reached".to_string()
            }
            QueryError::UpstreamStatus { .. } => "Failed to fetch flights data".to_string(),
            QueryError::Parse(_) => "Flight provider returned an unrecognized response".to_string(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "validation",
            QueryError::UpstreamTransport(_) => "upstream_transport",
            QueryError::UpstreamStatus { .. } => "upstream_status",
            QueryError::Parse(_) => "parse",
        }
    }

    /// Convert to the caller-facing body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.public_message())
    }
}
