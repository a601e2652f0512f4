//! Flight query protocol.
//!
//! Types and pure functions for turning a caller's date range into a single
//! upstream flight-search request and turning the provider's response into
//! canonical flight records.
//!
//! # Pipeline
//!
//! - [`DateRangePolicy`] validates or defaults the requested window
//! - [`UpstreamQueryBuilder`] derives the provider request from it
//! - [`normalize`] reconciles the provider envelope into [`FlightRecord`]s
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use flight_protocol::{ApiCredential, DateRangePolicy, UpstreamQueryBuilder};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let range = DateRangePolicy::default().resolve(None, None, today).unwrap();
//!
//! let credential = ApiCredential::new("token").unwrap();
//! let request = UpstreamQueryBuilder::new("https://api.skydio.com/api/v0").build(&range, &credential);
//! assert!(request.url.contains("per_page=500"));
//! ```

pub mod dates;
pub mod envelope;
pub mod errors;
pub mod request;
pub mod responses;
pub mod types;

// Re-export commonly used types
pub use dates::{DateRange, DateRangePolicy};
pub use envelope::{normalize, normalize_value, DropCounts, Envelope, NormalizedFlights};
pub use errors::{ParseError, QueryError, QueryStage, RangeViolation, ValidationError};
pub use request::{ApiCredential, HeaderValue, Method, UpstreamQueryBuilder, UpstreamRequest};
pub use responses::{ErrorResponse, QueryResponse};
pub use types::{Coordinate, FlightRecord};

/// Fixed pagination used for every upstream query.
pub mod paging {
    /// Number of flights requested per upstream page.
    pub const PAGE_SIZE: u32 = 500;
    /// Only the first page is ever requested.
    pub const PAGE_NUMBER: u32 = 1;
}

/// Query parameter names accepted from callers.
pub mod params {
    pub const START_DATE: &str = "startDate";
    pub const END_DATE: &str = "endDate";
    pub const ZOOM: &str = "zoom";
}
