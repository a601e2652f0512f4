//! HTTP request handlers for the flight API.

pub mod clusters;
pub mod health;
pub mod map;
pub mod query;

use std::time::Instant;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flight_protocol::{ErrorResponse, QueryError};
use serde::Deserialize;
use tracing::warn;

use crate::metrics;
use crate::service::QueryOutcome;
use crate::state::AppState;

/// Date parameters shared by `/query` and `/clusters`.
#[derive(Debug, Default, Deserialize)]
pub struct DateQueryParams {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,

    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Run one flight query under the configured deadline and record metrics.
pub(crate) async fn run_query(
    state: &AppState,
    params: &DateQueryParams,
) -> Result<QueryOutcome, QueryError> {
    let started = Instant::now();
    let deadline = state.query_timeout();

    let query = state.query_service.execute(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        state.today(),
    );

    let result = match tokio::time::timeout(deadline, query).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_secs = deadline.as_secs(), "Flight query deadline exceeded");
            Err(QueryError::UpstreamTransport(format!(
                "no response within {}s",
                deadline.as_secs()
            )))
        }
    };

    let elapsed = started.elapsed();
    match &result {
        Ok(outcome) => {
            metrics::record_query("ok", elapsed);
            metrics::record_dropped(outcome.dropped.total());
            if outcome.truncated {
                metrics::record_truncated();
            }
        }
        Err(e) => metrics::record_query(e.kind(), elapsed),
    }

    result
}

/// JSON error body with the status for the error's class.
pub(crate) fn error_response(err: &QueryError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_response())).into_response()
}

/// 400 with a caller-facing message.
pub(crate) fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}
