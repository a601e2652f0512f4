//! Flight query handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};

use super::{error_response, run_query, DateQueryParams};
use crate::state::AppState;

/// GET /query?startDate=&endDate=
pub async fn query_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<DateQueryParams>,
) -> Response {
    match run_query(&state, &params).await {
        Ok(outcome) => Json(outcome.into_response()).into_response(),
        Err(e) => error_response(&e),
    }
}
