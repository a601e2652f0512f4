//! Clustered flight markers for one zoom level.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use clustering::ClusterGroup;
use flight_protocol::params;
use serde::{Deserialize, Serialize};

use super::{bad_request, error_response, run_query, DateQueryParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClusterQueryParams {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,

    #[serde(rename = "endDate")]
    pub end_date: Option<String>,

    pub zoom: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResponse {
    pub clusters: Vec<ClusterGroup>,
    pub unlocated_count: usize,
    pub truncated: bool,
    pub zoom: u32,
}

/// GET /clusters?startDate=&endDate=&zoom=
pub async fn clusters_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ClusterQueryParams>,
) -> Response {
    let zoom = match params.zoom.as_deref().map(str::trim) {
        None | Some("") => state.config.map.zoom,
        Some(raw) => match raw.parse::<u32>() {
            Ok(zoom) => zoom,
            Err(_) => {
                return bad_request(format!("Invalid parameter value for '{}'", params::ZOOM))
            }
        },
    };

    let dates = DateQueryParams {
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let outcome = match run_query(&state, &dates).await {
        Ok(outcome) => outcome,
        Err(e) => return error_response(&e),
    };

    let set = state.clusterer.cluster(&outcome.records, zoom);
    tracing::debug!(
        zoom = set.zoom,
        groups = set.groups.len(),
        unlocated = set.unlocated,
        "Clustered flights"
    );

    Json(ClusterResponse {
        clusters: set.groups,
        unlocated_count: set.unlocated,
        truncated: outcome.truncated,
        zoom: set.zoom,
    })
    .into_response()
}
