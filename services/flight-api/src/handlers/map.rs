//! Initial map view for front-ends.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use chrono::NaiveDate;
use flight_protocol::Coordinate;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub title: String,
    pub notice: String,
    pub center: Coordinate,
    pub zoom: u32,
    pub tile_url: String,
    pub attribution: String,
    pub date_bounds: DateBounds,
}

/// Dates a caller may pick without being rejected.
#[derive(Debug, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// GET /map
pub async fn map_handler(Extension(state): Extension<Arc<AppState>>) -> Json<MapResponse> {
    let map = &state.config.map;
    let policy = state.query_service.policy();
    let today = state.today();

    Json(MapResponse {
        title: map.title.clone(),
        notice: map.notice.clone(),
        center: Coordinate::new(map.center_lat, map.center_lon),
        zoom: map.zoom,
        tile_url: map.tile_url.clone(),
        attribution: map.attribution.clone(),
        date_bounds: DateBounds {
            min: policy.earliest_start(today),
            max: policy.latest_end(today),
        },
    })
}
