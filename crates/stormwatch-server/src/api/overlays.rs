use axum::{extract::State, Extension, Json};
use serde::Serialize;
use stormwatch_engine::presentation::{cone_style, AlertStyle};
use stormwatch_engine::{AlertSource, LocationSource};
use stormwatch_locator::StatusHistory;
use stormwatch_nws::RadarFrames;

use super::{map_upstream_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct ConesItem {
    pub style: AlertStyle,
    pub cones: geojson::FeatureCollection,
}

/// Current NHC forecast cones, fetched live.
pub(super) async fn hurricane_cones<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ConesItem>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let cones = state
        .feeds
        .overlays
        .fetch_hurricane_cones()
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ConesItem {
            style: cone_style(),
            cones,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Past radar frames with tile templates, oldest first.
pub(super) async fn radar_frames<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RadarFrames>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let radar = state
        .feeds
        .overlays
        .fetch_radar_frames()
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: radar,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// The persisted status history, keyed by store code.
pub(super) async fn status_history<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatusHistory>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let history = state.feeds.history.load().await.map_err(|e| {
        tracing::error!(error = %e, "failed to read status history");
        ApiError::new(req_id.0.clone(), "internal_error", e.to_string())
    })?;

    Ok(Json(ApiResponse {
        data: history,
        meta: ResponseMeta::new(req_id.0),
    }))
}
