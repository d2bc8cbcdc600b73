use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stormwatch_engine::{AlertSource, LocationSource, RefreshOutcome, Summary};

use super::{map_upstream_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct RefreshItem {
    pub status: &'static str,
    pub summary: Option<Summary>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Drop cached alerts and run a full refresh now.
pub(super) async fn trigger_refresh<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshItem>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    state.session.invalidate_alerts();
    let outcome = state
        .session
        .refresh(state.alerts.as_ref(), state.locations.as_ref(), true)
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    let data = match outcome {
        RefreshOutcome::Applied(snapshot) => RefreshItem {
            status: "applied",
            summary: Some(snapshot.summary),
            refreshed_at: Some(snapshot.refreshed_at),
        },
        RefreshOutcome::Superseded => RefreshItem {
            status: "superseded",
            summary: None,
            refreshed_at: None,
        },
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
