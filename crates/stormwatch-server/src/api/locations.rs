use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stormwatch_engine::presentation::{marker_style, state_time_zone, MarkerStyle};
use stormwatch_engine::{
    AlertSource, ClassifiedLocation, LocationSource, PinGroup, Snapshot, Summary,
};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize, Default)]
pub(super) struct LocationsQuery {
    pub group: Option<String>,
}

/// One map pin.
#[derive(Debug, Serialize)]
pub(super) struct PinItem {
    pub store_code: String,
    pub business_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: String,
    pub group: PinGroup,
    pub is_closed: bool,
    pub is_storm_related: bool,
    pub last_changed: Option<DateTime<Utc>>,
    pub time_zone: &'static str,
    pub marker: MarkerStyle,
}

impl From<&ClassifiedLocation> for PinItem {
    fn from(item: &ClassifiedLocation) -> Self {
        let loc = &item.location;
        Self {
            store_code: loc.store_code.clone(),
            business_name: loc.business_name.clone(),
            address: loc.address.clone(),
            city: loc.city.clone(),
            state: loc.state.clone(),
            postal_code: loc.postal_code.clone(),
            latitude: loc.latitude,
            longitude: loc.longitude,
            status: loc.status.code().to_string(),
            group: item.group,
            is_closed: item.classification.is_closed,
            is_storm_related: item.classification.is_storm_related,
            last_changed: loc.last_changed,
            time_zone: state_time_zone(&loc.state),
            marker: marker_style(item.group),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SummaryItem {
    #[serde(flatten)]
    pub summary: Summary,
    pub alert_count: usize,
    pub refreshed_at: DateTime<Utc>,
}

fn current_snapshot<A, L>(state: &AppState<A, L>, req_id: &str) -> Result<Snapshot, ApiError> {
    state.session.snapshot().ok_or_else(|| {
        ApiError::new(
            req_id,
            "not_ready",
            "no refresh has completed yet; try again shortly",
        )
    })
}

/// Classified stores from the latest refresh, optionally filtered by
/// `?group=open|closed|storm|unknown`.
pub(super) async fn list_locations<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<ApiResponse<Vec<PinItem>>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let group = query
        .group
        .as_deref()
        .map(str::parse::<PinGroup>)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e))?;

    let snapshot = current_snapshot(&state, &req_id.0)?;
    let data = snapshot
        .locations
        .iter()
        .filter(|l| group.is_none_or(|g| l.group == g))
        .map(PinItem::from)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_summary<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SummaryItem>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let snapshot = current_snapshot(&state, &req_id.0)?;
    Ok(Json(ApiResponse {
        data: SummaryItem {
            summary: snapshot.summary,
            alert_count: snapshot.alerts.len(),
            refreshed_at: snapshot.refreshed_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
