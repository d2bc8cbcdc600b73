use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use stormwatch_engine::presentation::{alert_style, hazard_section, impact_section, AlertStyle};
use stormwatch_engine::{AlertSource, LocationSource};
use stormwatch_nws::AlertFeature;

use super::{map_upstream_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize, Default)]
pub(super) struct AlertsQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct AlertItem {
    pub id: Option<String>,
    pub event: String,
    pub headline: Option<String>,
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub expires: Option<DateTime<FixedOffset>>,
    pub web: Option<String>,
    pub instruction: Option<String>,
    pub hazard: Option<String>,
    pub impact: Option<String>,
    pub style: AlertStyle,
    pub geometry: Option<geojson::Geometry>,
}

impl From<&AlertFeature> for AlertItem {
    fn from(feature: &AlertFeature) -> Self {
        let props = &feature.properties;
        let description = props.description.as_deref().unwrap_or_default();
        Self {
            id: feature.id.clone(),
            event: props.event.clone(),
            headline: props.headline.clone(),
            area_desc: props.area_desc.clone(),
            severity: props.severity.clone(),
            expires: props.expires,
            web: props.web.clone(),
            instruction: props.instruction.clone(),
            hazard: hazard_section(description),
            impact: impact_section(description),
            style: alert_style(&props.event),
            geometry: feature.geometry.clone(),
        }
    }
}

/// Enriched alerts, served from cache unless `?refresh=true`.
pub(super) async fn list_alerts<A, L>(
    State(state): State<AppState<A, L>>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<ApiResponse<Vec<AlertItem>>>, ApiError>
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    let alerts = state
        .session
        .alerts(state.alerts.as_ref(), query.refresh)
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    let data = alerts.features.iter().map(AlertItem::from).collect();
    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
