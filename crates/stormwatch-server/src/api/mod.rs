mod alerts;
mod locations;
mod overlays;
mod refresh;

use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stormwatch_engine::{AlertSource, DashboardSession, LocationSource};
use stormwatch_locator::StatusHistoryStore;
use stormwatch_nws::OverlayClient;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Pass-through feeds served as-is, outside the refresh cycle.
pub struct Feeds {
    pub overlays: OverlayClient,
    pub history: StatusHistoryStore,
}

/// Shared handler state: one dashboard session, the sources it refreshes
/// from, and the pass-through feeds.
pub struct AppState<A, L> {
    pub session: Arc<DashboardSession>,
    pub alerts: Arc<A>,
    pub locations: Arc<L>,
    pub feeds: Arc<Feeds>,
}

impl<A, L> AppState<A, L> {
    pub fn new(session: DashboardSession, alerts: A, locations: L, feeds: Feeds) -> Self {
        Self {
            session: Arc::new(session),
            alerts: Arc::new(alerts),
            locations: Arc::new(locations),
            feeds: Arc::new(feeds),
        }
    }
}

impl<A, L> Clone for AppState<A, L> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            alerts: Arc::clone(&self.alerts),
            locations: Arc::clone(&self.locations),
            feeds: Arc::clone(&self.feeds),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "not_ready" => StatusCode::SERVICE_UNAVAILABLE,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Log an upstream failure and turn it into a `502` body.
pub(super) fn map_upstream_error(request_id: String, error: &dyn std::error::Error) -> ApiError {
    tracing::error!(error = %error, "upstream request failed");
    ApiError::new(request_id, "upstream_error", error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            REQUEST_ID_HEADER,
        ])
}

pub fn build_app<A, L>(state: AppState<A, L>) -> Router
where
    A: AlertSource + 'static,
    L: LocationSource + 'static,
{
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/alerts", get(alerts::list_alerts::<A, L>))
        .route("/api/v1/locations", get(locations::list_locations::<A, L>))
        .route("/api/v1/summary", get(locations::get_summary::<A, L>))
        .route("/api/v1/refresh", post(refresh::trigger_refresh::<A, L>))
        .route(
            "/api/v1/hurricane-cones",
            get(overlays::hurricane_cones::<A, L>),
        )
        .route("/api/v1/radar-frames", get(overlays::radar_frames::<A, L>))
        .route(
            "/api/v1/status-history",
            get(overlays::status_history::<A, L>),
        )
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
