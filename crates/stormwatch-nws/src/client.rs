//! HTTP client for the NWS `api.weather.gov` REST API.
//!
//! Wraps `reqwest` with the headers the API requires (a descriptive
//! `User-Agent` and the GeoJSON `Accept` type), typed status handling and
//! retry on transient failures.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::NwsError;
use crate::retry::retry_with_backoff;
use crate::types::{AlertCollection, AlertFeature, ZoneFeature};
use crate::zone::ZoneRef;

const DEFAULT_BASE_URL: &str = "https://api.weather.gov/";
const GEO_JSON: &str = "application/geo+json";

/// Client for the NWS alert and zone endpoints.
///
/// Use [`NwsClient::new`] for production or [`NwsClient::with_base_url`] to
/// point at a mock server in tests.
pub struct NwsClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl NwsClient {
    /// Creates a new client pointed at the production NWS API.
    ///
    /// # Errors
    ///
    /// Returns [`NwsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        user_agent: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, NwsError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            user_agent,
            timeout_secs,
            max_retries,
            backoff_base_ms,
        )
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NwsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NwsError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, NwsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends below the base
        // path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| NwsError::InvalidUrl(format!("base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches all currently active, actual alert messages.
    ///
    /// Features that fail to decode are logged and skipped; the rest are
    /// returned in API order.
    ///
    /// # Errors
    ///
    /// - [`NwsError::Http`] / [`NwsError::UnexpectedStatus`] /
    ///   [`NwsError::RateLimited`] on transport failure after retries.
    /// - [`NwsError::Deserialize`] if the body is not a feature collection.
    pub async fn fetch_active_alerts(&self) -> Result<Vec<AlertFeature>, NwsError> {
        let url = self.alerts_url()?;
        let body = self.request_json(&url).await?;

        let collection: AlertCollection =
            serde_json::from_value(body).map_err(|e| NwsError::Deserialize {
                context: "alerts/active".to_string(),
                source: e,
            })?;

        let total = collection.features.len();
        let alerts: Vec<AlertFeature> = collection
            .features
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<AlertFeature>(raw) {
                Ok(alert) => Some(alert),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable alert feature");
                    None
                }
            })
            .collect();

        tracing::debug!(total, decoded = alerts.len(), "fetched active alerts");
        Ok(alerts)
    }

    /// Looks up the boundary geometry of the zone referenced by `zone_url`.
    ///
    /// Only the `zones/{type}/{id}` part of `zone_url` is used; the request
    /// always goes to this client's base URL. Returns `Ok(None)` when the
    /// zone exists but has no geometry.
    ///
    /// # Errors
    ///
    /// - [`NwsError::InvalidZoneRef`] if `zone_url` has no zone segments.
    /// - [`NwsError::NotFound`] for unknown zones.
    /// - Transport and decode errors as for [`Self::fetch_active_alerts`].
    pub async fn fetch_zone_geometry(
        &self,
        zone_url: &str,
    ) -> Result<Option<geojson::Geometry>, NwsError> {
        let zone =
            ZoneRef::parse(zone_url).ok_or_else(|| NwsError::InvalidZoneRef(zone_url.to_string()))?;
        let url = self.zone_url(&zone)?;
        let body = self.request_json(&url).await?;

        let feature: ZoneFeature =
            serde_json::from_value(body).map_err(|e| NwsError::Deserialize {
                context: zone.path(),
                source: e,
            })?;
        Ok(feature.geometry)
    }

    fn alerts_url(&self) -> Result<Url, NwsError> {
        let mut url = self
            .base_url
            .join("alerts/active")
            .map_err(|e| NwsError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("status", "actual")
            .append_pair("message_type", "alert");
        Ok(url)
    }

    fn zone_url(&self, zone: &ZoneRef) -> Result<Url, NwsError> {
        self.base_url
            .join(&zone.path())
            .map_err(|e| NwsError::InvalidUrl(e.to_string()))
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, NwsError> {
        get_json(
            &self.client,
            url,
            GEO_JSON,
            self.max_retries,
            self.backoff_base_ms,
        )
        .await
    }
}

/// Sends a GET request with retry, maps error statuses to typed errors,
/// and parses the response body as JSON.
pub(crate) async fn get_json(
    client: &Client,
    url: &Url,
    accept: &str,
    max_retries: u32,
    backoff_base_ms: u64,
) -> Result<serde_json::Value, NwsError> {
    retry_with_backoff(max_retries, backoff_base_ms, || async move {
        let response = client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NwsError::RateLimited {
                url: url.to_string(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(NwsError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(NwsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| NwsError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    })
    .await
}
