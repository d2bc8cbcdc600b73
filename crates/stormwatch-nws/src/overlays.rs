//! Map overlay feeds: the National Hurricane Center forecast-cone layer and
//! the RainViewer radar frame index.
//!
//! Both are plain JSON GETs with the same status handling and retry policy
//! as the alert endpoints.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::client::get_json;
use crate::error::NwsError;

pub const DEFAULT_HURRICANE_CONES_URL: &str = "https://mapservices.weather.noaa.gov/tropical/rest/services/tropical/NHC_tropical_weather_summary/MapServer/7/query?where=1%3D1&outFields=*&f=geojson";
pub const DEFAULT_RADAR_MAPS_URL: &str = "https://api.rainviewer.com/public/weather-maps.json";

/// Tile size, colour scheme, and smooth/snow flags appended to a frame path.
const RADAR_TILE_SUFFIX: &str = "/256/{z}/{x}/{y}/2/1_1.png";

/// One past radar frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarFrame {
    /// Unix timestamp of the scan.
    pub time: i64,
    pub path: String,
    /// Slippy-map template with `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url: String,
}

/// Past radar frames, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarFrames {
    pub host: String,
    pub frames: Vec<RadarFrame>,
}

impl RadarFrames {
    #[must_use]
    pub fn latest(&self) -> Option<&RadarFrame> {
        self.frames.last()
    }
}

#[derive(Deserialize)]
struct WeatherMaps {
    host: String,
    #[serde(default)]
    radar: Option<RadarSection>,
}

#[derive(Deserialize)]
struct RadarSection {
    #[serde(default)]
    past: Vec<RawFrame>,
}

#[derive(Deserialize)]
struct RawFrame {
    time: i64,
    path: String,
}

/// Client for the hurricane-cone and radar overlay feeds.
pub struct OverlayClient {
    client: Client,
    cones_url: Url,
    radar_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl OverlayClient {
    /// # Errors
    ///
    /// Returns [`NwsError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`NwsError::InvalidUrl`] if either feed URL does not parse.
    pub fn new(
        cones_url: &str,
        radar_url: &str,
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

        Ok(Self {
            client,
            cones_url: parse_url(cones_url)?,
            radar_url: parse_url(radar_url)?,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Current forecast cones as GeoJSON. An empty collection means no
    /// active tropical systems.
    ///
    /// # Errors
    ///
    /// Transport errors after retries, or [`NwsError::Deserialize`] if the
    /// body is not a feature collection (the map server reports query
    /// errors with a `200` and an `error` object).
    pub async fn fetch_hurricane_cones(&self) -> Result<geojson::FeatureCollection, NwsError> {
        let body = get_json(
            &self.client,
            &self.cones_url,
            "application/geo+json, application/json",
            self.max_retries,
            self.backoff_base_ms,
        )
        .await?;

        let cones: geojson::FeatureCollection =
            serde_json::from_value(body).map_err(|e| NwsError::Deserialize {
                context: "hurricane cones".to_string(),
                source: e,
            })?;
        tracing::debug!(cones = cones.features.len(), "fetched hurricane cones");
        Ok(cones)
    }

    /// Past radar frames with ready-to-use tile templates.
    ///
    /// # Errors
    ///
    /// Transport errors after retries, or [`NwsError::Deserialize`] if the
    /// index has no `host`.
    pub async fn fetch_radar_frames(&self) -> Result<RadarFrames, NwsError> {
        let body = get_json(
            &self.client,
            &self.radar_url,
            "application/json",
            self.max_retries,
            self.backoff_base_ms,
        )
        .await?;

        let maps: WeatherMaps =
            serde_json::from_value(body).map_err(|e| NwsError::Deserialize {
                context: "radar weather maps".to_string(),
                source: e,
            })?;
        Ok(radar_frames(maps))
    }
}

fn radar_frames(maps: WeatherMaps) -> RadarFrames {
    let host = maps.host.trim_end_matches('/').to_string();
    let mut frames: Vec<RadarFrame> = maps
        .radar
        .map(|radar| radar.past)
        .unwrap_or_default()
        .into_iter()
        .map(|raw| RadarFrame {
            tile_url: format!("{host}{}{RADAR_TILE_SUFFIX}", raw.path),
            time: raw.time,
            path: raw.path,
        })
        .collect();
    frames.sort_by_key(|frame| frame.time);
    RadarFrames { host, frames }
}

fn parse_url(raw: &str) -> Result<Url, NwsError> {
    Url::parse(raw).map_err(|e| NwsError::InvalidUrl(format!("'{raw}': {e}")))
}
