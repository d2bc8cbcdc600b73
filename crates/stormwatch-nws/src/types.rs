//! NWS API response types.
//!
//! Alerts arrive as a GeoJSON `FeatureCollection`. The collection is decoded
//! loosely (each feature as a raw `Value`) and every feature is then decoded
//! on its own, so one malformed alert cannot fail the whole list.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Envelope for `GET /alerts/active`.
#[derive(Debug, Deserialize)]
pub(crate) struct AlertCollection {
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

/// Envelope for `GET /zones/{type}/{id}`. Only the geometry is used.
#[derive(Debug, Deserialize)]
pub(crate) struct ZoneFeature {
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
}

/// One active alert.
///
/// `geometry` is `None` for alerts that only reference forecast zones; those
/// carry the zone URLs in [`AlertProperties::affected_zones`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFeature {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
    pub properties: AlertProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    /// Event type, e.g. `"Tornado Warning"`.
    pub event: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub area_desc: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub expires: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub affected_zones: Vec<String>,
}

impl AlertFeature {
    #[must_use]
    pub fn event(&self) -> &str {
        &self.properties.event
    }

    /// `true` when the alert already carries a Polygon or MultiPolygon.
    #[must_use]
    pub fn has_polygonal_geometry(&self) -> bool {
        self.geometry.as_ref().is_some_and(is_polygonal)
    }

    /// Clone this alert with `geometry` substituted.
    #[must_use]
    pub fn with_geometry(&self, geometry: geojson::Geometry) -> Self {
        let mut resolved = self.clone();
        resolved.geometry = Some(geometry);
        resolved
    }
}

/// `true` for the two geometry kinds an alert area can be drawn from.
#[must_use]
pub fn is_polygonal(geometry: &geojson::Geometry) -> bool {
    matches!(
        geometry.value,
        geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_)
    )
}
