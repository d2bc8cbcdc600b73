//! Alert enrichment: fetch active alerts, keep allow-listed event types, and
//! resolve missing geometry from the alerts' forecast zones.

use std::collections::HashSet;
use std::future::Future;

use stormwatch_nws::{is_polygonal, AlertFeature, NwsError};

use crate::cache::{AlertCache, CachedAlerts};
use crate::error::EnrichError;

/// Event types kept by default.
pub const DEFAULT_ALLOWED_EVENTS: [&str; 26] = [
    "Fire Weather Watch",
    "Tornado Watch",
    "Flood Watch",
    "Tropical Storm Watch",
    "Hurricane Watch",
    "Storm Surge Watch",
    "Blizzard Warning",
    "Winter Storm Warning",
    "Ice Storm Warning",
    "Red Flag Warning",
    "Severe Thunderstorm Warning",
    "Tornado Warning",
    "Storm Warning",
    "Hurricane Force Wind Warning",
    "Flash Flood Warning",
    "Flood Warning",
    "Tropical Storm Warning",
    "Hurricane Warning",
    "Storm Surge Warning",
    "Extreme Wind Warning",
    "High Wind Warning",
    "Evacuation - Immediate",
    "Civil Emergency Message",
    "Shelter In Place Warning",
    "Radiological Hazard Warning",
    "Hazardous Materials Warning",
];

/// Upstream alert and zone lookups.
pub trait AlertSource: Send + Sync {
    fn fetch_active_alerts(
        &self,
    ) -> impl Future<Output = Result<Vec<AlertFeature>, NwsError>> + Send;

    fn fetch_zone_geometry(
        &self,
        zone_url: &str,
    ) -> impl Future<Output = Result<Option<geojson::Geometry>, NwsError>> + Send;
}

/// Produces the flat, fully-geometried alert collection and memoises it.
#[derive(Debug)]
pub struct AlertEnricher {
    allowed: HashSet<String>,
    cache: AlertCache,
}

impl Default for AlertEnricher {
    fn default() -> Self {
        Self::with_allowed_events(DEFAULT_ALLOWED_EVENTS)
    }
}

impl AlertEnricher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_allowed_events<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: events.into_iter().map(Into::into).collect(),
            cache: AlertCache::new(),
        }
    }

    #[must_use]
    pub fn is_allowed(&self, event: &str) -> bool {
        self.allowed.contains(event)
    }

    #[must_use]
    pub fn cache(&self) -> &AlertCache {
        &self.cache
    }

    /// Return the enriched alerts, from cache unless `force_reload` is set or
    /// the cache is empty.
    ///
    /// On a miss the active alerts are fetched, filtered to the allow-list and
    /// resolved one by one in input order. Alerts that end up without polygon
    /// geometry are dropped. The result is cached only if no newer fill or
    /// invalidation happened while this one ran.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Fetch`] if the active-alert list cannot be
    /// fetched. The cache is left untouched in that case. Zone lookup
    /// failures only drop the affected alert.
    pub async fn enrich<S: AlertSource>(
        &self,
        source: &S,
        force_reload: bool,
    ) -> Result<CachedAlerts, EnrichError> {
        if !force_reload {
            if let Some(cached) = self.cache.get() {
                tracing::debug!(alerts = cached.len(), "serving cached alerts");
                return Ok(cached);
            }
        }

        let ticket = self.cache.begin_fill();
        let raw = source.fetch_active_alerts().await?;
        let fetched = raw.len();

        let mut enriched = Vec::new();
        for feature in raw.iter().filter(|f| self.is_allowed(f.event())) {
            if let Some(resolved) = resolve_geometry(source, feature).await {
                enriched.push(resolved);
            }
        }

        tracing::info!(fetched, kept = enriched.len(), "alert enrichment complete");

        match self.cache.complete_fill(ticket, enriched.clone()) {
            Some(cached) => Ok(cached),
            None => Ok(CachedAlerts::new(enriched)),
        }
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }
}

/// A renderable copy of `feature`, or `None` if no polygon can be found.
///
/// Inline Polygon/MultiPolygon geometry is kept. Alerts without geometry try
/// their affected zones in listed order and take the first polygonal zone
/// boundary. Everything else is dropped.
async fn resolve_geometry<S: AlertSource>(source: &S, feature: &AlertFeature) -> Option<AlertFeature> {
    match &feature.geometry {
        Some(geometry) if is_polygonal(geometry) => return Some(feature.clone()),
        Some(_) => {
            tracing::debug!(event = feature.event(), "dropping alert with non-polygon geometry");
            return None;
        }
        None => {}
    }

    let zones = &feature.properties.affected_zones;
    if zones.is_empty() {
        tracing::debug!(event = feature.event(), "dropping alert without geometry or zones");
        return None;
    }

    for zone_url in zones {
        match source.fetch_zone_geometry(zone_url).await {
            Ok(Some(geometry)) if is_polygonal(&geometry) => {
                return Some(feature.with_geometry(geometry));
            }
            Ok(Some(_)) => {
                tracing::warn!(zone_url = %zone_url, "zone geometry is not a polygon; trying next zone");
            }
            Ok(None) => {
                tracing::debug!(zone_url = %zone_url, "zone has no geometry; trying next zone");
            }
            Err(e) => {
                tracing::warn!(zone_url = %zone_url, error = %e, "zone lookup failed; trying next zone");
            }
        }
    }

    tracing::warn!(
        event = feature.event(),
        zones = zones.len(),
        "no affected zone yielded geometry; dropping alert"
    );
    None
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
