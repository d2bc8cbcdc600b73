//! Forecast-zone references found in an alert's `affectedZones` list.

use regex::Regex;

/// A parsed `.../zones/{zone_type}/{zone_id}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRef {
    pub zone_type: String,
    pub zone_id: String,
}

impl ZoneRef {
    /// Extract the zone type and id from an affected-zone URL.
    ///
    /// Returns `None` when the URL has no `zones/{type}/{id}` segment pair.
    #[must_use]
    pub fn parse(zone_url: &str) -> Option<Self> {
        let re = Regex::new(r"zones/([^/?#]+)/([^/?#]+)").expect("valid regex");
        let caps = re.captures(zone_url)?;
        Some(Self {
            zone_type: caps.get(1)?.as_str().to_string(),
            zone_id: caps.get(2)?.as_str().to_string(),
        })
    }

    /// Path of this zone relative to the API root.
    #[must_use]
    pub fn path(&self) -> String {
        format!("zones/{}/{}", self.zone_type, self.zone_id)
    }
}
