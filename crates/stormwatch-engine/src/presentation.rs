//! Display attributes derived from classifications and alerts. Everything
//! here is a pure function of its input.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::classify::PinGroup;

pub const DEFAULT_ALERT_COLOR: &str = "#999999";
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub weight: u32,
}

#[must_use]
pub fn marker_style(group: PinGroup) -> MarkerStyle {
    let (color, radius) = match group {
        PinGroup::Open => ("#00FF00", 1),
        PinGroup::Closed => ("#FF00FF", 1),
        PinGroup::Storm => ("#FF0000", 5),
        PinGroup::Unknown => (DEFAULT_ALERT_COLOR, 1),
    };
    MarkerStyle {
        radius,
        color,
        fill_color: color,
        fill_opacity: 0.6,
        weight: 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub weight: u32,
    /// Urgent warnings are drawn flashing.
    pub flashing: bool,
}

#[must_use]
pub fn alert_style(event: &str) -> AlertStyle {
    let color = alert_color(event);
    AlertStyle {
        color,
        fill_color: color,
        fill_opacity: 0.3,
        weight: 2,
        flashing: is_flashing(event),
    }
}

/// Outline and fill for hurricane forecast cones.
#[must_use]
pub fn cone_style() -> AlertStyle {
    AlertStyle {
        color: "#FF4500",
        fill_color: "#FFA500",
        fill_opacity: 0.2,
        weight: 2,
        flashing: false,
    }
}

/// Fill colour for an alert event type; [`DEFAULT_ALERT_COLOR`] when the
/// event has no assigned colour.
#[must_use]
pub fn alert_color(event: &str) -> &'static str {
    match event {
        "Fire Weather Watch" | "Evacuation - Immediate" => "#DC143C",
        "Tornado Watch" => "#FF8C00",
        "Flood Watch" | "Winter Storm Warning" | "Flood Warning" => "#1E90FF",
        "Tropical Storm Watch" => "#20B2AA",
        "Hurricane Watch" => "#FFA500",
        "Storm Surge Watch" => "#FFB6C1",
        "Blizzard Warning" => "#FF1493",
        "Ice Storm Warning" => "#6A5ACD",
        "Red Flag Warning" => "#B22222",
        "Severe Thunderstorm Warning" => "#FF4500",
        "Tornado Warning" => "#FF0000",
        "Storm Warning" => "#A52A2A",
        "Hurricane Force Wind Warning" => "#800000",
        "Flash Flood Warning" => "#00CED1",
        "Tropical Storm Warning" => "#00BFFF",
        "Hurricane Warning" | "Extreme Wind Warning" => "#8B0000",
        "Storm Surge Warning" => "#C71585",
        "High Wind Warning" => "#DAA520",
        "Civil Emergency Message" => "#000000",
        "Shelter In Place Warning" => "#4B0082",
        "Radiological Hazard Warning" => "#2F4F4F",
        "Hazardous Materials Warning" => "#8B008B",
        _ => DEFAULT_ALERT_COLOR,
    }
}

#[must_use]
pub fn is_flashing(event: &str) -> bool {
    matches!(
        event,
        "Tornado Warning"
            | "Severe Thunderstorm Warning"
            | "Flash Flood Warning"
            | "Flood Warning"
            | "Tropical Storm Warning"
            | "Hurricane Warning"
            | "Storm Surge Warning"
            | "Blizzard Warning"
            | "Winter Storm Warning"
            | "Ice Storm Warning"
            | "Red Flag Warning"
            | "Storm Warning"
            | "Hurricane Force Wind Warning"
            | "Extreme Wind Warning"
            | "High Wind Warning"
            | "Evacuation - Immediate"
            | "Civil Emergency Message"
            | "Shelter In Place Warning"
            | "Radiological Hazard Warning"
            | "Hazardous Materials Warning"
    )
}

static HAZARD_RE: LazyLock<Regex> = LazyLock::new(|| section_regex("HAZARD"));
static IMPACT_RE: LazyLock<Regex> = LazyLock::new(|| section_regex("IMPACT"));

fn section_regex(label: &str) -> Regex {
    Regex::new(&format!(r"(?s){label}\.\.\.(.*?)(?:\n\n|\n[A-Z]+|$)")).expect("valid regex")
}

/// The `HAZARD...` paragraph of an alert description, newlines folded to
/// spaces.
#[must_use]
pub fn hazard_section(description: &str) -> Option<String> {
    extract_section(&HAZARD_RE, description)
}

/// The `IMPACT...` paragraph of an alert description.
#[must_use]
pub fn impact_section(description: &str) -> Option<String> {
    extract_section(&IMPACT_RE, description)
}

fn extract_section(re: &Regex, description: &str) -> Option<String> {
    let text = re.captures(description)?.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.replace('\n', " "))
}

/// IANA time zone used to display a store's "closed since" time.
#[must_use]
pub fn state_time_zone(state: &str) -> &'static str {
    match state.trim().to_ascii_uppercase().as_str() {
        "AL" | "AR" | "IL" | "IA" | "KS" | "LA" | "MN" | "MS" | "MO" | "NE" | "ND" | "OK"
        | "SD" | "TN" | "TX" | "WI" => "America/Chicago",
        "AK" => "America/Anchorage",
        "AZ" => "America/Phoenix",
        "CA" | "NV" | "OR" | "WA" => "America/Los_Angeles",
        "CO" | "MT" | "NM" | "UT" | "WY" => "America/Denver",
        "HI" => "Pacific/Honolulu",
        "ID" => "America/Boise",
        "IN" => "America/Indiana/Indianapolis",
        "MI" => "America/Detroit",
        "PR" => "America/Puerto_Rico",
        "GU" => "Pacific/Guam",
        "VI" => "America/St_Thomas",
        _ => DEFAULT_TIME_ZONE,
    }
}
