use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operating status reported by the store-locator feed.
///
/// The feed uses short codes (`A`, `C`, `CT`). Anything else is kept
/// verbatim in [`StoreStatus::Unknown`] so it can be reported rather than
/// silently coerced into one of the known states.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum StoreStatus {
    Active,
    Closed,
    ClosedTemporary,
    Unknown(String),
}

/// Coarse grouping used when deciding whether a status actually changed.
///
/// `Closed` and `ClosedTemporary` share a category, so moving between them
/// is not treated as a new closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCategory {
    Open,
    Closed,
    Other(String),
}

impl StoreStatus {
    /// Parse a raw feed code. Surrounding whitespace and case are ignored.
    #[must_use]
    pub fn from_code(raw: &str) -> Self {
        let code = raw.trim().to_uppercase();
        match code.as_str() {
            "A" => Self::Active,
            "C" => Self::Closed,
            "CT" => Self::ClosedTemporary,
            _ => Self::Unknown(code),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Active => "A",
            Self::Closed => "C",
            Self::ClosedTemporary => "CT",
            Self::Unknown(code) => code,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed | Self::ClosedTemporary)
    }

    #[must_use]
    pub fn category(&self) -> StatusCategory {
        match self {
            Self::Active => StatusCategory::Open,
            Self::Closed | Self::ClosedTemporary => StatusCategory::Closed,
            Self::Unknown(code) => StatusCategory::Other(code.clone()),
        }
    }
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for StoreStatus {
    fn from(raw: String) -> Self {
        Self::from_code(&raw)
    }
}

impl From<StoreStatus> for String {
    fn from(status: StoreStatus) -> Self {
        status.code().to_string()
    }
}

/// A single store as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub store_code: String,
    pub business_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: StoreStatus,
    /// When the store last moved between status categories, if known.
    pub last_changed: Option<DateTime<Utc>>,
}

impl Location {
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lat: f64, lng: f64) -> Location {
        Location {
            store_code: "1234".to_string(),
            business_name: "Store".to_string(),
            address: "1 Main St".to_string(),
            city: "Mobile".to_string(),
            state: "AL".to_string(),
            postal_code: "36602".to_string(),
            latitude: lat,
            longitude: lng,
            status: StoreStatus::Active,
            last_changed: None,
        }
    }

    #[test]
    fn from_code_normalizes_case_and_whitespace() {
        assert_eq!(StoreStatus::from_code(" a "), StoreStatus::Active);
        assert_eq!(StoreStatus::from_code("c"), StoreStatus::Closed);
        assert_eq!(StoreStatus::from_code("ct\n"), StoreStatus::ClosedTemporary);
    }

    #[test]
    fn unknown_codes_are_preserved_upper_cased() {
        assert_eq!(
            StoreStatus::from_code("n/a"),
            StoreStatus::Unknown("N/A".to_string())
        );
        assert_eq!(StoreStatus::from_code("n/a").code(), "N/A");
    }

    #[test]
    fn closed_and_temporary_share_a_category() {
        assert_eq!(
            StoreStatus::Closed.category(),
            StoreStatus::ClosedTemporary.category()
        );
        assert_ne!(StoreStatus::Active.category(), StoreStatus::Closed.category());
    }

    #[test]
    fn only_closed_codes_count_as_closed() {
        assert!(StoreStatus::Closed.is_closed());
        assert!(StoreStatus::ClosedTemporary.is_closed());
        assert!(!StoreStatus::Active.is_closed());
        assert!(!StoreStatus::Unknown("X".to_string()).is_closed());
    }

    #[test]
    fn status_serializes_as_feed_code() {
        let json = serde_json::to_string(&StoreStatus::ClosedTemporary).unwrap();
        assert_eq!(json, "\"CT\"");
        let parsed: StoreStatus = serde_json::from_str("\"c\"").unwrap();
        assert_eq!(parsed, StoreStatus::Closed);
    }

    #[test]
    fn coordinate_validation_rejects_out_of_range_and_nan() {
        assert!(location(30.69, -88.04).has_valid_coordinates());
        assert!(!location(f64::NAN, -88.04).has_valid_coordinates());
        assert!(!location(95.0, -88.04).has_valid_coordinates());
        assert!(!location(30.0, -188.0).has_valid_coordinates());
    }
}
