use stormwatch_locator::{HistoryError, LocatorError};
use stormwatch_nws::NwsError;
use thiserror::Error;

/// A polygon that cannot take part in an intersection test.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("polygon ring has {points} points; at least 4 are required")]
    DegenerateRing { points: usize },

    #[error("polygon has a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("polygon bounds could not be computed")]
    NoBounds,
}

#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("store {store_code} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        store_code: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("freshness window of {hours} hours is out of range")]
    InvalidFreshnessWindow { hours: i64 },
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("failed to fetch active alerts: {0}")]
    Fetch(#[from] NwsError),
}

/// Failure of a [`crate::LocationSource`].
#[derive(Debug, Error)]
pub enum LocationSourceError {
    #[error("location feed error: {0}")]
    Feed(#[from] LocatorError),

    #[error("status history error: {0}")]
    History(#[from] HistoryError),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Alerts(#[from] EnrichError),

    #[error(transparent)]
    Locations(#[from] LocationSourceError),
}
