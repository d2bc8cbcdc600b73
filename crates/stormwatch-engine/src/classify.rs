//! Storm-correlated closure classification.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use stormwatch_core::{Location, StoreStatus};

use crate::error::ClassifyError;
use crate::geometry::{AlertArea, GeometryCorrelator};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_closed: bool,
    pub is_storm_related: bool,
}

/// Dashboard grouping of a classified store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinGroup {
    Open,
    Closed,
    Storm,
    /// The feed reported a status code that is neither open nor closed.
    Unknown,
}

impl PinGroup {
    #[must_use]
    pub fn of(status: &StoreStatus, classification: Classification) -> Self {
        match (status, classification) {
            (StoreStatus::Active, _) => Self::Open,
            (StoreStatus::Unknown(_), _) => Self::Unknown,
            (
                _,
                Classification {
                    is_storm_related: true,
                    ..
                },
            ) => Self::Storm,
            _ => Self::Closed,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Storm => "storm",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for PinGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "storm" => Ok(Self::Storm),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown pin group '{other}'")),
        }
    }
}

/// Decides whether a closed store is a recent, storm-correlated closure.
#[derive(Debug, Clone, Copy)]
pub struct ClosureClassifier {
    correlator: GeometryCorrelator,
    freshness_window: Duration,
}

impl ClosureClassifier {
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidFreshnessWindow`] when the window is
    /// negative or too large to represent as a duration.
    pub fn new(radius_miles: f64, freshness_window_hours: i64) -> Result<Self, ClassifyError> {
        let freshness_window = Duration::try_hours(freshness_window_hours)
            .filter(|window| *window >= Duration::zero())
            .ok_or(ClassifyError::InvalidFreshnessWindow {
                hours: freshness_window_hours,
            })?;
        Ok(Self {
            correlator: GeometryCorrelator::new(radius_miles),
            freshness_window,
        })
    }

    #[must_use]
    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Classify against the current wall clock.
    ///
    /// # Errors
    ///
    /// See [`Self::classify_at`].
    pub fn classify(
        &self,
        location: &Location,
        areas: &[AlertArea],
    ) -> Result<Classification, ClassifyError> {
        self.classify_at(location, areas, Utc::now())
    }

    /// Classify `location` as of `now`.
    ///
    /// Only `C`/`CT` stores are closed; every other status is returned as
    /// not closed without looking at the coordinates. A closure is storm-related when its
    /// `last_changed` is no older than the freshness window (a closure
    /// exactly at the window edge still counts) and the store lies within
    /// the proximity buffer of at least one alert area. Stores without a
    /// `last_changed` are never storm-related.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidCoordinates`] when a closed store's
    /// coordinates are non-finite or out of range.
    pub fn classify_at(
        &self,
        location: &Location,
        areas: &[AlertArea],
        now: DateTime<Utc>,
    ) -> Result<Classification, ClassifyError> {
        if !location.status.is_closed() {
            return Ok(Classification::default());
        }

        if !location.has_valid_coordinates() {
            return Err(ClassifyError::InvalidCoordinates {
                store_code: location.store_code.clone(),
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }

        let closed = Classification {
            is_closed: true,
            is_storm_related: false,
        };

        let Some(last_changed) = location.last_changed else {
            return Ok(closed);
        };
        if now - last_changed > self.freshness_window {
            return Ok(closed);
        }

        let is_storm_related = self.correlator.is_near(
            location.latitude,
            location.longitude,
            areas.iter().map(|area| &area.polygon),
        );

        Ok(Classification {
            is_closed: true,
            is_storm_related,
        })
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
