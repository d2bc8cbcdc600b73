//! Storm-correlated closure classification and NWS alert enrichment.
//!
//! Alerts flow through [`AlertEnricher`] into an [`AlertCache`]; the
//! [`ClosureClassifier`] tests recently closed stores against the cached
//! alert polygons via the [`GeometryCorrelator`]; the [`BatchDispatcher`]
//! drives classification across the full store list. A [`DashboardSession`]
//! ties the pieces together behind a single refresh operation.

pub mod batch;
pub mod cache;
pub mod classify;
pub mod enrich;
pub mod error;
pub mod geometry;
pub mod presentation;
pub mod session;
pub mod sources;

pub use batch::{BatchDispatcher, Summary, TokioYield, YieldPoint};
pub use cache::{AlertCache, CachedAlerts, FillTicket};
pub use classify::{Classification, ClosureClassifier, PinGroup};
pub use enrich::{AlertEnricher, AlertSource, DEFAULT_ALLOWED_EVENTS};
pub use error::{
    ClassifyError, EnrichError, GeometryError, LocationSourceError, RefreshError,
};
pub use geometry::{is_near, AlertArea, GeometryCorrelator};
pub use session::{
    ClassifiedLocation, DashboardSession, LocationSource, RefreshOutcome, Snapshot,
};
pub use sources::StoreFeed;
