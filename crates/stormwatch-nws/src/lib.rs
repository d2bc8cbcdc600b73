//! Typed client for the National Weather Service `api.weather.gov` endpoints
//! the dashboard consumes (active alerts and forecast-zone geometry), plus
//! the map overlay feeds: NHC hurricane cones and RainViewer radar frames.

pub mod client;
pub mod error;
pub mod overlays;
pub(crate) mod retry;
pub mod types;
pub mod zone;

pub use client::NwsClient;
pub use error::NwsError;
pub use overlays::{OverlayClient, RadarFrame, RadarFrames};
pub use types::{is_polygonal, AlertFeature, AlertProperties};
pub use zone::ZoneRef;
