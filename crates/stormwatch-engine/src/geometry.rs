//! Storm-proximity geometry: point buffers, polygon conversion, and the
//! buffered intersection test.

use geo::{BoundingRect, Coord, HaversineDestination, Intersects, LineString, Point, Polygon, Rect};
use stormwatch_nws::AlertFeature;

use crate::error::GeometryError;

pub const METERS_PER_MILE: f64 = 1609.344;

/// Vertices on the circular buffer ring.
const BUFFER_SEGMENTS: u32 = 64;

/// One polygon of a cached alert, tagged with the alert's event type.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertArea {
    pub event: String,
    pub polygon: Polygon<f64>,
}

/// Decides whether a point lies within a fixed radius of any polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryCorrelator {
    radius_miles: f64,
}

impl GeometryCorrelator {
    #[must_use]
    pub fn new(radius_miles: f64) -> Self {
        Self { radius_miles }
    }

    #[must_use]
    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    #[must_use]
    pub fn is_near<'a, I>(&self, latitude: f64, longitude: f64, polygons: I) -> bool
    where
        I: IntoIterator<Item = &'a Polygon<f64>>,
    {
        is_near(latitude, longitude, self.radius_miles, polygons)
    }
}

/// `true` if the circular buffer of `radius_miles` around the point
/// intersects at least one of `polygons`.
///
/// Each polygon is first rejected on bounding-box disjointness, then tested
/// exactly. Malformed polygons are logged and treated as non-matching.
pub fn is_near<'a, I>(latitude: f64, longitude: f64, radius_miles: f64, polygons: I) -> bool
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let buffer = storm_buffer(latitude, longitude, radius_miles);
    let Some(buffer_bounds) = buffer.bounding_rect() else {
        tracing::warn!(latitude, longitude, "could not compute storm buffer bounds");
        return false;
    };

    polygons.into_iter().any(|polygon| {
        match polygon_bounds(polygon) {
            Ok(bounds) => bounds.intersects(&buffer_bounds) && buffer.intersects(polygon),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed alert polygon");
                false
            }
        }
    })
}

/// Circle of `radius_miles` around `(latitude, longitude)`, built from
/// haversine destination points.
#[must_use]
pub fn storm_buffer(latitude: f64, longitude: f64, radius_miles: f64) -> Polygon<f64> {
    let center = Point::new(longitude, latitude);
    let meters = radius_miles * METERS_PER_MILE;

    let ring: Vec<Coord<f64>> = (0..BUFFER_SEGMENTS)
        .map(|i| {
            let bearing = 360.0 * f64::from(i) / f64::from(BUFFER_SEGMENTS);
            center.haversine_destination(bearing, meters).0
        })
        .collect();

    Polygon::new(LineString::from(ring), Vec::new())
}

/// Bounds of a polygon that is safe to intersect.
///
/// # Errors
///
/// Returns [`GeometryError`] for rings with fewer than four points,
/// non-finite coordinates, or polygons without bounds.
pub fn polygon_bounds(polygon: &Polygon<f64>) -> Result<Rect<f64>, GeometryError> {
    let points = polygon.exterior().0.len();
    if points < 4 {
        return Err(GeometryError::DegenerateRing { points });
    }

    let all_finite = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(LineString::coords)
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !all_finite {
        return Err(GeometryError::NonFiniteCoordinate);
    }

    polygon.bounding_rect().ok_or(GeometryError::NoBounds)
}

/// Polygons of a GeoJSON geometry. Multi-polygons are flattened; any other
/// geometry type yields nothing. Positions with fewer than two ordinates
/// make the whole polygon unusable.
#[must_use]
pub fn polygons_from_geojson(geometry: &geojson::Geometry) -> Vec<Polygon<f64>> {
    match &geometry.value {
        geojson::Value::Polygon(rings) => polygon_from_rings(rings).into_iter().collect(),
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| polygon_from_rings(rings))
            .collect(),
        _ => Vec::new(),
    }
}

/// Convert every alert's geometry into [`AlertArea`]s.
#[must_use]
pub fn alert_areas(features: &[AlertFeature]) -> Vec<AlertArea> {
    features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref().map(|g| (feature.event(), g)))
        .flat_map(|(event, geometry)| {
            let polygons = polygons_from_geojson(geometry);
            if polygons.is_empty() {
                tracing::warn!(event, "alert geometry produced no usable polygons");
            }
            polygons.into_iter().map(move |polygon| AlertArea {
                event: event.to_string(),
                polygon,
            })
        })
        .collect()
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    let interiors = interiors
        .iter()
        .map(|ring| line_string(ring))
        .collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(line_string(exterior)?, interiors))
}

fn line_string(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::from)
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;
