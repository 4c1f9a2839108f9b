//! Geometry handling for the storage hierarchy.
//!
//! Boundaries and points travel as GeoJSON-shaped objects tagged `Polygon` or
//! `Point`, with coordinates in `[longitude, latitude]` order on the WGS84
//! datum. This module provides:
//! - [`validation`]: structural and topological checks turning raw input into
//!   `geo` types
//! - [`derived`]: area (geodesic, square meters), centroid and bounding box
//! - [`containment`]: the parent/child covers predicate

pub mod containment;
pub mod derived;
pub mod validation;

use geo::{Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub use containment::{require_within, Shape};
pub use derived::{utilization_percent, BoundingBox, DerivedGeometry};
pub use validation::{validate_boundary, validate_coordinates, validate_point, GeometryError};

/// Geometry as exchanged on the wire: `{"type": "...", "coordinates": ...}`.
///
/// `coordinates` is kept untyped so that malformed payloads reach the
/// validator and are reported with a precise reason instead of a generic
/// deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    #[serde(default)]
    pub coordinates: Json,
}

impl RawGeometry {
    /// Builds a polygon payload from a single ring of `(longitude, latitude)` pairs.
    pub fn polygon(ring: &[(f64, f64)]) -> Self {
        let ring: Vec<Json> = ring
            .iter()
            .map(|(lon, lat)| Json::from(vec![*lon, *lat]))
            .collect();
        Self {
            geometry_type: "Polygon".to_string(),
            coordinates: Json::Array(vec![Json::Array(ring)]),
        }
    }

    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            geometry_type: "Point".to_string(),
            coordinates: Json::from(vec![longitude, latitude]),
        }
    }

    /// Wire representation of an already validated polygon, exterior ring first.
    pub fn from_polygon(polygon: &Polygon<f64>) -> Self {
        let rings = std::iter::once(polygon.exterior())
            .chain(polygon.interiors().iter())
            .map(ring_to_json)
            .collect();
        Self {
            geometry_type: "Polygon".to_string(),
            coordinates: Json::Array(rings),
        }
    }

    pub fn into_json(self) -> Json {
        serde_json::json!({
            "type": self.geometry_type,
            "coordinates": self.coordinates,
        })
    }
}

fn ring_to_json(ring: &LineString<f64>) -> Json {
    Json::Array(
        ring.coords()
            .map(|c| Json::from(vec![c.x, c.y]))
            .collect(),
    )
}

/// Decodes a boundary previously written by this crate.
///
/// Stored boundaries were validated on the way in, so only the structure is
/// re-read here; topology checks are not repeated.
pub fn decode_stored_polygon(value: &Json) -> Result<Polygon<f64>, GeometryError> {
    let raw: RawGeometry =
        serde_json::from_value(value.clone()).map_err(|e| GeometryError::MalformedCoordinates {
            detail: e.to_string(),
        })?;
    let rings = validation::parse_rings(&raw.coordinates)?;
    let mut rings = rings.into_iter().map(|ring| {
        LineString::from(
            ring.into_iter()
                .map(|[x, y]| Coord { x, y })
                .collect::<Vec<_>>(),
        )
    });
    let exterior = rings.next().ok_or(GeometryError::MalformedCoordinates {
        detail: "polygon has no rings".to_string(),
    })?;
    Ok(Polygon::new(exterior, rings.collect()))
}

/// `geo` point for a stored `(longitude, latitude)` pair.
pub fn point(longitude: f64, latitude: f64) -> Point<f64> {
    Point::new(longitude, latitude)
}
