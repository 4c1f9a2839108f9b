use geo::{Area, Coord, LineString, Point, Polygon, Validation};
use serde::Serialize;
use serde_json::Value as Json;

use super::RawGeometry;

/// Three distinct vertices plus the closing point.
const MIN_RING_ENTRIES: usize = 4;
const MIN_DISTINCT_VERTICES: usize = 3;

/// Reasons a raw geometry is rejected. Each variant is a distinct,
/// machine-readable reason so callers can tell closure, vertex-count and
/// topology failures apart.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GeometryError {
    #[error("expected geometry type {expected}, got '{actual}'")]
    WrongType {
        expected: &'static str,
        actual: String,
    },

    #[error("malformed coordinates: {detail}")]
    MalformedCoordinates { detail: String },

    #[error("ring {ring} is not closed: first coordinate {first:?} differs from last {last:?}")]
    RingNotClosed {
        ring: usize,
        first: [f64; 2],
        last: [f64; 2],
    },

    #[error("ring {ring} has {found} coordinate entries, at least 4 required")]
    TooFewCoordinates { ring: usize, found: usize },

    #[error("ring {ring} has {distinct} distinct vertices, at least 3 required")]
    DegenerateRing { ring: usize, distinct: usize },

    #[error("coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("coordinate [{longitude}, {latitude}] is outside the WGS84 range")]
    OutOfRange { longitude: f64, latitude: f64 },

    #[error("invalid topology: {detail}")]
    InvalidTopology { detail: String },
}

/// Validates a boundary payload and returns the polygon it describes.
///
/// Checks run in a fixed order: geometry type, coordinate structure, ring
/// closure, ring length, coordinate range, distinct vertices, topology.
/// Rings are never closed automatically.
pub fn validate_boundary(raw: &RawGeometry) -> Result<Polygon<f64>, GeometryError> {
    expect_type(raw, "Polygon")?;
    let rings = parse_rings(&raw.coordinates)?;

    for (index, ring) in rings.iter().enumerate() {
        check_ring(index, ring)?;
    }

    let mut rings = rings.into_iter().map(to_line_string);
    let exterior = rings.next().ok_or_else(|| GeometryError::MalformedCoordinates {
        detail: "polygon has no rings".to_string(),
    })?;
    let polygon = Polygon::new(exterior, rings.collect());

    check_topology(&polygon)?;
    Ok(polygon)
}

/// Validates a point payload: type `Point` and exactly two numeric values.
pub fn validate_point(raw: &RawGeometry) -> Result<Point<f64>, GeometryError> {
    expect_type(raw, "Point")?;
    let [longitude, latitude] = parse_position(&raw.coordinates).map_err(|detail| {
        GeometryError::MalformedCoordinates {
            detail: format!("point {}", detail),
        }
    })?;
    validate_coordinates(longitude, latitude)
}

/// Range check for a bare `(longitude, latitude)` pair such as a GPS fix.
pub fn validate_coordinates(longitude: f64, latitude: f64) -> Result<Point<f64>, GeometryError> {
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(GeometryError::OutOfRange {
            longitude,
            latitude,
        });
    }
    Ok(Point::new(longitude, latitude))
}

fn expect_type(raw: &RawGeometry, expected: &'static str) -> Result<(), GeometryError> {
    if raw.geometry_type != expected {
        return Err(GeometryError::WrongType {
            expected,
            actual: raw.geometry_type.clone(),
        });
    }
    Ok(())
}

/// Reads `[[[lon, lat], ...], ...]` into rings of coordinate pairs.
pub(crate) fn parse_rings(value: &Json) -> Result<Vec<Vec<[f64; 2]>>, GeometryError> {
    let rings = value
        .as_array()
        .ok_or_else(|| GeometryError::MalformedCoordinates {
            detail: "polygon coordinates must be an array of rings".to_string(),
        })?;
    if rings.is_empty() {
        return Err(GeometryError::MalformedCoordinates {
            detail: "polygon must contain at least one ring".to_string(),
        });
    }

    rings
        .iter()
        .enumerate()
        .map(|(ring_index, ring)| {
            let positions = ring
                .as_array()
                .ok_or_else(|| GeometryError::MalformedCoordinates {
                    detail: format!("ring {} must be an array of positions", ring_index),
                })?;
            positions
                .iter()
                .enumerate()
                .map(|(index, position)| {
                    parse_position(position).map_err(|detail| {
                        GeometryError::MalformedCoordinates {
                            detail: format!("ring {} position {} {}", ring_index, index, detail),
                        }
                    })
                })
                .collect()
        })
        .collect()
}

fn parse_position(value: &Json) -> Result<[f64; 2], String> {
    match value.as_array().map(Vec::as_slice) {
        Some([lon, lat]) => match (lon.as_f64(), lat.as_f64()) {
            (Some(lon), Some(lat)) => Ok([lon, lat]),
            _ => Err("must contain two numeric values".to_string()),
        },
        Some(other) => Err(format!(
            "must contain exactly two values, found {}",
            other.len()
        )),
        None => Err("must be a [longitude, latitude] array".to_string()),
    }
}

fn check_ring(ring_index: usize, ring: &[[f64; 2]]) -> Result<(), GeometryError> {
    // Closure is reported ahead of the length check so an unclosed triangle
    // is not mistaken for a short ring.
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            return Err(GeometryError::RingNotClosed {
                ring: ring_index,
                first: *first,
                last: *last,
            });
        }
    }

    if ring.len() < MIN_RING_ENTRIES {
        return Err(GeometryError::TooFewCoordinates {
            ring: ring_index,
            found: ring.len(),
        });
    }

    for [longitude, latitude] in ring {
        validate_coordinates(*longitude, *latitude)?;
    }

    let mut distinct: Vec<[f64; 2]> = Vec::with_capacity(ring.len());
    for vertex in &ring[..ring.len() - 1] {
        if !distinct.contains(vertex) {
            distinct.push(*vertex);
        }
    }
    if distinct.len() < MIN_DISTINCT_VERTICES {
        return Err(GeometryError::DegenerateRing {
            ring: ring_index,
            distinct: distinct.len(),
        });
    }

    Ok(())
}

fn check_topology(polygon: &Polygon<f64>) -> Result<(), GeometryError> {
    polygon
        .check_validation()
        .map_err(|err| GeometryError::InvalidTopology {
            detail: err.to_string(),
        })?;

    if polygon.unsigned_area() == 0.0 {
        return Err(GeometryError::InvalidTopology {
            detail: "ring encloses zero area".to_string(),
        });
    }
    Ok(())
}

fn to_line_string(ring: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::from(
        ring.into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect::<Vec<_>>(),
    )
}
