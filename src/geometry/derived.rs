use geo::orient::{Direction, Orient};
use geo::{BoundingRect, Centroid, GeodesicArea, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in degrees. Persisted next to every boundary
/// and used as the SQL prefilter for spatial lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

impl BoundingBox {
    pub fn of_point(point: &Point<f64>) -> Self {
        Self {
            min_longitude: point.x(),
            min_latitude: point.y(),
            max_longitude: point.x(),
            max_latitude: point.y(),
        }
    }

    /// Inclusive on every edge.
    pub fn contains_point(&self, longitude: f64, latitude: f64) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&longitude)
            && (self.min_latitude..=self.max_latitude).contains(&latitude)
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.min_longitude, other.min_latitude)
            && self.contains_point(other.max_longitude, other.max_latitude)
    }
}

/// Read-only attributes computed from a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedGeometry {
    /// Geodesic area on the WGS84 ellipsoid, square meters.
    pub area_m2: f64,
    pub centroid: [f64; 2],
    pub bbox: BoundingBox,
}

impl DerivedGeometry {
    /// Derived attributes of a validated polygon.
    ///
    /// Validated polygons always have a non-empty exterior, so the centroid and
    /// bounding rect exist; the fallbacks only cover an empty polygon.
    pub fn from_polygon(polygon: &Polygon<f64>) -> Self {
        // A clockwise exterior measures as the rest of the globe.
        let area_m2 = polygon.orient(Direction::Default).geodesic_area_unsigned();
        let centroid = polygon
            .centroid()
            .map(|c| [c.x(), c.y()])
            .unwrap_or([0.0, 0.0]);
        let bbox = polygon
            .bounding_rect()
            .map(|rect| BoundingBox {
                min_longitude: rect.min().x,
                min_latitude: rect.min().y,
                max_longitude: rect.max().x,
                max_latitude: rect.max().y,
            })
            .unwrap_or(BoundingBox {
                min_longitude: centroid[0],
                min_latitude: centroid[1],
                max_longitude: centroid[0],
                max_latitude: centroid[1],
            });

        Self {
            area_m2,
            centroid,
            bbox,
        }
    }

    /// Points have zero area and are their own centroid.
    pub fn from_point(point: &Point<f64>) -> Self {
        Self {
            area_m2: 0.0,
            centroid: [point.x(), point.y()],
            bbox: BoundingBox::of_point(point),
        }
    }
}

/// `used / total × 100`, or `0.0` when the total is not positive.
pub fn utilization_percent(used_m2: f64, total_m2: f64) -> f64 {
    if total_m2 <= 0.0 {
        return 0.0;
    }
    used_m2 / total_m2 * 100.0
}
