//! Persisted shape of the storage hierarchy.
//!
//! Four primary tables (`warehouses`, `storage_areas`, `storage_locations`,
//! `storage_bins`), the `storage_bin_types` catalog and the auxiliary
//! `location_relationships` graph. Geometry columns hold the wire-format JSON;
//! area, centroid and bounding-box columns are derived and only written
//! through `set_boundary` / `set_point`.

pub mod location_relationship;
pub mod storage_area;
pub mod storage_bin;
pub mod storage_bin_type;
pub mod storage_location;
pub mod warehouse;

use geo::Polygon;
use sea_orm::prelude::Json;

use crate::errors::ServiceError;
use crate::geometry::decode_stored_polygon;

/// Decodes a stored boundary. A row that cannot be read back is an internal
/// fault, never a client error.
pub(crate) fn stored_polygon(
    entity: &'static str,
    id: i32,
    boundary: &Json,
) -> Result<Polygon<f64>, ServiceError> {
    decode_stored_polygon(boundary).map_err(|e| {
        ServiceError::InternalError(format!(
            "stored boundary of {} {} is unreadable: {}",
            entity, id, e
        ))
    })
}
