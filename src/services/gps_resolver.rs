//! GPS → (warehouse, area, location) resolution.
//!
//! Three dependent lookups, each short-circuiting to `None`:
//! 1. first active warehouse whose boundary covers the point,
//! 2. first active area of that warehouse whose boundary covers the point,
//! 3. active location of that area stored at exactly the query point.
//!
//! The last stage compares coordinates for equality. A point that is a few
//! centimetres off a location's stored point does not resolve.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    db::DbPool,
    entities::{storage_area, storage_location, warehouse},
    errors::ServiceError,
    geometry::validate_coordinates,
    repositories::HierarchyRepository,
};

/// The three levels a GPS point resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub warehouse: warehouse::Model,
    pub storage_area: storage_area::Model,
    pub storage_location: storage_location::Model,
}

impl Resolution {
    /// Ids only, in hierarchy order.
    pub fn ids(&self) -> (i32, i32, i32) {
        (
            self.warehouse.id,
            self.storage_area.id,
            self.storage_location.id,
        )
    }
}

pub struct GpsResolver {
    db_pool: Arc<DbPool>,
}

impl GpsResolver {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Resolves a WGS84 point. Read-only.
    ///
    /// Fails with `GeometryInvalid` for a non-finite or out-of-range
    /// coordinate; every lookup miss is `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<Option<Resolution>, ServiceError> {
        validate_coordinates(longitude, latitude)
            .map_err(|e| ServiceError::geometry("coordinates", e))?;

        let start = Instant::now();
        let result = self.walk(longitude, latitude).await;
        histogram!(
            "storage.gps.resolve_duration_seconds",
            start.elapsed().as_secs_f64()
        );

        let (resolution, outcome) = match result {
            Ok(Walk::Resolved(resolution)) => (Some(resolution), "hit"),
            Ok(Walk::NoWarehouse) => (None, "no_warehouse"),
            Ok(Walk::NoArea) => (None, "no_area"),
            Ok(Walk::NoLocation) => (None, "no_location"),
            Err(e) => {
                counter!("storage.gps.resolutions", 1, "outcome" => "error");
                return Err(e);
            }
        };
        counter!("storage.gps.resolutions", 1, "outcome" => outcome);
        debug!(outcome, elapsed_ms = start.elapsed().as_millis() as u64, "gps resolution finished");
        Ok(resolution)
    }

    async fn walk(&self, longitude: f64, latitude: f64) -> Result<Walk, ServiceError> {
        let repo = HierarchyRepository::new(self.db_pool.as_ref());

        let Some(warehouse) = repo.warehouse_containing(longitude, latitude).await? else {
            return Ok(Walk::NoWarehouse);
        };
        let Some(storage_area) = repo
            .area_containing(warehouse.id, longitude, latitude)
            .await?
        else {
            return Ok(Walk::NoArea);
        };
        let Some(storage_location) = repo
            .location_at(storage_area.id, longitude, latitude)
            .await?
        else {
            return Ok(Walk::NoLocation);
        };

        Ok(Walk::Resolved(Resolution {
            warehouse,
            storage_area,
            storage_location,
        }))
    }
}

enum Walk {
    Resolved(Resolution),
    NoWarehouse,
    NoArea,
    NoLocation,
}
