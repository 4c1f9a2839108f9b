//! Whole-warehouse reads: the hierarchy tree and area utilization.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    db::DbPool,
    entities::{storage_area, storage_bin, storage_location, warehouse},
    errors::ServiceError,
    events::HierarchyLevel,
    geometry::utilization_percent,
    repositories::HierarchyRepository,
};

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseTree {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    /// Every area of the warehouse; nested ones carry their `parent_area_id`.
    pub storage_areas: Vec<AreaNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaNode {
    #[serde(flatten)]
    pub area: storage_area::Model,
    pub storage_locations: Vec<LocationNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationNode {
    #[serde(flatten)]
    pub location: storage_location::Model,
    pub storage_bins: Vec<storage_bin::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utilization {
    pub level: HierarchyLevel,
    pub id: i32,
    pub code: String,
    pub total_area_m2: f64,
    pub used_area_m2: f64,
    pub utilization_percent: f64,
    /// Active children counted in `used_area_m2`
    pub children: usize,
}

pub struct HierarchyService {
    db_pool: Arc<DbPool>,
}

impl HierarchyService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Warehouse → areas → locations → bins in four queries.
    #[instrument(skip(self))]
    pub async fn warehouse_tree(&self, warehouse_id: i32) -> Result<WarehouseTree, ServiceError> {
        let repo = HierarchyRepository::new(self.db_pool.as_ref());
        let warehouse = repo.require_warehouse(warehouse_id).await?;
        let areas = repo.areas_of_warehouse(warehouse.id).await?;
        let locations = repo
            .locations_of_areas(areas.iter().map(|a| a.id).collect())
            .await?;
        let bins = repo
            .bins_of_locations(locations.iter().map(|l| l.id).collect())
            .await?;

        let mut bins_by_location: HashMap<i32, Vec<storage_bin::Model>> = HashMap::new();
        for bin in bins {
            bins_by_location
                .entry(bin.storage_location_id)
                .or_default()
                .push(bin);
        }

        let mut locations_by_area: HashMap<i32, Vec<LocationNode>> = HashMap::new();
        for location in locations {
            let storage_bins = bins_by_location.remove(&location.id).unwrap_or_default();
            locations_by_area
                .entry(location.storage_area_id)
                .or_default()
                .push(LocationNode {
                    location,
                    storage_bins,
                });
        }

        let storage_areas = areas
            .into_iter()
            .map(|area| AreaNode {
                storage_locations: locations_by_area.remove(&area.id).unwrap_or_default(),
                area,
            })
            .collect();

        Ok(WarehouseTree {
            warehouse,
            storage_areas,
        })
    }

    /// Share of the area covered by its active nested areas and locations.
    /// Locations are points and contribute zero.
    #[instrument(skip(self))]
    pub async fn area_utilization(&self, area_id: i32) -> Result<Utilization, ServiceError> {
        let repo = HierarchyRepository::new(self.db_pool.as_ref());
        let area = repo.require_area(area_id).await?;

        let nested: Vec<f64> = repo
            .child_areas(area.id)
            .await?
            .into_iter()
            .filter(|a| a.active)
            .map(|a| a.area_m2)
            .collect();
        let locations: Vec<f64> = repo
            .locations_of_areas(vec![area.id])
            .await?
            .into_iter()
            .filter(|l| l.active)
            .map(|l| l.area_m2)
            .collect();

        let children = nested.len() + locations.len();
        let used: f64 = nested.iter().chain(locations.iter()).sum();
        Ok(Utilization {
            level: HierarchyLevel::StorageArea,
            id: area.id,
            code: area.code,
            total_area_m2: area.area_m2,
            used_area_m2: used,
            utilization_percent: utilization_percent(used, area.area_m2),
            children,
        })
    }

    /// Share of the warehouse covered by its active top-level areas.
    #[instrument(skip(self))]
    pub async fn warehouse_utilization(
        &self,
        warehouse_id: i32,
    ) -> Result<Utilization, ServiceError> {
        let repo = HierarchyRepository::new(self.db_pool.as_ref());
        let warehouse = repo.require_warehouse(warehouse_id).await?;

        let top_level: Vec<f64> = repo
            .areas_of_warehouse(warehouse.id)
            .await?
            .into_iter()
            .filter(|a| a.active && a.parent_area_id.is_none())
            .map(|a| a.area_m2)
            .collect();

        let used: f64 = top_level.iter().sum();
        Ok(Utilization {
            level: HierarchyLevel::Warehouse,
            id: warehouse.id,
            code: warehouse.code,
            total_area_m2: warehouse.area_m2,
            used_area_m2: used,
            utilization_percent: utilization_percent(used, warehouse.area_m2),
            children: top_level.len(),
        })
    }
}
