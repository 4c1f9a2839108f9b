//! Services exposed to the HTTP layer and the CLI.
//!
//! Mutations delegate to [`crate::commands`]; reads go straight through
//! [`crate::repositories::HierarchyRepository`] on the shared pool.

// Per-level CRUD
pub mod bin_types;
pub mod relationships;
pub mod storage_areas;
pub mod storage_bins;
pub mod storage_locations;
pub mod warehouses;

// Hierarchy engine
pub mod gps_resolver;
pub mod hierarchy;
pub mod hierarchy_validator;
pub mod lifecycle;

use std::sync::Arc;

use crate::{db::DbPool, events::EventSender};

/// Every service, built once at start-up over the same pool and event channel.
#[derive(Clone)]
pub struct HierarchyServices {
    pub warehouses: Arc<warehouses::WarehouseService>,
    pub storage_areas: Arc<storage_areas::StorageAreaService>,
    pub storage_locations: Arc<storage_locations::StorageLocationService>,
    pub storage_bins: Arc<storage_bins::StorageBinService>,
    pub bin_types: Arc<bin_types::BinTypeService>,
    pub relationships: Arc<relationships::RelationshipService>,
    pub gps_resolver: Arc<gps_resolver::GpsResolver>,
    pub hierarchy: Arc<hierarchy::HierarchyService>,
    pub validator: Arc<hierarchy_validator::HierarchyValidator>,
    pub lifecycle: Arc<lifecycle::LifecycleManager>,
}

impl HierarchyServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let lifecycle = Arc::new(lifecycle::LifecycleManager::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        Self {
            warehouses: Arc::new(warehouses::WarehouseService::new(
                db_pool.clone(),
                event_sender.clone(),
                lifecycle.clone(),
            )),
            storage_areas: Arc::new(storage_areas::StorageAreaService::new(
                db_pool.clone(),
                event_sender.clone(),
                lifecycle.clone(),
            )),
            storage_locations: Arc::new(storage_locations::StorageLocationService::new(
                db_pool.clone(),
                event_sender.clone(),
                lifecycle.clone(),
            )),
            storage_bins: Arc::new(storage_bins::StorageBinService::new(
                db_pool.clone(),
                event_sender.clone(),
                lifecycle.clone(),
            )),
            bin_types: Arc::new(bin_types::BinTypeService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            relationships: Arc::new(relationships::RelationshipService::new(
                db_pool.clone(),
                event_sender,
            )),
            gps_resolver: Arc::new(gps_resolver::GpsResolver::new(db_pool.clone())),
            hierarchy: Arc::new(hierarchy::HierarchyService::new(db_pool.clone())),
            validator: Arc::new(hierarchy_validator::HierarchyValidator::new(db_pool)),
            lifecycle,
        }
    }
}
