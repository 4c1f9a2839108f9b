use std::sync::Arc;

use tracing::instrument;

use super::lifecycle::{HierarchyEntity, LifecycleManager, SoftDeleteOutcome};
use crate::{
    commands::{
        storage_areas::{CreateStorageAreaCommand, UpdateStorageAreaCommand},
        Command,
    },
    db::DbPool,
    entities::storage_area,
    errors::ServiceError,
    events::EventSender,
    repositories::{HierarchyRepository, ListFilter, Page},
};

/// Service for managing storage areas
#[derive(Clone)]
pub struct StorageAreaService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    lifecycle: Arc<LifecycleManager>,
}

impl StorageAreaService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        lifecycle: Arc<LifecycleManager>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            lifecycle,
        }
    }

    #[instrument(skip(self, command), fields(code = %command.code, warehouse_id = command.warehouse_id))]
    pub async fn create_area(
        &self,
        command: CreateStorageAreaCommand,
    ) -> Result<storage_area::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(storage_area_id = command.id))]
    pub async fn update_area(
        &self,
        command: UpdateStorageAreaCommand,
    ) -> Result<storage_area::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_area(&self, id: i32) -> Result<storage_area::Model, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .require_area(id)
            .await
    }

    /// `filter.parent_id` selects the warehouse
    #[instrument(skip(self))]
    pub async fn list_areas(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_area::Model>, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .list_areas(filter)
            .await
    }

    pub async fn deactivate_area(&self, id: i32) -> Result<SoftDeleteOutcome, ServiceError> {
        self.lifecycle
            .soft_delete(HierarchyEntity::StorageArea(id))
            .await
    }
}
