use std::sync::Arc;

use tracing::instrument;

use super::lifecycle::{HierarchyEntity, LifecycleManager, SoftDeleteOutcome};
use crate::{
    commands::{
        storage_locations::{
            AttachPhotoSessionCommand, CreateStorageLocationCommand, UpdateStorageLocationCommand,
        },
        Command,
    },
    db::DbPool,
    entities::{location_relationship, storage_location},
    errors::ServiceError,
    events::EventSender,
    repositories::{HierarchyRepository, ListFilter, Page},
};

/// Service for managing storage locations
#[derive(Clone)]
pub struct StorageLocationService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    lifecycle: Arc<LifecycleManager>,
}

impl StorageLocationService {
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

    #[instrument(skip(self, command), fields(code = %command.code, storage_area_id = command.storage_area_id))]
    pub async fn create_location(
        &self,
        command: CreateStorageLocationCommand,
    ) -> Result<storage_location::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(storage_location_id = command.id))]
    pub async fn update_location(
        &self,
        command: UpdateStorageLocationCommand,
    ) -> Result<storage_location::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Records the latest processing session on the location
    #[instrument(skip(self))]
    pub async fn attach_photo_session(
        &self,
        command: AttachPhotoSessionCommand,
    ) -> Result<storage_location::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_location(&self, id: i32) -> Result<storage_location::Model, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .require_location(id)
            .await
    }

    /// `filter.parent_id` selects the storage area
    #[instrument(skip(self))]
    pub async fn list_locations(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_location::Model>, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .list_locations(filter)
            .await
    }

    /// Relationships with the location on either side
    #[instrument(skip(self))]
    pub async fn location_relationships(
        &self,
        id: i32,
    ) -> Result<Vec<location_relationship::Model>, ServiceError> {
        let repo = HierarchyRepository::new(self.db_pool.as_ref());
        repo.require_location(id).await?;
        repo.relationships_of_location(id).await
    }

    pub async fn deactivate_location(&self, id: i32) -> Result<SoftDeleteOutcome, ServiceError> {
        self.lifecycle
            .soft_delete(HierarchyEntity::StorageLocation(id))
            .await
    }
}
