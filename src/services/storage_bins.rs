use std::sync::Arc;

use tracing::instrument;

use super::lifecycle::{HierarchyEntity, LifecycleManager, SoftDeleteOutcome};
use crate::{
    commands::{
        storage_bins::{
            CreateStorageBinCommand, DetectionMetadata, RecordDetectionCommand,
            UpdateStorageBinCommand,
        },
        Command,
    },
    db::DbPool,
    entities::storage_bin::{self, BinStatus},
    errors::ServiceError,
    events::EventSender,
    repositories::{HierarchyRepository, ListFilter, Page},
};

/// Service for managing storage bins
#[derive(Clone)]
pub struct StorageBinService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    lifecycle: Arc<LifecycleManager>,
}

impl StorageBinService {
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

    #[instrument(skip(self, command), fields(code = %command.code, storage_location_id = command.storage_location_id))]
    pub async fn create_bin(
        &self,
        command: CreateStorageBinCommand,
    ) -> Result<storage_bin::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(storage_bin_id = command.id))]
    pub async fn update_bin(
        &self,
        command: UpdateStorageBinCommand,
    ) -> Result<storage_bin::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_bin(&self, id: i32) -> Result<storage_bin::Model, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .require_bin(id)
            .await
    }

    /// `filter.parent_id` selects the location; `active_only` hides retired bins
    #[instrument(skip(self))]
    pub async fn list_bins(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_bin::Model>, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .list_bins(filter)
            .await
    }

    pub async fn change_status(
        &self,
        id: i32,
        status: BinStatus,
    ) -> Result<storage_bin::Model, ServiceError> {
        self.lifecycle.change_bin_status(id, status).await
    }

    #[instrument(skip(self, metadata))]
    pub async fn record_detection(
        &self,
        id: i32,
        metadata: DetectionMetadata,
    ) -> Result<storage_bin::Model, ServiceError> {
        RecordDetectionCommand {
            bin_id: id,
            metadata,
        }
        .execute(self.db_pool.clone(), self.event_sender.clone())
        .await
    }

    /// Retires the bin
    pub async fn deactivate_bin(&self, id: i32) -> Result<SoftDeleteOutcome, ServiceError> {
        self.lifecycle
            .soft_delete(HierarchyEntity::StorageBin(id))
            .await
    }
}
