use std::sync::Arc;

use tracing::instrument;

use super::lifecycle::{HierarchyEntity, LifecycleManager, SoftDeleteOutcome};
use crate::{
    commands::{
        warehouses::{CreateWarehouseCommand, UpdateWarehouseCommand},
        Command,
    },
    db::DbPool,
    entities::warehouse,
    errors::ServiceError,
    events::EventSender,
    repositories::{HierarchyRepository, ListFilter, Page},
};

/// Service for managing warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    lifecycle: Arc<LifecycleManager>,
}

impl WarehouseService {
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

    /// Creates a warehouse from a validated boundary
    #[instrument(skip(self, command), fields(code = %command.code))]
    pub async fn create_warehouse(
        &self,
        command: CreateWarehouseCommand,
    ) -> Result<warehouse::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(warehouse_id = command.id))]
    pub async fn update_warehouse(
        &self,
        command: UpdateWarehouseCommand,
    ) -> Result<warehouse::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Gets a warehouse by id, inactive ones included
    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: i32) -> Result<warehouse::Model, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .require_warehouse(id)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(
        &self,
        filter: ListFilter,
    ) -> Result<Page<warehouse::Model>, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .list_warehouses(filter)
            .await
    }

    /// Soft delete; areas stay untouched
    pub async fn deactivate_warehouse(&self, id: i32) -> Result<SoftDeleteOutcome, ServiceError> {
        self.lifecycle
            .soft_delete(HierarchyEntity::Warehouse(id))
            .await
    }
}
