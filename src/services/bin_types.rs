use std::sync::Arc;

use tracing::instrument;

use crate::{
    commands::{
        bin_types::{CreateBinTypeCommand, DeleteBinTypeCommand},
        Command,
    },
    db::DbPool,
    entities::storage_bin_type,
    errors::ServiceError,
    events::EventSender,
    repositories::{HierarchyRepository, ListFilter, Page},
};

/// Bin type catalog
#[derive(Clone)]
pub struct BinTypeService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BinTypeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command), fields(code = %command.code))]
    pub async fn create_bin_type(
        &self,
        command: CreateBinTypeCommand,
    ) -> Result<storage_bin_type::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_bin_type(&self, id: i32) -> Result<storage_bin_type::Model, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .require_bin_type(id)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_bin_types(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_bin_type::Model>, ServiceError> {
        HierarchyRepository::new(self.db_pool.as_ref())
            .list_bin_types(filter)
            .await
    }

    /// Fails with `Conflict` while bins still reference the type
    #[instrument(skip(self))]
    pub async fn delete_bin_type(&self, id: i32) -> Result<(), ServiceError> {
        DeleteBinTypeCommand { id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}
