use std::sync::Arc;

use sea_orm::EntityTrait;
use tracing::instrument;

use crate::{
    commands::{
        relationships::{CreateRelationshipCommand, DeleteRelationshipCommand},
        Command,
    },
    db::DbPool,
    entities::location_relationship,
    errors::ServiceError,
    events::EventSender,
};

/// Auxiliary location graph
#[derive(Clone)]
pub struct RelationshipService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RelationshipService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_relationship(
        &self,
        command: CreateRelationshipCommand,
    ) -> Result<location_relationship::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_relationship(
        &self,
        id: i32,
    ) -> Result<location_relationship::Model, ServiceError> {
        location_relationship::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "location_relationship",
                id,
            })
    }

    #[instrument(skip(self))]
    pub async fn delete_relationship(&self, id: i32) -> Result<(), ServiceError> {
        DeleteRelationshipCommand { id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}
