use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    commands::Command,
    db::DbPool,
    entities::location_relationship::{self, RelationshipType},
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    repositories::HierarchyRepository,
};

/// Links two locations outside the primary tree. At most one edge per
/// ordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationshipCommand {
    pub parent_location_id: i32,
    pub child_location_id: i32,
    pub relationship_type: RelationshipType,
}

#[async_trait]
impl Command for CreateRelationshipCommand {
    type Result = location_relationship::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(parent = self.parent_location_id, child = self.child_location_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        if self.parent_location_id == self.child_location_id {
            return Err(ServiceError::ValidationError(
                "a location cannot be related to itself".to_string(),
            ));
        }

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);
        repo.require_location(self.parent_location_id).await?;
        repo.require_location(self.child_location_id).await?;

        if repo
            .relationship_between(self.parent_location_id, self.child_location_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "relationship {} -> {} already exists",
                self.parent_location_id, self.child_location_id
            )));
        }

        let model = location_relationship::ActiveModel {
            parent_location_id: Set(self.parent_location_id),
            child_location_id: Set(self.child_location_id),
            relationship_type: Set(self.relationship_type),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        info!(relationship_id = saved.id, kind = %saved.relationship_type, "Location relationship created");
        event_sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::LocationRelationship,
                id: saved.id,
                code: format!("{}->{}", saved.parent_location_id, saved.child_location_id),
            })
            .await;

        Ok(saved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRelationshipCommand {
    pub id: i32,
}

#[async_trait]
impl Command for DeleteRelationshipCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(relationship_id = self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let result = location_relationship::Entity::delete_by_id(self.id)
            .exec(db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound {
                entity: "location_relationship",
                id: self.id,
            });
        }

        info!(relationship_id = self.id, "Location relationship deleted");
        event_sender
            .publish(HierarchyEvent::Deleted {
                level: HierarchyLevel::LocationRelationship,
                id: self.id,
            })
            .await;
        Ok(())
    }
}
