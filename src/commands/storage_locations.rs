use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{prelude::Json, ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    commands::{codes, Command},
    db::DbPool,
    entities::storage_location,
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    geometry::{require_within, validate_point, RawGeometry, Shape},
    repositories::HierarchyRepository,
};

/// Free-form metadata must at least be a JSON object.
fn check_position_metadata(metadata: Option<&Json>) -> Result<(), ServiceError> {
    match metadata {
        Some(value) if !value.is_object() => Err(ServiceError::ValidationError(
            "position_metadata must be a JSON object".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStorageLocationCommand {
    pub storage_area_id: i32,
    #[validate(length(min = 1, max = 128))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub qr_code: Option<String>,
    pub coordinates: RawGeometry,
    pub position_metadata: Option<Json>,
}

#[async_trait]
impl Command for CreateStorageLocationCommand {
    type Result = storage_location::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(code = %self.code, storage_area_id = self.storage_area_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        check_position_metadata(self.position_metadata.as_ref())?;
        let point = validate_point(&self.coordinates)
            .map_err(|e| ServiceError::geometry("coordinates", e))?;
        let child_label = format!("storage_location {}", codes::normalize(&self.code));

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);

        let area = repo
            .find_area(self.storage_area_id)
            .await?
            .ok_or_else(|| ServiceError::ParentNotFound {
                child: child_label.clone(),
                parent: format!("storage_area {}", self.storage_area_id),
            })?;

        let code = codes::location_code(&self.code, &area.code)?;
        if repo
            .code_in_use::<storage_location::Entity>(storage_location::Column::Code, &code)
            .await?
        {
            return Err(ServiceError::DuplicateCode {
                entity: "storage_location",
                code,
            });
        }

        require_within(
            Shape::Point(&point),
            Some(&area.polygon()?),
            &child_label,
            &area.label(),
        )?;

        let now = Utc::now();
        let mut model = storage_location::ActiveModel {
            storage_area_id: Set(area.id),
            code: Set(code),
            qr_code: Set(self.qr_code.as_deref().map(|q| q.trim().to_string())),
            position_metadata: Set(self.position_metadata.clone()),
            photo_session_id: Set(None),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.set_point(&point);

        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        info!(
            storage_location_id = saved.id,
            code = %saved.code,
            longitude = saved.longitude,
            latitude = saved.latitude,
            "Storage location created"
        );
        event_sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::StorageLocation,
                id: saved.id,
                code: saved.code.clone(),
            })
            .await;

        Ok(saved)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateStorageLocationCommand {
    #[serde(default)]
    pub id: i32,
    #[validate(length(min = 1, max = 100))]
    pub qr_code: Option<String>,
    pub coordinates: Option<RawGeometry>,
    pub position_metadata: Option<Json>,
}

#[async_trait]
impl Command for UpdateStorageLocationCommand {
    type Result = storage_location::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(storage_location_id = self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        check_position_metadata(self.position_metadata.as_ref())?;
        let point = self
            .coordinates
            .as_ref()
            .map(validate_point)
            .transpose()
            .map_err(|e| ServiceError::geometry("coordinates", e))?;

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);
        let existing = repo.require_location(self.id).await?;

        if let Some(point) = &point {
            let area = repo.find_area(existing.storage_area_id).await?;
            let area_polygon = area.as_ref().map(|a| a.polygon()).transpose()?;
            let area_label = area
                .as_ref()
                .map(|a| a.label())
                .unwrap_or_else(|| format!("storage_area {}", existing.storage_area_id));
            require_within(
                Shape::Point(point),
                area_polygon.as_ref(),
                &existing.label(),
                &area_label,
            )?;
        }

        let mut model: storage_location::ActiveModel = existing.into();
        if let Some(qr_code) = &self.qr_code {
            model.qr_code = Set(Some(qr_code.trim().to_string()));
        }
        if let Some(metadata) = &self.position_metadata {
            model.position_metadata = Set(Some(metadata.clone()));
        }
        if let Some(point) = &point {
            model.set_point(point);
        }
        model.updated_at = Set(Utc::now());

        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(storage_location_id = saved.id, "Storage location updated");
        event_sender
            .publish(HierarchyEvent::Updated {
                level: HierarchyLevel::StorageLocation,
                id: saved.id,
                geometry_changed: point.is_some(),
            })
            .await;

        Ok(saved)
    }
}

/// Second phase of the location/session two-phase insert: the session row
/// already references the location, this patches the back-pointer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachPhotoSessionCommand {
    #[serde(default)]
    pub location_id: i32,
    #[validate(range(min = 1))]
    pub session_id: i32,
}

#[async_trait]
impl Command for AttachPhotoSessionCommand {
    type Result = storage_location::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(storage_location_id = self.location_id, session_id = self.session_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let txn = db_pool.begin().await?;
        let existing = HierarchyRepository::new(&txn)
            .require_location(self.location_id)
            .await?;

        let mut model: storage_location::ActiveModel = existing.into();
        model.photo_session_id = Set(Some(self.session_id));
        model.updated_at = Set(Utc::now());
        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(
            storage_location_id = saved.id,
            session_id = self.session_id,
            "Photo session attached"
        );
        event_sender
            .publish(HierarchyEvent::PhotoSessionAttached {
                location_id: saved.id,
                session_id: self.session_id,
            })
            .await;

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn position_metadata_must_be_an_object() {
        assert!(check_position_metadata(None).is_ok());
        assert!(check_position_metadata(Some(&json!({"row": 3, "side": "left"}))).is_ok());
        assert!(matches!(
            check_position_metadata(Some(&json!([1, 2]))),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
