use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    commands::{codes, Command},
    db::DbPool,
    entities::warehouse::{self, WarehouseType},
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    geometry::{require_within, validate_boundary, RawGeometry, Shape},
    repositories::HierarchyRepository,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWarehouseCommand {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub warehouse_type: WarehouseType,
    pub boundary: RawGeometry,
}

#[async_trait]
impl Command for CreateWarehouseCommand {
    type Result = warehouse::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(code = %self.code))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        let code = codes::warehouse_code(&self.code)?;
        let polygon =
            validate_boundary(&self.boundary).map_err(|e| ServiceError::geometry("boundary", e))?;

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);

        if repo
            .code_in_use::<warehouse::Entity>(warehouse::Column::Code, &code)
            .await?
        {
            return Err(ServiceError::DuplicateCode {
                entity: "warehouse",
                code,
            });
        }

        let now = Utc::now();
        let mut model = warehouse::ActiveModel {
            code: Set(code),
            name: Set(self.name.trim().to_string()),
            warehouse_type: Set(self.warehouse_type),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.set_boundary(&polygon);

        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        info!(
            warehouse_id = saved.id,
            code = %saved.code,
            area_m2 = saved.area_m2,
            "Warehouse created"
        );
        event_sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::Warehouse,
                id: saved.id,
                code: saved.code.clone(),
            })
            .await;

        Ok(saved)
    }
}

/// Partial update. The code is immutable because every descendant code
/// embeds it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateWarehouseCommand {
    #[serde(default)]
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub warehouse_type: Option<WarehouseType>,
    pub boundary: Option<RawGeometry>,
}

#[async_trait]
impl Command for UpdateWarehouseCommand {
    type Result = warehouse::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(warehouse_id = self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        let polygon = self
            .boundary
            .as_ref()
            .map(validate_boundary)
            .transpose()
            .map_err(|e| ServiceError::geometry("boundary", e))?;

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);
        let existing = repo.require_warehouse(self.id).await?;

        if let Some(polygon) = &polygon {
            // Every area, nested ones included, must still lie inside.
            for area in repo.areas_of_warehouse(existing.id).await? {
                require_within(
                    Shape::Polygon(&area.polygon()?),
                    Some(polygon),
                    &area.label(),
                    &existing.label(),
                )?;
            }
        }

        let mut model: warehouse::ActiveModel = existing.into();
        if let Some(name) = &self.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(warehouse_type) = self.warehouse_type {
            model.warehouse_type = Set(warehouse_type);
        }
        if let Some(polygon) = &polygon {
            model.set_boundary(polygon);
        }
        model.updated_at = Set(Utc::now());

        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(warehouse_id = saved.id, "Warehouse updated");
        event_sender
            .publish(HierarchyEvent::Updated {
                level: HierarchyLevel::Warehouse,
                id: saved.id,
                geometry_changed: polygon.is_some(),
            })
            .await;

        Ok(saved)
    }
}
