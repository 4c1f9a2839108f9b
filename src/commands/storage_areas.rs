use async_trait::async_trait;
use chrono::Utc;
use geo::Polygon;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    commands::{codes, Command},
    db::DbPool,
    entities::{
        storage_area::{self, CardinalPosition},
        warehouse,
    },
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    geometry::{require_within, validate_boundary, RawGeometry, Shape},
    repositories::HierarchyRepository,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStorageAreaCommand {
    pub warehouse_id: i32,
    /// Enclosing area for nested areas
    pub parent_area_id: Option<i32>,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub position: Option<CardinalPosition>,
    pub boundary: RawGeometry,
}

#[async_trait]
impl Command for CreateStorageAreaCommand {
    type Result = storage_area::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(code = %self.code, warehouse_id = self.warehouse_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        let polygon =
            validate_boundary(&self.boundary).map_err(|e| ServiceError::geometry("boundary", e))?;
        let child_label = format!("storage_area {}", codes::normalize(&self.code));

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);

        let warehouse = repo.find_warehouse(self.warehouse_id).await?.ok_or_else(|| {
            ServiceError::ParentNotFound {
                child: child_label.clone(),
                parent: format!("warehouse {}", self.warehouse_id),
            }
        })?;
        let parent_area = match self.parent_area_id {
            Some(parent_id) => Some(resolve_parent_area(&repo, &warehouse, parent_id, &child_label).await?),
            None => None,
        };

        let code = codes::area_code(&self.code, &warehouse.code)?;
        if repo
            .code_in_use::<storage_area::Entity>(storage_area::Column::Code, &code)
            .await?
        {
            return Err(ServiceError::DuplicateCode {
                entity: "storage_area",
                code,
            });
        }

        check_placement(&polygon, &child_label, &warehouse, parent_area.as_ref())?;

        let now = Utc::now();
        let mut model = storage_area::ActiveModel {
            warehouse_id: Set(warehouse.id),
            parent_area_id: Set(parent_area.as_ref().map(|p| p.id)),
            code: Set(code),
            name: Set(self.name.trim().to_string()),
            position: Set(self.position),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.set_boundary(&polygon);

        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        info!(
            storage_area_id = saved.id,
            code = %saved.code,
            area_m2 = saved.area_m2,
            "Storage area created"
        );
        event_sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::StorageArea,
                id: saved.id,
                code: saved.code.clone(),
            })
            .await;

        Ok(saved)
    }
}

/// Partial update. `parent_area_id` re-parents the area inside its warehouse;
/// `detach_from_parent` turns it back into a top-level area.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateStorageAreaCommand {
    #[serde(default)]
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub position: Option<CardinalPosition>,
    pub boundary: Option<RawGeometry>,
    pub parent_area_id: Option<i32>,
    #[serde(default)]
    pub detach_from_parent: bool,
}

#[async_trait]
impl Command for UpdateStorageAreaCommand {
    type Result = storage_area::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(storage_area_id = self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        if self.detach_from_parent && self.parent_area_id.is_some() {
            return Err(ServiceError::ValidationError(
                "parent_area_id and detach_from_parent are mutually exclusive".to_string(),
            ));
        }
        let new_polygon = self
            .boundary
            .as_ref()
            .map(validate_boundary)
            .transpose()
            .map_err(|e| ServiceError::geometry("boundary", e))?;

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);
        let existing = repo.require_area(self.id).await?;
        let label = existing.label();
        let warehouse = repo.require_warehouse(existing.warehouse_id).await?;

        let target_parent_id = if self.detach_from_parent {
            None
        } else {
            self.parent_area_id.or(existing.parent_area_id)
        };
        let parent_changed = target_parent_id != existing.parent_area_id;

        let parent_area = match target_parent_id {
            Some(parent_id) => {
                let parent = resolve_parent_area(&repo, &warehouse, parent_id, &label).await?;
                if parent_changed && repo.area_ancestry(parent_id).await?.contains(&existing.id) {
                    return Err(ServiceError::ValidationError(format!(
                        "{} cannot be nested under itself or one of its descendants",
                        label
                    )));
                }
                Some(parent)
            }
            None => None,
        };

        if new_polygon.is_some() || parent_changed {
            let polygon = match &new_polygon {
                Some(polygon) => polygon.clone(),
                None => existing.polygon()?,
            };
            check_placement(&polygon, &label, &warehouse, parent_area.as_ref())?;
        }

        if let Some(polygon) = &new_polygon {
            for child in repo.child_areas(existing.id).await? {
                require_within(
                    Shape::Polygon(&child.polygon()?),
                    Some(polygon),
                    &child.label(),
                    &label,
                )?;
            }
            for location in repo.locations_of_areas(vec![existing.id]).await? {
                require_within(
                    Shape::Point(&location.point()),
                    Some(polygon),
                    &location.label(),
                    &label,
                )?;
            }
        }

        let mut model: storage_area::ActiveModel = existing.into();
        if let Some(name) = &self.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(position) = self.position {
            model.position = Set(Some(position));
        }
        if parent_changed {
            model.parent_area_id = Set(target_parent_id);
        }
        if let Some(polygon) = &new_polygon {
            model.set_boundary(polygon);
        }
        model.updated_at = Set(Utc::now());

        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(storage_area_id = saved.id, parent_changed, "Storage area updated");
        event_sender
            .publish(HierarchyEvent::Updated {
                level: HierarchyLevel::StorageArea,
                id: saved.id,
                geometry_changed: new_polygon.is_some(),
            })
            .await;

        Ok(saved)
    }
}

async fn resolve_parent_area<C: ConnectionTrait>(
    repo: &HierarchyRepository<'_, C>,
    warehouse: &warehouse::Model,
    parent_id: i32,
    child_label: &str,
) -> Result<storage_area::Model, ServiceError> {
    let parent = repo
        .find_area(parent_id)
        .await?
        .ok_or_else(|| ServiceError::ParentNotFound {
            child: child_label.to_string(),
            parent: format!("storage_area {}", parent_id),
        })?;
    if parent.warehouse_id != warehouse.id {
        return Err(ServiceError::ValidationError(format!(
            "parent {} belongs to another warehouse than {}",
            parent.label(),
            warehouse.label()
        )));
    }
    Ok(parent)
}

/// The area must lie inside its warehouse and, when nested, inside its parent area.
fn check_placement(
    polygon: &Polygon<f64>,
    label: &str,
    warehouse: &warehouse::Model,
    parent_area: Option<&storage_area::Model>,
) -> Result<(), ServiceError> {
    require_within(
        Shape::Polygon(polygon),
        Some(&warehouse.polygon()?),
        label,
        &warehouse.label(),
    )?;
    if let Some(parent) = parent_area {
        require_within(
            Shape::Polygon(polygon),
            Some(&parent.polygon()?),
            label,
            &parent.label(),
        )?;
    }
    Ok(())
}
