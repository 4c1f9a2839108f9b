use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::{Validate, ValidationError};

use crate::{
    commands::{codes, Command},
    db::DbPool,
    entities::storage_bin_type::{self, BinCategory},
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    repositories::HierarchyRepository,
};

fn positive_dimension(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("positive_dimension"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBinTypeCommand {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: BinCategory,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    #[validate(custom = "positive_dimension")]
    pub length_cm: Option<f64>,
    #[validate(custom = "positive_dimension")]
    pub width_cm: Option<f64>,
    #[validate(custom = "positive_dimension")]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub is_grid: bool,
    #[validate(range(min = 1))]
    pub grid_rows: Option<i32>,
    #[validate(range(min = 1))]
    pub grid_columns: Option<i32>,
}

impl CreateBinTypeCommand {
    /// Grid types need both dimensions; non-grid types take neither.
    fn check_grid(&self) -> Result<(), ServiceError> {
        match (self.is_grid, self.grid_rows, self.grid_columns) {
            (true, Some(_), Some(_)) | (false, None, None) => Ok(()),
            (true, _, _) => Err(ServiceError::ValidationError(
                "grid bin types require grid_rows and grid_columns".to_string(),
            )),
            (false, _, _) => Err(ServiceError::ValidationError(
                "grid_rows and grid_columns are only allowed when is_grid is set".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Command for CreateBinTypeCommand {
    type Result = storage_bin_type::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(code = %self.code))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        self.check_grid()?;
        let code = codes::bin_type_code(&self.code)?;

        let txn = db_pool.begin().await?;
        if HierarchyRepository::new(&txn)
            .code_in_use::<storage_bin_type::Entity>(storage_bin_type::Column::Code, &code)
            .await?
        {
            return Err(ServiceError::DuplicateCode {
                entity: "storage_bin_type",
                code,
            });
        }

        let now = Utc::now();
        let model = storage_bin_type::ActiveModel {
            code: Set(code),
            name: Set(self.name.trim().to_string()),
            category: Set(self.category),
            capacity: Set(self.capacity),
            length_cm: Set(self.length_cm),
            width_cm: Set(self.width_cm),
            height_cm: Set(self.height_cm),
            is_grid: Set(self.is_grid),
            grid_rows: Set(self.grid_rows),
            grid_columns: Set(self.grid_columns),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        info!(storage_bin_type_id = saved.id, code = %saved.code, "Bin type created");
        event_sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::StorageBinType,
                id: saved.id,
                code: saved.code.clone(),
            })
            .await;

        Ok(saved)
    }
}

/// Removes a catalog entry. Refused while any bin references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBinTypeCommand {
    pub id: i32,
}

#[async_trait]
impl Command for DeleteBinTypeCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(storage_bin_type_id = self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);
        let existing = repo.require_bin_type(self.id).await?;

        if repo.bin_type_in_use(existing.id).await? {
            return Err(ServiceError::Conflict(format!(
                "storage_bin_type {} is referenced by storage bins",
                existing.code
            )));
        }

        existing.delete(&txn).await?;
        txn.commit().await?;

        info!(storage_bin_type_id = self.id, "Bin type deleted");
        event_sender
            .publish(HierarchyEvent::Deleted {
                level: HierarchyLevel::StorageBinType,
                id: self.id,
            })
            .await;
        Ok(())
    }
}
