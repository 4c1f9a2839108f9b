use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    commands::{codes, Command},
    db::DbPool,
    entities::storage_bin::{self, BinStatus},
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    repositories::HierarchyRepository,
};

/// Pixel-space bounding box of a detected container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Detection output written into a bin by the ML pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectionMetadata {
    /// Segmentation outline, pixel coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Vec<[f64; 2]>>,
    pub bbox: PixelBox,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
}

impl DetectionMetadata {
    pub fn check(&self) -> Result<(), ServiceError> {
        let invalid = |msg: &str| -> Result<(), ServiceError> {
            Err(ServiceError::ValidationError(msg.to_string()))
        };

        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return invalid("confidence must be between 0 and 1");
        }
        let PixelBox {
            x,
            y,
            width,
            height,
        } = self.bbox;
        if ![x, y, width, height].iter().all(|v| v.is_finite()) || x < 0.0 || y < 0.0 {
            return invalid("bbox must have finite, non-negative x and y");
        }
        if width <= 0.0 || height <= 0.0 {
            return invalid("bbox width and height must be positive");
        }
        if let Some(mask) = &self.mask {
            if mask.len() < 3 {
                return invalid("mask needs at least 3 points");
            }
            if mask.iter().flatten().any(|v| !v.is_finite()) {
                return invalid("mask coordinates must be finite");
            }
        }
        if matches!(self.estimated_count, Some(n) if n < 0) {
            return invalid("estimated_count must not be negative");
        }
        if matches!(&self.container_type, Some(t) if t.trim().is_empty()) {
            return invalid("container_type must not be blank");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStorageBinCommand {
    pub storage_location_id: i32,
    pub storage_bin_type_id: i32,
    #[validate(length(min = 1, max = 128))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub label: Option<String>,
    pub detection_metadata: Option<DetectionMetadata>,
}

#[async_trait]
impl Command for CreateStorageBinCommand {
    type Result = storage_bin::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(code = %self.code, storage_location_id = self.storage_location_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        if let Some(metadata) = &self.detection_metadata {
            metadata.check()?;
        }
        let child_label = format!("storage_bin {}", codes::normalize(&self.code));

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);

        let location = repo
            .find_location(self.storage_location_id)
            .await?
            .ok_or_else(|| ServiceError::ParentNotFound {
                child: child_label.clone(),
                parent: format!("storage_location {}", self.storage_location_id),
            })?;
        repo.find_bin_type(self.storage_bin_type_id)
            .await?
            .ok_or_else(|| ServiceError::ParentNotFound {
                child: child_label.clone(),
                parent: format!("storage_bin_type {}", self.storage_bin_type_id),
            })?;

        let code = codes::bin_code(&self.code, &location.code)?;
        if repo
            .code_in_use::<storage_bin::Entity>(storage_bin::Column::Code, &code)
            .await?
        {
            return Err(ServiceError::DuplicateCode {
                entity: "storage_bin",
                code,
            });
        }

        let detection_metadata = self
            .detection_metadata
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let now = Utc::now();
        let model = storage_bin::ActiveModel {
            storage_location_id: Set(location.id),
            storage_bin_type_id: Set(self.storage_bin_type_id),
            code: Set(code),
            label: Set(self.label.as_deref().map(|l| l.trim().to_string())),
            detection_metadata: Set(detection_metadata),
            status: Set(BinStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let saved = model.insert(&txn).await?;
        txn.commit().await?;

        info!(storage_bin_id = saved.id, code = %saved.code, "Storage bin created");
        event_sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::StorageBin,
                id: saved.id,
                code: saved.code.clone(),
            })
            .await;

        Ok(saved)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateStorageBinCommand {
    #[serde(default)]
    pub id: i32,
    #[validate(length(min = 1, max = 200))]
    pub label: Option<String>,
    pub storage_bin_type_id: Option<i32>,
}

#[async_trait]
impl Command for UpdateStorageBinCommand {
    type Result = storage_bin::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(storage_bin_id = self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let txn = db_pool.begin().await?;
        let repo = HierarchyRepository::new(&txn);
        let existing = repo.require_bin(self.id).await?;
        if let Some(bin_type_id) = self.storage_bin_type_id {
            repo.find_bin_type(bin_type_id)
                .await?
                .ok_or_else(|| ServiceError::ParentNotFound {
                    child: format!("storage_bin {}", existing.code),
                    parent: format!("storage_bin_type {}", bin_type_id),
                })?;
        }

        let mut model: storage_bin::ActiveModel = existing.into();
        if let Some(label) = &self.label {
            model.label = Set(Some(label.trim().to_string()));
        }
        if let Some(bin_type_id) = self.storage_bin_type_id {
            model.storage_bin_type_id = Set(bin_type_id);
        }
        model.updated_at = Set(Utc::now());

        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(storage_bin_id = saved.id, "Storage bin updated");
        event_sender
            .publish(HierarchyEvent::Updated {
                level: HierarchyLevel::StorageBin,
                id: saved.id,
                geometry_changed: false,
            })
            .await;

        Ok(saved)
    }
}

/// Moves a bin along its status state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeBinStatusCommand {
    #[serde(default)]
    pub bin_id: i32,
    pub status: BinStatus,
}

#[async_trait]
impl Command for ChangeBinStatusCommand {
    type Result = storage_bin::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(storage_bin_id = self.bin_id, to = %self.status))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let txn = db_pool.begin().await?;
        let existing = HierarchyRepository::new(&txn)
            .require_bin(self.bin_id)
            .await?;
        let from = existing.status;

        if !from.can_transition_to(self.status) {
            warn!(from = %from, to = %self.status, "rejected bin status transition");
            return Err(ServiceError::InvalidTransition {
                from: from.to_string(),
                to: self.status.to_string(),
            });
        }

        let mut model: storage_bin::ActiveModel = existing.into();
        model.status = Set(self.status);
        model.updated_at = Set(Utc::now());
        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(storage_bin_id = saved.id, from = %from, to = %saved.status, "Bin status changed");
        event_sender
            .publish(HierarchyEvent::BinStatusChanged {
                bin_id: saved.id,
                from,
                to: saved.status,
            })
            .await;

        Ok(saved)
    }
}

/// Stores the latest detection for a bin, replacing any previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDetectionCommand {
    #[serde(default)]
    pub bin_id: i32,
    pub metadata: DetectionMetadata,
}

#[async_trait]
impl Command for RecordDetectionCommand {
    type Result = storage_bin::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(storage_bin_id = self.bin_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.metadata.check()?;
        let metadata = serde_json::to_value(&self.metadata)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let txn = db_pool.begin().await?;
        let existing = HierarchyRepository::new(&txn)
            .require_bin(self.bin_id)
            .await?;
        if !existing.status.is_active() {
            return Err(ServiceError::Conflict(format!(
                "storage_bin {} is retired",
                existing.code
            )));
        }

        let mut model: storage_bin::ActiveModel = existing.into();
        model.detection_metadata = Set(Some(metadata));
        model.updated_at = Set(Utc::now());
        let saved = model.update(&txn).await?;
        txn.commit().await?;

        info!(
            storage_bin_id = saved.id,
            confidence = self.metadata.confidence,
            "Detection recorded"
        );
        event_sender
            .publish(HierarchyEvent::DetectionRecorded {
                bin_id: saved.id,
                confidence: self.metadata.confidence,
                estimated_count: self.metadata.estimated_count,
            })
            .await;

        Ok(saved)
    }
}
