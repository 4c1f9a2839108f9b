//! Soft deletion and bin status changes.
//!
//! Soft delete flips the row's own active flag (bins move to `retired`) and
//! nothing else. Children of a deactivated parent keep their state. Rows are
//! only removed through the foreign-key cascades of the storage layer.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    commands::{storage_bins::ChangeBinStatusCommand, Command},
    db::DbPool,
    entities::{
        storage_area, storage_bin,
        storage_bin::BinStatus,
        storage_location, warehouse,
    },
    errors::ServiceError,
    events::{EventSender, HierarchyEvent, HierarchyLevel},
    repositories::HierarchyRepository,
};

/// A row of one of the four primary levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "id", rename_all = "snake_case")]
pub enum HierarchyEntity {
    Warehouse(i32),
    StorageArea(i32),
    StorageLocation(i32),
    StorageBin(i32),
}

impl HierarchyEntity {
    pub fn level(&self) -> HierarchyLevel {
        match self {
            HierarchyEntity::Warehouse(_) => HierarchyLevel::Warehouse,
            HierarchyEntity::StorageArea(_) => HierarchyLevel::StorageArea,
            HierarchyEntity::StorageLocation(_) => HierarchyLevel::StorageLocation,
            HierarchyEntity::StorageBin(_) => HierarchyLevel::StorageBin,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            HierarchyEntity::Warehouse(id)
            | HierarchyEntity::StorageArea(id)
            | HierarchyEntity::StorageLocation(id)
            | HierarchyEntity::StorageBin(id) => id,
        }
    }
}

/// Result of a soft delete. `changed` is false when the row was already inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoftDeleteOutcome {
    pub level: HierarchyLevel,
    pub id: i32,
    pub changed: bool,
}

pub struct LifecycleManager {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LifecycleManager {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Marks one row inactive. Idempotent; `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn soft_delete(
        &self,
        target: HierarchyEntity,
    ) -> Result<SoftDeleteOutcome, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let changed = match target {
            HierarchyEntity::Warehouse(id) => deactivate_warehouse(&txn, id).await?,
            HierarchyEntity::StorageArea(id) => deactivate_area(&txn, id).await?,
            HierarchyEntity::StorageLocation(id) => deactivate_location(&txn, id).await?,
            HierarchyEntity::StorageBin(id) => retire_bin(&txn, id).await?,
        };
        txn.commit().await?;

        let outcome = SoftDeleteOutcome {
            level: target.level(),
            id: target.id(),
            changed,
        };
        if changed {
            info!(level = %outcome.level, id = outcome.id, "Deactivated");
            self.event_sender
                .publish(HierarchyEvent::Deactivated {
                    level: outcome.level,
                    id: outcome.id,
                })
                .await;
        }
        Ok(outcome)
    }

    /// Applies the bin status state machine.
    pub async fn change_bin_status(
        &self,
        bin_id: i32,
        status: BinStatus,
    ) -> Result<storage_bin::Model, ServiceError> {
        ChangeBinStatusCommand { bin_id, status }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }
}

async fn deactivate_warehouse<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ServiceError> {
    let existing = HierarchyRepository::new(conn).require_warehouse(id).await?;
    if !existing.active {
        return Ok(false);
    }
    let mut model: warehouse::ActiveModel = existing.into();
    model.active = Set(false);
    model.updated_at = Set(Utc::now());
    model.update(conn).await?;
    Ok(true)
}

async fn deactivate_area<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ServiceError> {
    let existing = HierarchyRepository::new(conn).require_area(id).await?;
    if !existing.active {
        return Ok(false);
    }
    let mut model: storage_area::ActiveModel = existing.into();
    model.active = Set(false);
    model.updated_at = Set(Utc::now());
    model.update(conn).await?;
    Ok(true)
}

async fn deactivate_location<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ServiceError> {
    let existing = HierarchyRepository::new(conn).require_location(id).await?;
    if !existing.active {
        return Ok(false);
    }
    let mut model: storage_location::ActiveModel = existing.into();
    model.active = Set(false);
    model.updated_at = Set(Utc::now());
    model.update(conn).await?;
    Ok(true)
}

/// Bins have no active flag; retiring is their soft delete.
async fn retire_bin<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ServiceError> {
    let existing = HierarchyRepository::new(conn).require_bin(id).await?;
    if existing.status == BinStatus::Retired {
        return Ok(false);
    }
    let mut model: storage_bin::ActiveModel = existing.into();
    model.status = Set(BinStatus::Retired);
    model.updated_at = Set(Utc::now());
    model.update(conn).await?;
    Ok(true)
}
