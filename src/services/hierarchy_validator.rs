//! Consistency audit over an arbitrary selection of hierarchy ids.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{storage_area, storage_bin, storage_location, warehouse},
    errors::ServiceError,
    repositories::HierarchyRepository,
};

/// Ids to audit. Any subset may be supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySelection {
    pub warehouse_id: Option<i32>,
    pub storage_area_id: Option<i32>,
    pub storage_location_id: Option<i32>,
    pub storage_bin_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NotFound,
    ParentMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyIssue {
    pub kind: IssueKind,
    pub entity: &'static str,
    pub id: i32,
    /// Parent id supplied in the selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_parent_id: Option<i32>,
    /// Parent id recorded on the row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_parent_id: Option<i32>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedHierarchy {
    pub warehouse: Option<warehouse::Model>,
    pub storage_area: Option<storage_area::Model>,
    pub storage_location: Option<storage_location::Model>,
    pub storage_bin: Option<storage_bin::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyValidation {
    pub valid: bool,
    pub errors: Vec<HierarchyIssue>,
    pub resolved: ResolvedHierarchy,
}

pub struct HierarchyValidator {
    db_pool: Arc<DbPool>,
}

impl HierarchyValidator {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Resolves every supplied id and checks each resolved child against the
    /// parent id supplied directly above it, even when that id does not exist. Collects every issue instead of
    /// stopping at the first; only storage faults are returned as `Err`.
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        selection: HierarchySelection,
    ) -> Result<HierarchyValidation, ServiceError> {
        let repo = HierarchyRepository::new(self.db_pool.as_ref());
        let mut errors = Vec::new();
        let mut resolved = ResolvedHierarchy::default();

        if let Some(id) = selection.warehouse_id {
            resolved.warehouse = repo.find_warehouse(id).await?;
            if resolved.warehouse.is_none() {
                errors.push(not_found("warehouse", id));
            }
        }
        if let Some(id) = selection.storage_area_id {
            resolved.storage_area = repo.find_area(id).await?;
            if resolved.storage_area.is_none() {
                errors.push(not_found("storage_area", id));
            }
        }
        if let Some(id) = selection.storage_location_id {
            resolved.storage_location = repo.find_location(id).await?;
            if resolved.storage_location.is_none() {
                errors.push(not_found("storage_location", id));
            }
        }
        if let Some(id) = selection.storage_bin_id {
            resolved.storage_bin = repo.find_bin(id).await?;
            if resolved.storage_bin.is_none() {
                errors.push(not_found("storage_bin", id));
            }
        }

        // Compared against the supplied parent id, resolved or not
        if let (Some(area), Some(warehouse_id)) = (&resolved.storage_area, selection.warehouse_id) {
            if area.warehouse_id != warehouse_id {
                errors.push(mismatch("storage_area", area.id, warehouse_id, area.warehouse_id));
            }
        }
        if let (Some(location), Some(area_id)) =
            (&resolved.storage_location, selection.storage_area_id)
        {
            if location.storage_area_id != area_id {
                errors.push(mismatch(
                    "storage_location",
                    location.id,
                    area_id,
                    location.storage_area_id,
                ));
            }
        }
        if let (Some(bin), Some(location_id)) =
            (&resolved.storage_bin, selection.storage_location_id)
        {
            if bin.storage_location_id != location_id {
                errors.push(mismatch(
                    "storage_bin",
                    bin.id,
                    location_id,
                    bin.storage_location_id,
                ));
            }
        }

        let valid = errors.is_empty();
        info!(valid, issues = errors.len(), "hierarchy validated");
        Ok(HierarchyValidation {
            valid,
            errors,
            resolved,
        })
    }
}

fn not_found(entity: &'static str, id: i32) -> HierarchyIssue {
    HierarchyIssue {
        kind: IssueKind::NotFound,
        entity,
        id,
        expected_parent_id: None,
        actual_parent_id: None,
        message: format!("{} {} not found", entity, id),
    }
}

fn mismatch(entity: &'static str, id: i32, expected: i32, actual: i32) -> HierarchyIssue {
    HierarchyIssue {
        kind: IssueKind::ParentMismatch,
        entity,
        id,
        expected_parent_id: Some(expected),
        actual_parent_id: Some(actual),
        message: format!(
            "{} {} belongs to parent {}, not {}",
            entity, id, actual, expected
        ),
    }
}
