use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bin lifecycle. `Retired` is terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BinStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "retired")]
    Retired,
}

impl BinStatus {
    /// active ↔ maintenance, and either of them → retired.
    pub fn can_transition_to(self, next: BinStatus) -> bool {
        matches!(
            (self, next),
            (BinStatus::Active, BinStatus::Maintenance)
                | (BinStatus::Maintenance, BinStatus::Active)
                | (BinStatus::Active, BinStatus::Retired)
                | (BinStatus::Maintenance, BinStatus::Retired)
        )
    }

    pub fn is_active(self) -> bool {
        self != BinStatus::Retired
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_bins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub storage_location_id: i32,
    pub storage_bin_type_id: i32,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(nullable)]
    pub label: Option<String>,
    /// Written by the detection pipeline, see `commands::storage_bins::DetectionMetadata`.
    #[sea_orm(column_type = "Json", nullable)]
    pub detection_metadata: Option<Json>,
    pub status: BinStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::storage_location::Entity",
        from = "Column::StorageLocationId",
        to = "super::storage_location::Column::Id",
        on_delete = "Cascade"
    )]
    StorageLocation,
    #[sea_orm(
        belongs_to = "super::storage_bin_type::Entity",
        from = "Column::StorageBinTypeId",
        to = "super::storage_bin_type::Column::Id",
        on_delete = "Restrict"
    )]
    StorageBinType,
}

impl Related<super::storage_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageLocation.def()
    }
}

impl Related<super::storage_bin_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageBinType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::BinStatus::{self, *};
    use rstest::rstest;

    #[rstest]
    #[case(Active, Maintenance, true)]
    #[case(Maintenance, Active, true)]
    #[case(Active, Retired, true)]
    #[case(Maintenance, Retired, true)]
    #[case(Retired, Active, false)]
    #[case(Retired, Maintenance, false)]
    #[case(Retired, Retired, false)]
    #[case(Active, Active, false)]
    fn status_transitions(#[case] from: BinStatus, #[case] to: BinStatus, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn status_parses_from_snake_case() {
        assert_eq!("maintenance".parse::<BinStatus>().unwrap(), Maintenance);
        assert_eq!(Retired.to_string(), "retired");
    }
}
