use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

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
pub enum RelationshipType {
    #[sea_orm(string_value = "contains")]
    Contains,
    #[sea_orm(string_value = "adjacent_to")]
    AdjacentTo,
}

/// Directed edge between two locations, independent of the primary tree.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_relationships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub parent_location_id: i32,
    pub child_location_id: i32,
    pub relationship_type: RelationshipType,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::storage_location::Entity",
        from = "Column::ParentLocationId",
        to = "super::storage_location::Column::Id",
        on_delete = "Cascade"
    )]
    ParentLocation,
    #[sea_orm(
        belongs_to = "super::storage_location::Entity",
        from = "Column::ChildLocationId",
        to = "super::storage_location::Column::Id",
        on_delete = "Cascade"
    )]
    ChildLocation,
}

impl ActiveModelBehavior for ActiveModel {}
