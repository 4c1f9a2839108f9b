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
pub enum BinCategory {
    #[sea_orm(string_value = "plug")]
    Plug,
    #[sea_orm(string_value = "seedling_tray")]
    SeedlingTray,
    #[sea_orm(string_value = "box")]
    Box,
    #[sea_orm(string_value = "segment")]
    Segment,
    #[sea_orm(string_value = "pot")]
    Pot,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_bin_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub category: BinCategory,
    #[sea_orm(nullable)]
    pub capacity: Option<i32>,
    #[sea_orm(nullable)]
    pub length_cm: Option<f64>,
    #[sea_orm(nullable)]
    pub width_cm: Option<f64>,
    #[sea_orm(nullable)]
    pub height_cm: Option<f64>,
    pub is_grid: bool,
    #[sea_orm(nullable)]
    pub grid_rows: Option<i32>,
    #[sea_orm(nullable)]
    pub grid_columns: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::storage_bin::Entity")]
    StorageBins,
}

impl Related<super::storage_bin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageBins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
