use chrono::{DateTime, Utc};
use geo::Polygon;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::geometry::{DerivedGeometry, RawGeometry};

/// Where an area sits inside its warehouse.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum CardinalPosition {
    #[sea_orm(string_value = "N")]
    #[serde(rename = "N")]
    #[strum(serialize = "N")]
    North,
    #[sea_orm(string_value = "S")]
    #[serde(rename = "S")]
    #[strum(serialize = "S")]
    South,
    #[sea_orm(string_value = "E")]
    #[serde(rename = "E")]
    #[strum(serialize = "E")]
    East,
    #[sea_orm(string_value = "W")]
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    West,
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    Center,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_areas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub warehouse_id: i32,
    #[sea_orm(nullable)]
    pub parent_area_id: Option<i32>,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    #[sea_orm(nullable)]
    pub position: Option<CardinalPosition>,
    #[sea_orm(column_type = "Json")]
    pub boundary: Json,
    pub area_m2: f64,
    pub centroid_longitude: f64,
    pub centroid_latitude: f64,
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id",
        on_delete = "Cascade"
    )]
    Warehouse,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentAreaId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    ParentArea,
    #[sea_orm(has_many = "super::storage_location::Entity")]
    StorageLocations,
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::storage_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageLocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn polygon(&self) -> Result<Polygon<f64>, ServiceError> {
        super::stored_polygon("storage_area", self.id, &self.boundary)
    }

    pub fn label(&self) -> String {
        format!("storage_area {}", self.code)
    }
}

impl ActiveModel {
    /// Writes a validated boundary together with every column derived from it.
    pub fn set_boundary(&mut self, polygon: &Polygon<f64>) {
        let derived = DerivedGeometry::from_polygon(polygon);
        self.boundary = Set(RawGeometry::from_polygon(polygon).into_json());
        self.area_m2 = Set(derived.area_m2);
        self.centroid_longitude = Set(derived.centroid[0]);
        self.centroid_latitude = Set(derived.centroid[1]);
        self.min_longitude = Set(derived.bbox.min_longitude);
        self.min_latitude = Set(derived.bbox.min_latitude);
        self.max_longitude = Set(derived.bbox.max_longitude);
        self.max_latitude = Set(derived.bbox.max_latitude);
    }
}
