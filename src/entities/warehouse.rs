use chrono::{DateTime, Utc};
use geo::Polygon;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::geometry::{DerivedGeometry, RawGeometry};

/// Kind of growing structure a warehouse represents.
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
pub enum WarehouseType {
    #[sea_orm(string_value = "greenhouse")]
    Greenhouse,
    #[sea_orm(string_value = "shadehouse")]
    Shadehouse,
    #[sea_orm(string_value = "open_field")]
    OpenField,
    #[sea_orm(string_value = "tunnel")]
    Tunnel,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub warehouse_type: WarehouseType,
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
    #[sea_orm(has_many = "super::storage_area::Entity")]
    StorageAreas,
}

impl Related<super::storage_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageAreas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn polygon(&self) -> Result<Polygon<f64>, ServiceError> {
        super::stored_polygon("warehouse", self.id, &self.boundary)
    }

    pub fn label(&self) -> String {
        format!("warehouse {}", self.code)
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
