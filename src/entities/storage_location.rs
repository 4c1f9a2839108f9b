use chrono::{DateTime, Utc};
use geo::Point;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::geometry::DerivedGeometry;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub storage_area_id: i32,
    #[sea_orm(unique)]
    pub code: String,
    /// Physical tracking code printed at the location.
    #[sea_orm(nullable)]
    pub qr_code: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    /// Always zero; kept so every level exposes an area.
    pub area_m2: f64,
    #[sea_orm(column_type = "Json", nullable)]
    pub position_metadata: Option<Json>,
    /// Latest processing session that used this location. The session owns
    /// the authoritative reference; this column is a back-pointer.
    #[sea_orm(nullable)]
    pub photo_session_id: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::storage_area::Entity",
        from = "Column::StorageAreaId",
        to = "super::storage_area::Column::Id",
        on_delete = "Cascade"
    )]
    StorageArea,
    #[sea_orm(has_many = "super::storage_bin::Entity")]
    StorageBins,
}

impl Related<super::storage_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageArea.def()
    }
}

impl Related<super::storage_bin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StorageBins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    pub fn label(&self) -> String {
        format!("storage_location {}", self.code)
    }
}

impl ActiveModel {
    pub fn set_point(&mut self, point: &Point<f64>) {
        let derived = DerivedGeometry::from_point(point);
        self.longitude = Set(derived.centroid[0]);
        self.latitude = Set(derived.centroid[1]);
        self.area_m2 = Set(derived.area_m2);
    }
}
