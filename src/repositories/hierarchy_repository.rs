use std::collections::HashSet;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use tracing::debug;

use super::{ListFilter, Page};
use crate::entities::{
    location_relationship, storage_area, storage_bin, storage_bin::BinStatus, storage_bin_type,
    storage_location, warehouse,
};
use crate::errors::ServiceError;
use crate::geometry::{containment::covers, point, Shape};

/// Indexed lookups over the storage hierarchy.
///
/// Generic over the connection so the same queries run on the pool for reads
/// and inside a transaction for mutations.
pub struct HierarchyRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> HierarchyRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_warehouse(&self, id: i32) -> Result<Option<warehouse::Model>, ServiceError> {
        Ok(warehouse::Entity::find_by_id(id).one(self.conn).await?)
    }

    pub async fn find_area(&self, id: i32) -> Result<Option<storage_area::Model>, ServiceError> {
        Ok(storage_area::Entity::find_by_id(id).one(self.conn).await?)
    }

    pub async fn find_location(
        &self,
        id: i32,
    ) -> Result<Option<storage_location::Model>, ServiceError> {
        Ok(storage_location::Entity::find_by_id(id).one(self.conn).await?)
    }

    pub async fn find_bin(&self, id: i32) -> Result<Option<storage_bin::Model>, ServiceError> {
        Ok(storage_bin::Entity::find_by_id(id).one(self.conn).await?)
    }

    pub async fn find_bin_type(
        &self,
        id: i32,
    ) -> Result<Option<storage_bin_type::Model>, ServiceError> {
        Ok(storage_bin_type::Entity::find_by_id(id).one(self.conn).await?)
    }

    pub async fn require_warehouse(&self, id: i32) -> Result<warehouse::Model, ServiceError> {
        self.find_warehouse(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "warehouse",
                id,
            })
    }

    pub async fn require_area(&self, id: i32) -> Result<storage_area::Model, ServiceError> {
        self.find_area(id).await?.ok_or(ServiceError::NotFound {
            entity: "storage_area",
            id,
        })
    }

    pub async fn require_location(&self, id: i32) -> Result<storage_location::Model, ServiceError> {
        self.find_location(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "storage_location",
                id,
            })
    }

    pub async fn require_bin(&self, id: i32) -> Result<storage_bin::Model, ServiceError> {
        self.find_bin(id).await?.ok_or(ServiceError::NotFound {
            entity: "storage_bin",
            id,
        })
    }

    pub async fn require_bin_type(&self, id: i32) -> Result<storage_bin_type::Model, ServiceError> {
        self.find_bin_type(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "storage_bin_type",
                id,
            })
    }

    /// Uniqueness pre-check. The unique index remains the final authority, so
    /// two concurrent inserts of the same code can both pass this check.
    pub async fn code_in_use<E>(&self, column: E::Column, code: &str) -> Result<bool, ServiceError>
    where
        E: EntityTrait,
    {
        Ok(E::find()
            .filter(column.eq(code))
            .one(self.conn)
            .await?
            .is_some())
    }

    /// First active warehouse, by id, whose boundary covers the point.
    pub async fn warehouse_containing(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<Option<warehouse::Model>, ServiceError> {
        let candidates = warehouse::Entity::find()
            .filter(warehouse::Column::Active.eq(true))
            .filter(warehouse::Column::MinLongitude.lte(longitude))
            .filter(warehouse::Column::MaxLongitude.gte(longitude))
            .filter(warehouse::Column::MinLatitude.lte(latitude))
            .filter(warehouse::Column::MaxLatitude.gte(latitude))
            .order_by_asc(warehouse::Column::Id)
            .all(self.conn)
            .await?;
        debug!(candidates = candidates.len(), "warehouse bbox candidates");

        let target = point(longitude, latitude);
        for candidate in candidates {
            if covers(&candidate.polygon()?, Shape::Point(&target)) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Most deeply nested active area of the warehouse whose boundary covers
    /// the point. Equal depths go to the lowest id.
    pub async fn area_containing(
        &self,
        warehouse_id: i32,
        longitude: f64,
        latitude: f64,
    ) -> Result<Option<storage_area::Model>, ServiceError> {
        let candidates = storage_area::Entity::find()
            .filter(storage_area::Column::WarehouseId.eq(warehouse_id))
            .filter(storage_area::Column::Active.eq(true))
            .filter(storage_area::Column::MinLongitude.lte(longitude))
            .filter(storage_area::Column::MaxLongitude.gte(longitude))
            .filter(storage_area::Column::MinLatitude.lte(latitude))
            .filter(storage_area::Column::MaxLatitude.gte(latitude))
            .order_by_asc(storage_area::Column::Id)
            .all(self.conn)
            .await?;
        debug!(candidates = candidates.len(), "storage area bbox candidates");

        let target = point(longitude, latitude);
        let mut deepest: Option<(usize, storage_area::Model)> = None;
        for candidate in candidates {
            if !covers(&candidate.polygon()?, Shape::Point(&target)) {
                continue;
            }
            let depth = self.area_ancestry(candidate.id).await?.len();
            if deepest.as_ref().map_or(true, |(best, _)| depth > *best) {
                deepest = Some((depth, candidate));
            }
        }
        Ok(deepest.map(|(_, area)| area))
    }

    /// Active location of the area stored at exactly this point.
    pub async fn location_at(
        &self,
        storage_area_id: i32,
        longitude: f64,
        latitude: f64,
    ) -> Result<Option<storage_location::Model>, ServiceError> {
        Ok(storage_location::Entity::find()
            .filter(storage_location::Column::StorageAreaId.eq(storage_area_id))
            .filter(storage_location::Column::Active.eq(true))
            .filter(storage_location::Column::Longitude.eq(longitude))
            .filter(storage_location::Column::Latitude.eq(latitude))
            .order_by_asc(storage_location::Column::Id)
            .one(self.conn)
            .await?)
    }

    /// Every area of the warehouse, nested ones included.
    pub async fn areas_of_warehouse(
        &self,
        warehouse_id: i32,
    ) -> Result<Vec<storage_area::Model>, ServiceError> {
        Ok(storage_area::Entity::find()
            .filter(storage_area::Column::WarehouseId.eq(warehouse_id))
            .order_by_asc(storage_area::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn child_areas(
        &self,
        parent_area_id: i32,
    ) -> Result<Vec<storage_area::Model>, ServiceError> {
        Ok(storage_area::Entity::find()
            .filter(storage_area::Column::ParentAreaId.eq(parent_area_id))
            .order_by_asc(storage_area::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn locations_of_areas(
        &self,
        area_ids: Vec<i32>,
    ) -> Result<Vec<storage_location::Model>, ServiceError> {
        if area_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(storage_location::Entity::find()
            .filter(storage_location::Column::StorageAreaId.is_in(area_ids))
            .order_by_asc(storage_location::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn bins_of_locations(
        &self,
        location_ids: Vec<i32>,
    ) -> Result<Vec<storage_bin::Model>, ServiceError> {
        if location_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(storage_bin::Entity::find()
            .filter(storage_bin::Column::StorageLocationId.is_in(location_ids))
            .order_by_asc(storage_bin::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn bin_type_in_use(&self, bin_type_id: i32) -> Result<bool, ServiceError> {
        Ok(storage_bin::Entity::find()
            .filter(storage_bin::Column::StorageBinTypeId.eq(bin_type_id))
            .one(self.conn)
            .await?
            .is_some())
    }

    /// Ids from `area_id` up to its root, `area_id` first.
    ///
    /// Walks `parent_area_id` by repeated lookup. A chain that revisits an id
    /// is reported as a validation error.
    pub async fn area_ancestry(&self, area_id: i32) -> Result<Vec<i32>, ServiceError> {
        let mut chain = vec![area_id];
        let mut seen = HashSet::from([area_id]);
        let mut current = self.require_area(area_id).await?.parent_area_id;

        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                return Err(ServiceError::ValidationError(format!(
                    "storage area {} has a cyclic parent chain",
                    area_id
                )));
            }
            chain.push(parent_id);
            current = self.require_area(parent_id).await?.parent_area_id;
        }
        Ok(chain)
    }

    pub async fn relationship_between(
        &self,
        parent_location_id: i32,
        child_location_id: i32,
    ) -> Result<Option<location_relationship::Model>, ServiceError> {
        Ok(location_relationship::Entity::find()
            .filter(location_relationship::Column::ParentLocationId.eq(parent_location_id))
            .filter(location_relationship::Column::ChildLocationId.eq(child_location_id))
            .one(self.conn)
            .await?)
    }

    /// Relationships where the location appears on either side.
    pub async fn relationships_of_location(
        &self,
        location_id: i32,
    ) -> Result<Vec<location_relationship::Model>, ServiceError> {
        Ok(location_relationship::Entity::find()
            .filter(
                location_relationship::Column::ParentLocationId
                    .eq(location_id)
                    .or(location_relationship::Column::ChildLocationId.eq(location_id)),
            )
            .order_by_asc(location_relationship::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn list_warehouses(
        &self,
        filter: ListFilter,
    ) -> Result<Page<warehouse::Model>, ServiceError> {
        let mut select = warehouse::Entity::find();
        if filter.active_only {
            select = select.filter(warehouse::Column::Active.eq(true));
        }
        self.fetch_page(select.order_by_asc(warehouse::Column::Code), filter)
            .await
    }

    pub async fn list_areas(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_area::Model>, ServiceError> {
        let mut select = storage_area::Entity::find();
        if let Some(warehouse_id) = filter.parent_id {
            select = select.filter(storage_area::Column::WarehouseId.eq(warehouse_id));
        }
        if filter.active_only {
            select = select.filter(storage_area::Column::Active.eq(true));
        }
        self.fetch_page(select.order_by_asc(storage_area::Column::Code), filter)
            .await
    }

    pub async fn list_locations(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_location::Model>, ServiceError> {
        let mut select = storage_location::Entity::find();
        if let Some(area_id) = filter.parent_id {
            select = select.filter(storage_location::Column::StorageAreaId.eq(area_id));
        }
        if filter.active_only {
            select = select.filter(storage_location::Column::Active.eq(true));
        }
        self.fetch_page(select.order_by_asc(storage_location::Column::Code), filter)
            .await
    }

    pub async fn list_bins(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_bin::Model>, ServiceError> {
        let mut select = storage_bin::Entity::find();
        if let Some(location_id) = filter.parent_id {
            select = select.filter(storage_bin::Column::StorageLocationId.eq(location_id));
        }
        if filter.active_only {
            select = select.filter(storage_bin::Column::Status.ne(BinStatus::Retired));
        }
        self.fetch_page(select.order_by_asc(storage_bin::Column::Code), filter)
            .await
    }

    pub async fn list_bin_types(
        &self,
        filter: ListFilter,
    ) -> Result<Page<storage_bin_type::Model>, ServiceError> {
        let select = storage_bin_type::Entity::find().order_by_asc(storage_bin_type::Column::Code);
        self.fetch_page(select, filter).await
    }

    async fn fetch_page<E, M>(&self, select: Select<E>, filter: ListFilter) -> Result<Page<M>, ServiceError>
    where
        E: EntityTrait<Model = M>,
        M: FromQueryResult + Sized + Send + Sync + 'a,
    {
        let per_page = filter.per_page.max(1);
        let page = filter.page.max(1);
        let paginator = select.paginate(self.conn, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }
}
