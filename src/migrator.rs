use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_warehouses_table::Migration),
            Box::new(m20250101_000002_create_storage_areas_table::Migration),
            Box::new(m20250101_000003_create_storage_locations_table::Migration),
            Box::new(m20250101_000004_create_storage_bins_tables::Migration),
            Box::new(m20250101_000005_create_location_relationships_table::Migration),
        ]
    }
}

/// Adds the derived geometry columns shared by every polygon-bearing table.
fn derived_geometry_columns<T: Iden + 'static>(
    table: &mut TableCreateStatement,
    columns: [T; 7],
) -> &mut TableCreateStatement {
    for column in columns {
        table.col(ColumnDef::new(column).double().not_null());
    }
    table
}

mod m20250101_000001_create_warehouses_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_warehouses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(Warehouses::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Warehouses::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(Warehouses::Code).string_len(20).not_null())
                .col(ColumnDef::new(Warehouses::Name).string().not_null())
                .col(ColumnDef::new(Warehouses::WarehouseType).string_len(20).not_null())
                .col(ColumnDef::new(Warehouses::Boundary).json().not_null());
            super::derived_geometry_columns(
                &mut table,
                [
                    Warehouses::AreaM2,
                    Warehouses::CentroidLongitude,
                    Warehouses::CentroidLatitude,
                    Warehouses::MinLongitude,
                    Warehouses::MinLatitude,
                    Warehouses::MaxLongitude,
                    Warehouses::MaxLatitude,
                ],
            );
            table
                .col(
                    ColumnDef::new(Warehouses::Active)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(Warehouses::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Warehouses::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                );
            manager.create_table(table.to_owned()).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_warehouses_code")
                        .table(Warehouses::Table)
                        .col(Warehouses::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Bounding-box prefilter for point-in-boundary lookups
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_warehouses_bbox")
                        .table(Warehouses::Table)
                        .col(Warehouses::MinLongitude)
                        .col(Warehouses::MaxLongitude)
                        .col(Warehouses::MinLatitude)
                        .col(Warehouses::MaxLatitude)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Warehouses {
        Table,
        Id,
        Code,
        Name,
        WarehouseType,
        Boundary,
        #[sea_orm(iden = "area_m2")]
        AreaM2,
        CentroidLongitude,
        CentroidLatitude,
        MinLongitude,
        MinLatitude,
        MaxLongitude,
        MaxLatitude,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_storage_areas_table {

    use super::m20250101_000001_create_warehouses_table::Warehouses;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_storage_areas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(StorageAreas::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(StorageAreas::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(StorageAreas::WarehouseId).integer().not_null())
                .col(ColumnDef::new(StorageAreas::ParentAreaId).integer().null())
                .col(ColumnDef::new(StorageAreas::Code).string_len(50).not_null())
                .col(ColumnDef::new(StorageAreas::Name).string().not_null())
                .col(ColumnDef::new(StorageAreas::Position).string_len(1).null())
                .col(ColumnDef::new(StorageAreas::Boundary).json().not_null());
            super::derived_geometry_columns(
                &mut table,
                [
                    StorageAreas::AreaM2,
                    StorageAreas::CentroidLongitude,
                    StorageAreas::CentroidLatitude,
                    StorageAreas::MinLongitude,
                    StorageAreas::MinLatitude,
                    StorageAreas::MaxLongitude,
                    StorageAreas::MaxLatitude,
                ],
            );
            table
                .col(
                    ColumnDef::new(StorageAreas::Active)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(StorageAreas::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(StorageAreas::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_storage_areas_warehouse_id")
                        .from(StorageAreas::Table, StorageAreas::WarehouseId)
                        .to(Warehouses::Table, Warehouses::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_storage_areas_parent_area_id")
                        .from(StorageAreas::Table, StorageAreas::ParentAreaId)
                        .to(StorageAreas::Table, StorageAreas::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade),
                );
            manager.create_table(table.to_owned()).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_areas_code")
                        .table(StorageAreas::Table)
                        .col(StorageAreas::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_areas_warehouse_id")
                        .table(StorageAreas::Table)
                        .col(StorageAreas::WarehouseId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_areas_parent_area_id")
                        .table(StorageAreas::Table)
                        .col(StorageAreas::ParentAreaId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_areas_bbox")
                        .table(StorageAreas::Table)
                        .col(StorageAreas::WarehouseId)
                        .col(StorageAreas::MinLongitude)
                        .col(StorageAreas::MaxLongitude)
                        .col(StorageAreas::MinLatitude)
                        .col(StorageAreas::MaxLatitude)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StorageAreas::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StorageAreas {
        Table,
        Id,
        WarehouseId,
        ParentAreaId,
        Code,
        Name,
        Position,
        Boundary,
        #[sea_orm(iden = "area_m2")]
        AreaM2,
        CentroidLongitude,
        CentroidLatitude,
        MinLongitude,
        MinLatitude,
        MaxLongitude,
        MaxLatitude,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_storage_locations_table {

    use super::m20250101_000002_create_storage_areas_table::StorageAreas;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_storage_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StorageLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StorageLocations::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StorageLocations::StorageAreaId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StorageLocations::Code)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StorageLocations::QrCode).string().null())
                        .col(ColumnDef::new(StorageLocations::Longitude).double().not_null())
                        .col(ColumnDef::new(StorageLocations::Latitude).double().not_null())
                        .col(
                            ColumnDef::new(StorageLocations::AreaM2)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(ColumnDef::new(StorageLocations::PositionMetadata).json().null())
                        .col(ColumnDef::new(StorageLocations::PhotoSessionId).integer().null())
                        .col(
                            ColumnDef::new(StorageLocations::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(StorageLocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StorageLocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_storage_locations_storage_area_id")
                                .from(StorageLocations::Table, StorageLocations::StorageAreaId)
                                .to(StorageAreas::Table, StorageAreas::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_locations_code")
                        .table(StorageLocations::Table)
                        .col(StorageLocations::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Exact-point lookup used by GPS resolution
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_locations_point")
                        .table(StorageLocations::Table)
                        .col(StorageLocations::StorageAreaId)
                        .col(StorageLocations::Longitude)
                        .col(StorageLocations::Latitude)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StorageLocations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StorageLocations {
        Table,
        Id,
        StorageAreaId,
        Code,
        QrCode,
        Longitude,
        Latitude,
        #[sea_orm(iden = "area_m2")]
        AreaM2,
        PositionMetadata,
        PhotoSessionId,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_storage_bins_tables {

    use super::m20250101_000003_create_storage_locations_table::StorageLocations;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_storage_bins_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StorageBinTypes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StorageBinTypes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StorageBinTypes::Code).string_len(50).not_null())
                        .col(ColumnDef::new(StorageBinTypes::Name).string().not_null())
                        .col(ColumnDef::new(StorageBinTypes::Category).string_len(20).not_null())
                        .col(ColumnDef::new(StorageBinTypes::Capacity).integer().null())
                        .col(ColumnDef::new(StorageBinTypes::LengthCm).double().null())
                        .col(ColumnDef::new(StorageBinTypes::WidthCm).double().null())
                        .col(ColumnDef::new(StorageBinTypes::HeightCm).double().null())
                        .col(
                            ColumnDef::new(StorageBinTypes::IsGrid)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(StorageBinTypes::GridRows).integer().null())
                        .col(ColumnDef::new(StorageBinTypes::GridColumns).integer().null())
                        .col(
                            ColumnDef::new(StorageBinTypes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StorageBinTypes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_bin_types_code")
                        .table(StorageBinTypes::Table)
                        .col(StorageBinTypes::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StorageBins::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StorageBins::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StorageBins::StorageLocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StorageBins::StorageBinTypeId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StorageBins::Code).string_len(100).not_null())
                        .col(ColumnDef::new(StorageBins::Label).string().null())
                        .col(ColumnDef::new(StorageBins::DetectionMetadata).json().null())
                        .col(
                            ColumnDef::new(StorageBins::Status)
                                .string_len(20)
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(StorageBins::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StorageBins::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_storage_bins_storage_location_id")
                                .from(StorageBins::Table, StorageBins::StorageLocationId)
                                .to(StorageLocations::Table, StorageLocations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_storage_bins_storage_bin_type_id")
                                .from(StorageBins::Table, StorageBins::StorageBinTypeId)
                                .to(StorageBinTypes::Table, StorageBinTypes::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_bins_code")
                        .table(StorageBins::Table)
                        .col(StorageBins::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_storage_bins_storage_location_id")
                        .table(StorageBins::Table)
                        .col(StorageBins::StorageLocationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StorageBins::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StorageBinTypes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StorageBinTypes {
        Table,
        Id,
        Code,
        Name,
        Category,
        Capacity,
        LengthCm,
        WidthCm,
        HeightCm,
        IsGrid,
        GridRows,
        GridColumns,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StorageBins {
        Table,
        Id,
        StorageLocationId,
        StorageBinTypeId,
        Code,
        Label,
        DetectionMetadata,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000005_create_location_relationships_table {

    use super::m20250101_000003_create_storage_locations_table::StorageLocations;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_location_relationships_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(LocationRelationships::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(LocationRelationships::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(LocationRelationships::ParentLocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LocationRelationships::ChildLocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LocationRelationships::RelationshipType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(LocationRelationships::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_location_relationships_parent")
                                .from(
                                    LocationRelationships::Table,
                                    LocationRelationships::ParentLocationId,
                                )
                                .to(StorageLocations::Table, StorageLocations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_location_relationships_child")
                                .from(
                                    LocationRelationships::Table,
                                    LocationRelationships::ChildLocationId,
                                )
                                .to(StorageLocations::Table, StorageLocations::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_location_relationships_pair")
                        .table(LocationRelationships::Table)
                        .col(LocationRelationships::ParentLocationId)
                        .col(LocationRelationships::ChildLocationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(LocationRelationships::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum LocationRelationships {
        Table,
        Id,
        ParentLocationId,
        ChildLocationId,
        RelationshipType,
        CreatedAt,
    }
}
