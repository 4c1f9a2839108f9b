mod common;

use assert_matches::assert_matches;
use common::*;
use storage_hierarchy_api::{
    commands::{
        storage_areas::{CreateStorageAreaCommand, UpdateStorageAreaCommand},
        storage_locations::{CreateStorageLocationCommand, UpdateStorageLocationCommand},
        warehouses::{CreateWarehouseCommand, UpdateWarehouseCommand},
    },
    entities::warehouse::WarehouseType,
    errors::ServiceError,
    geometry::{GeometryError, RawGeometry},
    repositories::ListFilter,
};

fn area_command(warehouse_id: i32, code: &str, boundary: RawGeometry) -> CreateStorageAreaCommand {
    CreateStorageAreaCommand {
        warehouse_id,
        parent_area_id: None,
        code: code.to_string(),
        name: code.to_string(),
        position: None,
        boundary,
    }
}

#[tokio::test]
async fn area_inside_warehouse_is_created_with_derived_geometry() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;

    let area = app
        .services()
        .storage_areas
        .create_area(area_command(warehouse.id, "gh-001-north", ring(&NORTH_RING)))
        .await
        .unwrap();

    assert_eq!(area.code, "GH-001-NORTH");
    assert_eq!(area.warehouse_id, warehouse.id);
    assert!(area.area_m2 > 0.0);
    assert!(area.area_m2 < warehouse.area_m2);
    assert!((-70.6481..=-70.6475).contains(&area.centroid_longitude));
    assert!((-33.4493..=-33.4490).contains(&area.centroid_latitude));
}

#[tokio::test]
async fn area_extending_past_warehouse_is_rejected() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;

    // 0.001° east beyond the warehouse's eastern edge
    let result = app
        .services()
        .storage_areas
        .create_area(area_command(
            warehouse.id,
            "GH-001-EAST",
            rectangle(-70.6481, -33.4490, -70.6463, -33.4493),
        ))
        .await;

    assert_matches!(
        result,
        Err(ServiceError::GeometryOutOfBounds { field: "boundary", outside: Some(_), .. })
    );

    let page = app
        .services()
        .storage_areas
        .list_areas(ListFilter::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn area_touching_warehouse_edge_is_accepted() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;

    let result = app
        .services()
        .storage_areas
        .create_area(area_command(
            warehouse.id,
            "GH-001-CORNER",
            rectangle(-70.6483, -33.4489, -70.6480, -33.4492),
        ))
        .await;

    assert!(result.is_ok(), "edge-sharing area rejected: {:?}", result.err());
}

#[tokio::test]
async fn identical_boundary_is_contained() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;

    let area = app
        .services()
        .storage_areas
        .create_area(area_command(warehouse.id, "GH-001-ALL", ring(&WAREHOUSE_RING)))
        .await
        .unwrap();
    assert!((area.area_m2 - warehouse.area_m2).abs() < 1e-6);
}

#[tokio::test]
async fn missing_parents_are_reported() {
    let app = TestApp::new().await;

    let area = app
        .services()
        .storage_areas
        .create_area(area_command(42, "GH-001-NORTH", ring(&NORTH_RING)))
        .await;
    assert_matches!(area, Err(ServiceError::ParentNotFound { .. }));

    let location = app
        .services()
        .storage_locations
        .create_location(CreateStorageLocationCommand {
            storage_area_id: 42,
            code: "GH-001-NORTH-L01".to_string(),
            qr_code: None,
            coordinates: RawGeometry::point(LOCATION_POINT.0, LOCATION_POINT.1),
            position_metadata: None,
        })
        .await;
    assert_matches!(location, Err(ServiceError::ParentNotFound { .. }));
}

#[tokio::test]
async fn unclosed_ring_is_rejected_before_any_write() {
    let app = TestApp::new().await;

    let result = app
        .services()
        .warehouses
        .create_warehouse(CreateWarehouseCommand {
            code: "GH-001".to_string(),
            name: "Greenhouse".to_string(),
            warehouse_type: WarehouseType::Greenhouse,
            boundary: RawGeometry::polygon(&WAREHOUSE_RING[..4]),
        })
        .await;

    assert_matches!(
        result,
        Err(ServiceError::GeometryInvalid {
            field: "boundary",
            reason: GeometryError::RingNotClosed { .. }
        })
    );
}

#[tokio::test]
async fn location_must_lie_inside_its_area() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;
    let north = app
        .seed_area(warehouse.id, "GH-001-NORTH", ring(&NORTH_RING))
        .await;

    // Inside the warehouse but south of the north area
    let outside = app
        .services()
        .storage_locations
        .create_location(CreateStorageLocationCommand {
            storage_area_id: north.id,
            code: "GH-001-NORTH-L09".to_string(),
            qr_code: None,
            coordinates: RawGeometry::point(-70.6478, -33.4496),
            position_metadata: None,
        })
        .await;
    assert_matches!(
        outside,
        Err(ServiceError::GeometryOutOfBounds { field: "coordinates", .. })
    );

    // A vertex of the area counts as inside
    let on_corner = app
        .seed_location(north.id, "GH-001-NORTH-L10", (-70.6481, -33.4490))
        .await;
    assert_eq!(on_corner.area_m2, 0.0);
}

#[tokio::test]
async fn nested_area_must_lie_inside_parent_area() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;
    let north = app
        .seed_area(warehouse.id, "GH-001-NORTH", ring(&NORTH_RING))
        .await;

    let mut nested = area_command(
        warehouse.id,
        "GH-001-NORTH-A",
        rectangle(-70.6480, -33.44905, -70.6477, -33.4492),
    );
    nested.parent_area_id = Some(north.id);
    let bay = app.services().storage_areas.create_area(nested).await.unwrap();
    assert_eq!(bay.parent_area_id, Some(north.id));

    // Inside the warehouse, crossing the north area's southern edge
    let mut straddling = area_command(
        warehouse.id,
        "GH-001-NORTH-B",
        rectangle(-70.6480, -33.4492, -70.6477, -33.4495),
    );
    straddling.parent_area_id = Some(north.id);
    let result = app.services().storage_areas.create_area(straddling).await;
    assert_matches!(result, Err(ServiceError::GeometryOutOfBounds { .. }));
}

#[tokio::test]
async fn shrinking_warehouse_below_its_areas_is_rejected() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let result = app
        .services()
        .warehouses
        .update_warehouse(UpdateWarehouseCommand {
            id: seeded.warehouse.id,
            boundary: Some(rectangle(-70.6483, -33.4489, -70.6478, -33.4499)),
            ..Default::default()
        })
        .await;
    assert_matches!(result, Err(ServiceError::GeometryOutOfBounds { .. }));

    let unchanged = app
        .services()
        .warehouses
        .get_warehouse(seeded.warehouse.id)
        .await
        .unwrap();
    assert_eq!(unchanged.boundary, seeded.warehouse.boundary);
    assert_eq!(unchanged.area_m2, seeded.warehouse.area_m2);
}

#[tokio::test]
async fn area_boundary_update_must_keep_its_locations() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let result = app
        .services()
        .storage_areas
        .update_area(UpdateStorageAreaCommand {
            id: seeded.area.id,
            boundary: Some(rectangle(-70.6481, -33.4492, -70.6475, -33.4493)),
            ..Default::default()
        })
        .await;
    assert_matches!(result, Err(ServiceError::GeometryOutOfBounds { .. }));

    // Growing the area inside the warehouse is fine and refreshes derived fields
    let grown = app
        .services()
        .storage_areas
        .update_area(UpdateStorageAreaCommand {
            id: seeded.area.id,
            boundary: Some(rectangle(-70.6482, -33.4490, -70.6475, -33.4493)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(grown.area_m2 > seeded.area.area_m2);
    assert_eq!(grown.min_longitude, -70.6482);
    assert_eq!(grown.max_longitude, -70.6475);
    // Grown westward only, so the centroid shifts west
    assert!((grown.centroid_longitude - -70.64785).abs() < 1e-9);
    assert!((grown.centroid_latitude - -33.44915).abs() < 1e-9);
    assert!(grown.centroid_longitude < seeded.area.centroid_longitude);
}

#[tokio::test]
async fn area_boundary_update_past_warehouse_edge_is_rejected() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    // East edge 0.0001° beyond the warehouse's -70.6473
    let result = app
        .services()
        .storage_areas
        .update_area(UpdateStorageAreaCommand {
            id: seeded.area.id,
            boundary: Some(rectangle(-70.6481, -33.4490, -70.6472, -33.4493)),
            ..Default::default()
        })
        .await;
    assert_matches!(result, Err(ServiceError::GeometryOutOfBounds { .. }));

    let unchanged = app
        .services()
        .storage_areas
        .get_area(seeded.area.id)
        .await
        .unwrap();
    assert_eq!(unchanged.boundary, seeded.area.boundary);
    assert_eq!(unchanged.area_m2, seeded.area.area_m2);
    assert_eq!(unchanged.max_longitude, seeded.area.max_longitude);
}

#[tokio::test]
async fn moving_location_outside_area_is_rejected() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let result = app
        .services()
        .storage_locations
        .update_location(UpdateStorageLocationCommand {
            id: seeded.location.id,
            coordinates: Some(RawGeometry::point(-70.6478, -33.4496)),
            ..Default::default()
        })
        .await;
    assert_matches!(result, Err(ServiceError::GeometryOutOfBounds { .. }));

    let moved = app
        .services()
        .storage_locations
        .update_location(UpdateStorageLocationCommand {
            id: seeded.location.id,
            coordinates: Some(RawGeometry::point(-70.6476, -33.4492)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!((moved.longitude, moved.latitude), (-70.6476, -33.4492));
}

#[tokio::test]
async fn area_cannot_be_nested_under_its_descendant() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;
    let north = app
        .seed_area(warehouse.id, "GH-001-NORTH", ring(&NORTH_RING))
        .await;

    let mut nested = area_command(
        warehouse.id,
        "GH-001-NORTH-A",
        rectangle(-70.6480, -33.44905, -70.6477, -33.4492),
    );
    nested.parent_area_id = Some(north.id);
    let bay = app.services().storage_areas.create_area(nested).await.unwrap();

    let cycle = app
        .services()
        .storage_areas
        .update_area(UpdateStorageAreaCommand {
            id: north.id,
            parent_area_id: Some(bay.id),
            ..Default::default()
        })
        .await;
    assert_matches!(cycle, Err(ServiceError::ValidationError(_)));

    let conflicting = app
        .services()
        .storage_areas
        .update_area(UpdateStorageAreaCommand {
            id: bay.id,
            parent_area_id: Some(north.id),
            detach_from_parent: true,
            ..Default::default()
        })
        .await;
    assert_matches!(conflicting, Err(ServiceError::ValidationError(_)));

    let detached = app
        .services()
        .storage_areas
        .update_area(UpdateStorageAreaCommand {
            id: bay.id,
            detach_from_parent: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(detached.parent_area_id, None);
}
