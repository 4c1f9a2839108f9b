mod common;

use assert_matches::assert_matches;
use common::*;
use storage_hierarchy_api::{commands::storage_areas::CreateStorageAreaCommand, errors::ServiceError};

#[tokio::test]
async fn point_of_location_resolves_full_chain() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let resolution = app
        .services()
        .gps_resolver
        .resolve(LOCATION_POINT.0, LOCATION_POINT.1)
        .await
        .unwrap()
        .expect("point should resolve");

    assert_eq!(
        resolution.ids(),
        (seeded.warehouse.id, seeded.area.id, seeded.location.id)
    );
    assert_eq!(resolution.storage_location.code, "GH-001-NORTH-L01");
}

#[tokio::test]
async fn resolution_is_repeatable() {
    let app = TestApp::new().await;
    app.seed_hierarchy().await;
    let resolver = &app.services().gps_resolver;

    let first = resolver.resolve(LOCATION_POINT.0, LOCATION_POINT.1).await.unwrap();
    let second = resolver.resolve(LOCATION_POINT.0, LOCATION_POINT.1).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn point_outside_every_warehouse_resolves_to_none() {
    let app = TestApp::new().await;
    app.seed_hierarchy().await;

    let resolution = app
        .services()
        .gps_resolver
        .resolve(-70.7000, -33.5000)
        .await
        .unwrap();
    assert!(resolution.is_none());
}

#[tokio::test]
async fn location_match_requires_exact_coordinates() {
    let app = TestApp::new().await;
    app.seed_hierarchy().await;
    let resolver = &app.services().gps_resolver;

    // Inside the warehouse and the area, but not on the stored point
    let near = resolver
        .resolve(LOCATION_POINT.0 + 1e-9, LOCATION_POINT.1)
        .await
        .unwrap();
    assert!(near.is_none());

    let area_only = resolver.resolve(-70.6476, -33.4492).await.unwrap();
    assert!(area_only.is_none());
}

#[tokio::test]
async fn point_in_warehouse_outside_areas_resolves_to_none() {
    let app = TestApp::new().await;
    app.seed_hierarchy().await;

    let resolution = app
        .services()
        .gps_resolver
        .resolve(-70.6482, -33.4498)
        .await
        .unwrap();
    assert!(resolution.is_none());
}

#[tokio::test]
async fn inactive_levels_are_skipped() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    app.services()
        .storage_locations
        .deactivate_location(seeded.location.id)
        .await
        .unwrap();
    let resolution = app
        .services()
        .gps_resolver
        .resolve(LOCATION_POINT.0, LOCATION_POINT.1)
        .await
        .unwrap();
    assert!(resolution.is_none());

    // A second active location at the same point in the same area takes over
    let replacement = app
        .seed_location(seeded.area.id, "GH-001-NORTH-L02", LOCATION_POINT)
        .await;
    let resolution = app
        .services()
        .gps_resolver
        .resolve(LOCATION_POINT.0, LOCATION_POINT.1)
        .await
        .unwrap()
        .expect("replacement location should resolve");
    assert_eq!(resolution.storage_location.id, replacement.id);

    app.services()
        .warehouses
        .deactivate_warehouse(seeded.warehouse.id)
        .await
        .unwrap();
    let resolution = app
        .services()
        .gps_resolver
        .resolve(LOCATION_POINT.0, LOCATION_POINT.1)
        .await
        .unwrap();
    assert!(resolution.is_none());
}

#[tokio::test]
async fn overlapping_areas_resolve_to_lowest_id() {
    let app = TestApp::new().await;
    let warehouse = app.seed_warehouse().await;
    let first = app
        .seed_area(warehouse.id, "GH-001-NORTH", ring(&NORTH_RING))
        .await;
    let overlapping = app
        .seed_area(
            warehouse.id,
            "GH-001-WEST",
            rectangle(-70.6482, -33.4490, -70.6477, -33.4495),
        )
        .await;
    let location = app
        .seed_location(first.id, "GH-001-NORTH-L01", LOCATION_POINT)
        .await;
    app.seed_location(overlapping.id, "GH-001-WEST-L01", LOCATION_POINT)
        .await;

    let resolution = app
        .services()
        .gps_resolver
        .resolve(LOCATION_POINT.0, LOCATION_POINT.1)
        .await
        .unwrap()
        .expect("point should resolve");
    assert_eq!(resolution.storage_area.id, first.id);
    assert_eq!(resolution.storage_location.id, location.id);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let app = TestApp::new().await;

    let result = app.services().gps_resolver.resolve(181.0, 0.0).await;
    assert_matches!(
        result,
        Err(ServiceError::GeometryInvalid { field: "coordinates", .. })
    );

    let result = app.services().gps_resolver.resolve(0.0, f64::NAN).await;
    assert_matches!(result, Err(ServiceError::GeometryInvalid { .. }));
}

#[tokio::test]
async fn point_in_nested_area_resolves_to_the_nested_area() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;
    // Western third of the north area
    let nested = app
        .services()
        .storage_areas
        .create_area(CreateStorageAreaCommand {
            warehouse_id: seeded.warehouse.id,
            parent_area_id: Some(seeded.area.id),
            code: "GH-001-NORTH-A".to_string(),
            name: "North bay".to_string(),
            position: None,
            boundary: rectangle(-70.6481, -33.4490, -70.6479, -33.4493),
        })
        .await
        .unwrap();
    let location = app
        .seed_location(nested.id, "GH-001-NORTH-A-L09", (-70.6480, -33.4491))
        .await;
    let resolver = &app.services().gps_resolver;

    let resolution = resolver
        .resolve(-70.6480, -33.4491)
        .await
        .unwrap()
        .expect("nested location should resolve");
    assert_eq!(
        resolution.ids(),
        (seeded.warehouse.id, nested.id, location.id)
    );

    // Outside the nested area the parent still answers
    let parent = resolver
        .resolve(LOCATION_POINT.0, LOCATION_POINT.1)
        .await
        .unwrap()
        .expect("parent location should resolve");
    assert_eq!(parent.storage_area.id, seeded.area.id);
}
