mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::{json, Value};
use storage_hierarchy_api::tracing::REQUEST_ID_HEADER;

fn polygon_json(points: &[(f64, f64)]) -> Value {
    ring(points).into_json()
}

async fn create_warehouse(app: &TestApp) -> Value {
    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/warehouses",
            Some(json!({
                "code": "gh-001",
                "name": "Greenhouse 1",
                "warehouse_type": "greenhouse",
                "boundary": polygon_json(&WAREHOUSE_RING),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"].clone()
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.request_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");

    let (status, body) = app.request_json(Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["up"], true);
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn warehouse_crud_round_trip() {
    let app = TestApp::new().await;
    let warehouse = create_warehouse(&app).await;
    let id = warehouse["id"].as_i64().unwrap();
    assert_eq!(warehouse["code"], "GH-001");
    assert!(warehouse["area_m2"].as_f64().unwrap() > 0.0);

    let (status, body) = app
        .request_json(Method::GET, &format!("/api/v1/warehouses/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Greenhouse 1");

    let (status, body) = app
        .request_json(
            Method::PATCH,
            &format!("/api/v1/warehouses/{}", id),
            Some(json!({ "name": "Greenhouse One", "warehouse_type": "tunnel" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Greenhouse One");
    assert_eq!(body["data"]["warehouse_type"], "tunnel");
    assert_eq!(body["data"]["boundary"], warehouse["boundary"]);

    let (status, body) = app
        .request_json(Method::DELETE, &format!("/api/v1/warehouses/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["changed"], true);

    let (_, body) = app
        .request_json(Method::GET, "/api/v1/warehouses?active_only=true", None)
        .await;
    assert_eq!(body["data"]["total"], 0);
    let (_, body) = app
        .request_json(Method::GET, "/api/v1/warehouses", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn unknown_warehouse_is_404_with_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/warehouses/12345", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let (_, body) = app
        .request_json(Method::GET, "/api/v1/warehouses/12345", None)
        .await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["details"]["entity"], "warehouse");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn out_of_bounds_area_is_422() {
    let app = TestApp::new().await;
    let warehouse = create_warehouse(&app).await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/storage-areas",
            Some(json!({
                "warehouse_id": warehouse["id"],
                "code": "GH-001-EAST",
                "name": "East",
                "boundary": rectangle(-70.6481, -33.4490, -70.6463, -33.4493).into_json(),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "geometry_out_of_bounds");
    assert_eq!(body["details"]["field"], "boundary");
    assert!(body["details"]["outside_coordinate"].is_array());
}

#[tokio::test]
async fn malformed_geometry_reports_reason() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/warehouses",
            Some(json!({
                "code": "GH-002",
                "name": "Open",
                "warehouse_type": "open_field",
                "boundary": {
                    "type": "Polygon",
                    "coordinates": [[[-70.6483, -33.4489], [-70.6473, -33.4489], [-70.6473, -33.4499]]]
                },
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "geometry_invalid");
    assert_eq!(body["details"]["reason"]["reason"], "ring_not_closed");
}

#[tokio::test]
async fn resolve_endpoint_returns_chain_or_null() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let uri = format!(
        "/api/v1/resolve?longitude={}&latitude={}",
        LOCATION_POINT.0, LOCATION_POINT.1
    );
    let (status, body) = app.request_json(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["warehouse"]["id"], seeded.warehouse.id);
    assert_eq!(body["data"]["storage_area"]["id"], seeded.area.id);
    assert_eq!(body["data"]["storage_location"]["id"], seeded.location.id);

    let (status, body) = app
        .request_json(Method::GET, "/api/v1/resolve?longitude=-70.7&latitude=-33.5", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, body) = app
        .request_json(Method::GET, "/api/v1/resolve?longitude=200&latitude=0", None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "geometry_invalid");
}

#[tokio::test]
async fn hierarchy_validation_endpoint() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/hierarchy/validate",
            Some(json!({
                "warehouse_id": seeded.warehouse.id,
                "storage_area_id": seeded.area.id,
                "storage_location_id": 999,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["errors"][0]["kind"], "not_found");
    assert_eq!(body["data"]["errors"][0]["entity"], "storage_location");
}

#[tokio::test]
async fn bin_endpoints_enforce_lifecycle() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;
    let bin_uri = format!("/api/v1/storage-bins/{}", seeded.bin.id);

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("{}/status", bin_uri),
            Some(json!({ "status": "retired" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "retired");

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("{}/status", bin_uri),
            Some(json!({ "status": "maintenance" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");
    assert_eq!(body["details"]["from"], "retired");

    let (status, body) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/bin-types/{}", seeded.bin_type.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn nested_routes_cover_every_level() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/storage-locations?storage_area_id={}", seeded.area.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["code"], "GH-001-NORTH-L01");

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/warehouses/{}/hierarchy", seeded.warehouse.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["storage_areas"][0]["storage_locations"][0]["id"],
        seeded.location.id
    );

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/storage-areas/{}/utilization", seeded.area.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], "storage_area");

    let (status, body) = app
        .request_json(
            Method::PUT,
            &format!("/api/v1/storage-locations/{}/photo-session", seeded.location.id),
            Some(json!({ "session_id": 11 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["photo_session_id"], 11);
}

#[tokio::test]
async fn relationship_routes() {
    let app = TestApp::new().await;
    let seeded = app.seed_hierarchy().await;
    let other = app
        .seed_location(seeded.area.id, "GH-001-NORTH-L02", (-70.6477, -33.4492))
        .await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/relationships",
            Some(json!({
                "parent_location_id": seeded.location.id,
                "child_location_id": other.id,
                "relationship_type": "contains",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/storage-locations/{}/relationships", other.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["relationship_type"], "contains");

    let (status, body) = app
        .request_json(Method::DELETE, &format!("/api/v1/relationships/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}
