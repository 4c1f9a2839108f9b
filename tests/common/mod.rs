#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use storage_hierarchy_api::{
    commands::{
        bin_types::CreateBinTypeCommand,
        storage_areas::CreateStorageAreaCommand,
        storage_bins::CreateStorageBinCommand,
        storage_locations::CreateStorageLocationCommand,
        warehouses::CreateWarehouseCommand,
    },
    config::AppConfig,
    db,
    entities::{
        storage_area, storage_bin, storage_bin_type::{self, BinCategory}, storage_location,
        warehouse::{self, WarehouseType},
    },
    events::{self, EventSender},
    geometry::RawGeometry,
    services::HierarchyServices,
    AppState,
};
use tower::ServiceExt;

/// Warehouse `GH-001`, roughly 92 m × 111 m in Santiago.
pub const WAREHOUSE_RING: [(f64, f64); 5] = [
    (-70.6483, -33.4489),
    (-70.6473, -33.4489),
    (-70.6473, -33.4499),
    (-70.6483, -33.4499),
    (-70.6483, -33.4489),
];

/// `GH-001-NORTH`, strictly inside the warehouse.
pub const NORTH_RING: [(f64, f64); 5] = [
    (-70.6481, -33.4490),
    (-70.6475, -33.4490),
    (-70.6475, -33.4493),
    (-70.6481, -33.4493),
    (-70.6481, -33.4490),
];

/// `GH-001-SOUTH`, disjoint from the north area.
pub const SOUTH_RING: [(f64, f64); 5] = [
    (-70.6481, -33.4494),
    (-70.6475, -33.4494),
    (-70.6475, -33.4498),
    (-70.6481, -33.4498),
    (-70.6481, -33.4494),
];

/// Point of `GH-001-NORTH-L01`.
pub const LOCATION_POINT: (f64, f64) = (-70.6478, -33.4491);

pub fn ring(points: &[(f64, f64)]) -> RawGeometry {
    RawGeometry::polygon(points)
}

/// Axis-aligned closed rectangle from two corners.
pub fn rectangle(west: f64, north: f64, east: f64, south: f64) -> RawGeometry {
    RawGeometry::polygon(&[
        (west, north),
        (east, north),
        (east, south),
        (west, south),
        (west, north),
    ])
}

/// Every level of a seeded hierarchy.
pub struct Seeded {
    pub warehouse: warehouse::Model,
    pub area: storage_area::Model,
    pub location: storage_location::Model,
    pub bin_type: storage_bin_type::Model,
    pub bin: storage_bin::Model,
}

/// Application state backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<u64>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = EventSender::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, Arc::new(event_sender));
        let router = storage_hierarchy_api::app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub fn services(&self) -> &HierarchyServices {
        &self.state.services
    }

    /// Sends a request through the full middleware stack.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Like [`TestApp::request`], decoding the body as JSON (`Null` when empty).
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, value)
    }

    pub async fn seed_warehouse(&self) -> warehouse::Model {
        self.services()
            .warehouses
            .create_warehouse(CreateWarehouseCommand {
                code: "GH-001".to_string(),
                name: "Greenhouse 1".to_string(),
                warehouse_type: WarehouseType::Greenhouse,
                boundary: ring(&WAREHOUSE_RING),
            })
            .await
            .expect("seed warehouse")
    }

    pub async fn seed_area(
        &self,
        warehouse_id: i32,
        code: &str,
        boundary: RawGeometry,
    ) -> storage_area::Model {
        self.services()
            .storage_areas
            .create_area(CreateStorageAreaCommand {
                warehouse_id,
                parent_area_id: None,
                code: code.to_string(),
                name: format!("Area {}", code),
                position: None,
                boundary,
            })
            .await
            .expect("seed storage area")
    }

    pub async fn seed_location(
        &self,
        storage_area_id: i32,
        code: &str,
        (longitude, latitude): (f64, f64),
    ) -> storage_location::Model {
        self.services()
            .storage_locations
            .create_location(CreateStorageLocationCommand {
                storage_area_id,
                code: code.to_string(),
                qr_code: None,
                coordinates: RawGeometry::point(longitude, latitude),
                position_metadata: None,
            })
            .await
            .expect("seed storage location")
    }

    pub async fn seed_bin_type(&self, code: &str) -> storage_bin_type::Model {
        self.services()
            .bin_types
            .create_bin_type(CreateBinTypeCommand {
                code: code.to_string(),
                name: format!("Type {}", code),
                category: BinCategory::SeedlingTray,
                capacity: Some(128),
                length_cm: Some(54.0),
                width_cm: Some(28.0),
                height_cm: Some(5.5),
                is_grid: true,
                grid_rows: Some(8),
                grid_columns: Some(16),
            })
            .await
            .expect("seed bin type")
    }

    pub async fn seed_bin(
        &self,
        storage_location_id: i32,
        storage_bin_type_id: i32,
        code: &str,
    ) -> storage_bin::Model {
        self.services()
            .storage_bins
            .create_bin(CreateStorageBinCommand {
                storage_location_id,
                storage_bin_type_id,
                code: code.to_string(),
                label: None,
                detection_metadata: None,
            })
            .await
            .expect("seed storage bin")
    }

    /// `GH-001` → `GH-001-NORTH` → `GH-001-NORTH-L01` → `GH-001-NORTH-L01-B1`.
    pub async fn seed_hierarchy(&self) -> Seeded {
        let warehouse = self.seed_warehouse().await;
        let area = self
            .seed_area(warehouse.id, "GH-001-NORTH", ring(&NORTH_RING))
            .await;
        let location = self
            .seed_location(area.id, "GH-001-NORTH-L01", LOCATION_POINT)
            .await;
        let bin_type = self.seed_bin_type("TRAY-128").await;
        let bin = self
            .seed_bin(location.id, bin_type.id, "GH-001-NORTH-L01-B1")
            .await;

        Seeded {
            warehouse,
            area,
            location,
            bin_type,
            bin,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
