//! Storage Hierarchy API
//!
//! Geospatial storage hierarchy (warehouse → storage area → storage location →
//! storage bin) with containment enforcement, derived geometry and GPS
//! resolution, served over HTTP and a CLI.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod handlers;
pub mod migrator;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    http::HeaderValue,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::{db::DbPool, events::EventSender, services::HierarchyServices};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: HierarchyServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: config::AppConfig, event_sender: Arc<EventSender>) -> Self {
        let services = HierarchyServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    let warehouses = Router::new()
        .route(
            "/warehouses",
            post(handlers::warehouses::create_warehouse)
                .get(handlers::warehouses::list_warehouses),
        )
        .route(
            "/warehouses/:id",
            get(handlers::warehouses::get_warehouse)
                .patch(handlers::warehouses::update_warehouse)
                .delete(handlers::warehouses::deactivate_warehouse),
        )
        .route(
            "/warehouses/:id/hierarchy",
            get(handlers::warehouses::warehouse_hierarchy),
        )
        .route(
            "/warehouses/:id/utilization",
            get(handlers::warehouses::warehouse_utilization),
        );

    let storage_areas = Router::new()
        .route(
            "/storage-areas",
            post(handlers::storage_areas::create_area).get(handlers::storage_areas::list_areas),
        )
        .route(
            "/storage-areas/:id",
            get(handlers::storage_areas::get_area)
                .patch(handlers::storage_areas::update_area)
                .delete(handlers::storage_areas::deactivate_area),
        )
        .route(
            "/storage-areas/:id/utilization",
            get(handlers::storage_areas::area_utilization),
        );

    let storage_locations = Router::new()
        .route(
            "/storage-locations",
            post(handlers::storage_locations::create_location)
                .get(handlers::storage_locations::list_locations),
        )
        .route(
            "/storage-locations/:id",
            get(handlers::storage_locations::get_location)
                .patch(handlers::storage_locations::update_location)
                .delete(handlers::storage_locations::deactivate_location),
        )
        .route(
            "/storage-locations/:id/photo-session",
            put(handlers::storage_locations::attach_photo_session),
        )
        .route(
            "/storage-locations/:id/relationships",
            get(handlers::storage_locations::location_relationships),
        );

    let storage_bins = Router::new()
        .route(
            "/storage-bins",
            post(handlers::storage_bins::create_bin).get(handlers::storage_bins::list_bins),
        )
        .route(
            "/storage-bins/:id",
            get(handlers::storage_bins::get_bin)
                .patch(handlers::storage_bins::update_bin)
                .delete(handlers::storage_bins::deactivate_bin),
        )
        .route(
            "/storage-bins/:id/status",
            put(handlers::storage_bins::change_bin_status),
        )
        .route(
            "/storage-bins/:id/detection",
            put(handlers::storage_bins::record_detection),
        );

    let catalog = Router::new()
        .route(
            "/bin-types",
            post(handlers::bin_types::create_bin_type).get(handlers::bin_types::list_bin_types),
        )
        .route(
            "/bin-types/:id",
            get(handlers::bin_types::get_bin_type).delete(handlers::bin_types::delete_bin_type),
        )
        .route(
            "/relationships",
            post(handlers::relationships::create_relationship),
        )
        .route(
            "/relationships/:id",
            get(handlers::relationships::get_relationship)
                .delete(handlers::relationships::delete_relationship),
        );

    let hierarchy = Router::new()
        .route("/resolve", get(handlers::hierarchy::resolve))
        .route(
            "/hierarchy/validate",
            post(handlers::hierarchy::validate_hierarchy),
        );

    Router::new()
        .merge(warehouses)
        .merge(storage_areas)
        .merge(storage_locations)
        .merge(storage_bins)
        .merge(catalog)
        .merge(hierarchy)
}

/// Full application router with the HTTP middleware stack.
pub fn app(state: AppState) -> Router {
    let cors_layer = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/status", get(handlers::health::status))
        .nest("/api/v1", api_v1_routes())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(crate::tracing::request_id_middleware))
        .with_state(state)
}

/// Explicit origins when configured, permissive otherwise.
fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
            ])
            .allow_headers(tower_http::cors::Any)
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn response_outside_request_has_no_request_id() {
        let response = ApiResponse::success(1);
        assert!(response.meta.unwrap().request_id.is_none());
    }
}
