use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::{
    services::{
        gps_resolver::Resolution,
        hierarchy_validator::{HierarchySelection, HierarchyValidation},
    },
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub longitude: f64,
    pub latitude: f64,
}

/// `data` is `null` when the point does not resolve to a location.
pub async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> ApiResult<Option<Resolution>> {
    let resolution = state
        .services
        .gps_resolver
        .resolve(query.longitude, query.latitude)
        .await?;
    Ok(Json(ApiResponse::success(resolution)))
}

pub async fn validate_hierarchy(
    State(state): State<AppState>,
    Json(selection): Json<HierarchySelection>,
) -> ApiResult<HierarchyValidation> {
    let report = state.services.validator.validate(selection).await?;
    Ok(Json(ApiResponse::success(report)))
}
