use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;

use super::common::{created, CreatedResult, ListQuery, PaginatedResponse};
use crate::{
    commands::storage_bins::{CreateStorageBinCommand, DetectionMetadata, UpdateStorageBinCommand},
    entities::storage_bin::{self, BinStatus},
    services::lifecycle::SoftDeleteOutcome,
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: BinStatus,
}

pub async fn create_bin(
    State(state): State<AppState>,
    Json(command): Json<CreateStorageBinCommand>,
) -> CreatedResult<storage_bin::Model> {
    let bin = state.services.storage_bins.create_bin(command).await?;
    created(bin)
}

/// `?storage_location_id=` narrows to one location; `active_only` hides retired bins
pub async fn list_bins(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<storage_bin::Model>> {
    let page = state
        .services
        .storage_bins
        .list_bins(query.filter(&state.config, query.storage_location_id))
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

pub async fn get_bin(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<storage_bin::Model> {
    let bin = state.services.storage_bins.get_bin(id).await?;
    Ok(Json(ApiResponse::success(bin)))
}

pub async fn update_bin(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut command): Json<UpdateStorageBinCommand>,
) -> ApiResult<storage_bin::Model> {
    command.id = id;
    let bin = state.services.storage_bins.update_bin(command).await?;
    Ok(Json(ApiResponse::success(bin)))
}

pub async fn change_bin_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<storage_bin::Model> {
    let bin = state
        .services
        .storage_bins
        .change_status(id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(bin)))
}

pub async fn record_detection(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(metadata): Json<DetectionMetadata>,
) -> ApiResult<storage_bin::Model> {
    let bin = state
        .services
        .storage_bins
        .record_detection(id, metadata)
        .await?;
    Ok(Json(ApiResponse::success(bin)))
}

/// Retires the bin
pub async fn deactivate_bin(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<SoftDeleteOutcome> {
    let outcome = state.services.storage_bins.deactivate_bin(id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
