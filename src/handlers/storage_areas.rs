use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use super::common::{created, CreatedResult, ListQuery, PaginatedResponse};
use crate::{
    commands::storage_areas::{CreateStorageAreaCommand, UpdateStorageAreaCommand},
    entities::storage_area,
    services::{hierarchy::Utilization, lifecycle::SoftDeleteOutcome},
    ApiResponse, ApiResult, AppState,
};

pub async fn create_area(
    State(state): State<AppState>,
    Json(command): Json<CreateStorageAreaCommand>,
) -> CreatedResult<storage_area::Model> {
    let area = state.services.storage_areas.create_area(command).await?;
    created(area)
}

/// `?warehouse_id=` narrows to one warehouse
pub async fn list_areas(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<storage_area::Model>> {
    let page = state
        .services
        .storage_areas
        .list_areas(query.filter(&state.config, query.warehouse_id))
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

pub async fn get_area(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<storage_area::Model> {
    let area = state.services.storage_areas.get_area(id).await?;
    Ok(Json(ApiResponse::success(area)))
}

pub async fn update_area(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut command): Json<UpdateStorageAreaCommand>,
) -> ApiResult<storage_area::Model> {
    command.id = id;
    let area = state.services.storage_areas.update_area(command).await?;
    Ok(Json(ApiResponse::success(area)))
}

pub async fn deactivate_area(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<SoftDeleteOutcome> {
    let outcome = state.services.storage_areas.deactivate_area(id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn area_utilization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Utilization> {
    let utilization = state.services.hierarchy.area_utilization(id).await?;
    Ok(Json(ApiResponse::success(utilization)))
}
