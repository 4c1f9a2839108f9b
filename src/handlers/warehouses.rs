use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use super::common::{created, CreatedResult, ListQuery, PaginatedResponse};
use crate::{
    commands::warehouses::{CreateWarehouseCommand, UpdateWarehouseCommand},
    entities::warehouse,
    services::{
        hierarchy::{Utilization, WarehouseTree},
        lifecycle::SoftDeleteOutcome,
    },
    ApiResponse, ApiResult, AppState,
};

pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(command): Json<CreateWarehouseCommand>,
) -> CreatedResult<warehouse::Model> {
    let warehouse = state.services.warehouses.create_warehouse(command).await?;
    created(warehouse)
}

pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<warehouse::Model>> {
    let page = state
        .services
        .warehouses
        .list_warehouses(query.filter(&state.config, None))
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<warehouse::Model> {
    let warehouse = state.services.warehouses.get_warehouse(id).await?;
    Ok(Json(ApiResponse::success(warehouse)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut command): Json<UpdateWarehouseCommand>,
) -> ApiResult<warehouse::Model> {
    command.id = id;
    let warehouse = state.services.warehouses.update_warehouse(command).await?;
    Ok(Json(ApiResponse::success(warehouse)))
}

pub async fn deactivate_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<SoftDeleteOutcome> {
    let outcome = state.services.warehouses.deactivate_warehouse(id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn warehouse_hierarchy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<WarehouseTree> {
    let tree = state.services.hierarchy.warehouse_tree(id).await?;
    Ok(Json(ApiResponse::success(tree)))
}

pub async fn warehouse_utilization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Utilization> {
    let utilization = state.services.hierarchy.warehouse_utilization(id).await?;
    Ok(Json(ApiResponse::success(utilization)))
}
