use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::common::{created, CreatedResult, ListQuery, PaginatedResponse};
use crate::{
    commands::bin_types::CreateBinTypeCommand, entities::storage_bin_type, errors::ServiceError,
    ApiResponse, ApiResult, AppState,
};

pub async fn create_bin_type(
    State(state): State<AppState>,
    Json(command): Json<CreateBinTypeCommand>,
) -> CreatedResult<storage_bin_type::Model> {
    let bin_type = state.services.bin_types.create_bin_type(command).await?;
    created(bin_type)
}

pub async fn list_bin_types(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<storage_bin_type::Model>> {
    let page = state
        .services
        .bin_types
        .list_bin_types(query.filter(&state.config, None))
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

pub async fn get_bin_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<storage_bin_type::Model> {
    let bin_type = state.services.bin_types.get_bin_type(id).await?;
    Ok(Json(ApiResponse::success(bin_type)))
}

pub async fn delete_bin_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    state.services.bin_types.delete_bin_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
