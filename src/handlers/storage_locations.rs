use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use super::common::{created, CreatedResult, ListQuery, PaginatedResponse};
use crate::{
    commands::storage_locations::{
        AttachPhotoSessionCommand, CreateStorageLocationCommand, UpdateStorageLocationCommand,
    },
    entities::{location_relationship, storage_location},
    services::lifecycle::SoftDeleteOutcome,
    ApiResponse, ApiResult, AppState,
};

pub async fn create_location(
    State(state): State<AppState>,
    Json(command): Json<CreateStorageLocationCommand>,
) -> CreatedResult<storage_location::Model> {
    let location = state
        .services
        .storage_locations
        .create_location(command)
        .await?;
    created(location)
}

/// `?storage_area_id=` narrows to one area
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<storage_location::Model>> {
    let page = state
        .services
        .storage_locations
        .list_locations(query.filter(&state.config, query.storage_area_id))
        .await?;
    Ok(Json(ApiResponse::success(page.into())))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<storage_location::Model> {
    let location = state.services.storage_locations.get_location(id).await?;
    Ok(Json(ApiResponse::success(location)))
}

pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut command): Json<UpdateStorageLocationCommand>,
) -> ApiResult<storage_location::Model> {
    command.id = id;
    let location = state
        .services
        .storage_locations
        .update_location(command)
        .await?;
    Ok(Json(ApiResponse::success(location)))
}

pub async fn attach_photo_session(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(mut command): Json<AttachPhotoSessionCommand>,
) -> ApiResult<storage_location::Model> {
    command.location_id = id;
    let location = state
        .services
        .storage_locations
        .attach_photo_session(command)
        .await?;
    Ok(Json(ApiResponse::success(location)))
}

pub async fn location_relationships(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<location_relationship::Model>> {
    let relationships = state
        .services
        .storage_locations
        .location_relationships(id)
        .await?;
    Ok(Json(ApiResponse::success(relationships)))
}

pub async fn deactivate_location(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<SoftDeleteOutcome> {
    let outcome = state
        .services
        .storage_locations
        .deactivate_location(id)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
