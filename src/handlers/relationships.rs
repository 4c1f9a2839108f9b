use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::common::{created, CreatedResult};
use crate::{
    commands::relationships::CreateRelationshipCommand, entities::location_relationship,
    errors::ServiceError, ApiResponse, ApiResult, AppState,
};

pub async fn create_relationship(
    State(state): State<AppState>,
    Json(command): Json<CreateRelationshipCommand>,
) -> CreatedResult<location_relationship::Model> {
    let relationship = state
        .services
        .relationships
        .create_relationship(command)
        .await?;
    created(relationship)
}

pub async fn get_relationship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<location_relationship::Model> {
    let relationship = state.services.relationships.get_relationship(id).await?;
    Ok(Json(ApiResponse::success(relationship)))
}

pub async fn delete_relationship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServiceError> {
    state.services.relationships.delete_relationship(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
