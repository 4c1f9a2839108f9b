use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::geometry::GeometryError;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Unprocessable Entity")
    pub error: String,
    /// Machine-readable error kind (e.g., "geometry_out_of_bounds")
    pub code: String,
    /// Human-readable error description
    pub message: String,
    /// Structured context for reconstructing the failing value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Parent not found: {parent} referenced by {child} does not exist")]
    ParentNotFound { child: String, parent: String },

    #[error("Duplicate code: {entity} with code '{code}' already exists")]
    DuplicateCode { entity: &'static str, code: String },

    #[error("Invalid geometry in field '{field}': {reason}")]
    GeometryInvalid {
        field: &'static str,
        #[source]
        reason: GeometryError,
    },

    #[error("Geometry out of bounds: {field} of {child} is not within {parent}")]
    GeometryOutOfBounds {
        child: String,
        parent: String,
        field: &'static str,
        /// First child vertex found outside the parent, if any vertex is.
        outside: Option<[f64; 2]>,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Wraps a storage-layer failure. Kept as a function so it can be passed to `map_err`.
    pub fn db_error(error: DbErr) -> Self {
        ServiceError::DatabaseError(error)
    }

    pub fn geometry(field: &'static str, reason: GeometryError) -> Self {
        ServiceError::GeometryInvalid { field, reason }
    }

    /// Machine-readable kind, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "storage_error",
            Self::NotFound { .. } => "not_found",
            Self::ParentNotFound { .. } => "parent_not_found",
            Self::DuplicateCode { .. } => "duplicate_code",
            Self::GeometryInvalid { .. } => "geometry_invalid",
            Self::GeometryOutOfBounds { .. } => "geometry_out_of_bounds",
            Self::ValidationError(_) => "validation_error",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Conflict(_) => "conflict",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } | Self::ParentNotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateCode { .. } | Self::Conflict(_) | Self::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            Self::GeometryInvalid { .. } | Self::GeometryOutOfBounds { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Storage and internal errors return generic messages to avoid leaking details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Structured context attached to the response body.
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            Self::ParentNotFound { child, parent } => {
                Some(json!({ "child": child, "parent": parent }))
            }
            Self::DuplicateCode { entity, code } => Some(json!({ "entity": entity, "code": code })),
            Self::GeometryInvalid { field, reason } => Some(json!({
                "field": field,
                "reason": reason,
            })),
            Self::GeometryOutOfBounds {
                child,
                parent,
                field,
                outside,
            } => Some(json!({
                "field": field,
                "child": child,
                "parent": parent,
                "outside_coordinate": outside,
            })),
            Self::InvalidTransition { from, to } => Some(json!({ "from": from, "to": to })),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            code: self.kind().to_string(),
            message: self.response_message(),
            details: self.details(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound {
                    entity: "warehouse",
                    id: 4,
                }
                .into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.code, "not_found");
        assert_eq!(payload.details.unwrap()["id"], 4);
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::DuplicateCode {
                entity: "warehouse",
                code: "GH-001".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::geometry("boundary", GeometryError::WrongType {
                expected: "Polygon",
                actual: "Point".into()
            })
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::ParentNotFound {
                child: "storage_area".into(),
                parent: "warehouse 9".into()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_errors_hide_internal_details() {
        let err = ServiceError::DatabaseError(DbErr::Custom("password=hunter2".into()));
        assert_eq!(err.response_message(), "Database error");
        assert_eq!(err.kind(), "storage_error");
        assert!(err.details().is_none());
    }

    #[test]
    fn out_of_bounds_details_carry_offending_vertex() {
        let err = ServiceError::GeometryOutOfBounds {
            child: "storage_area GH-001-EAST".into(),
            parent: "warehouse GH-001".into(),
            field: "boundary",
            outside: Some([-70.6463, -33.4489]),
        };
        let details = err.details().unwrap();
        assert_eq!(details["field"], "boundary");
        assert_eq!(details["outside_coordinate"][0], -70.6463);
    }
}
