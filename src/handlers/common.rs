use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    errors::ServiceError,
    repositories::{ListFilter, Page},
    ApiResponse,
};

/// `201 Created` with the standard envelope.
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn created<T: Serialize>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Query string accepted by every list endpoint. Each level reads the parent
/// filter that applies to it and ignores the others.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    #[serde(default)]
    pub active_only: bool,
    pub warehouse_id: Option<i32>,
    pub storage_area_id: Option<i32>,
    pub storage_location_id: Option<i32>,
}

impl ListQuery {
    /// Paging bounded by the configured page sizes.
    pub fn filter(&self, config: &AppConfig, parent_id: Option<i32>) -> ListFilter {
        ListFilter {
            parent_id,
            active_only: self.active_only,
            page: self.page.unwrap_or(1).max(1),
            per_page: self
                .per_page
                .unwrap_or(config.api_default_page_size)
                .clamp(1, config.api_max_page_size),
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = if page.total == 0 {
            0
        } else {
            (page.total + page.per_page - 1) / page.per_page
        };
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        )
    }

    #[test]
    fn per_page_is_clamped_to_configured_maximum() {
        let query = ListQuery {
            page: Some(0),
            per_page: Some(10_000),
            ..Default::default()
        };
        let filter = query.filter(&config(), Some(3));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, 100);
        assert_eq!(filter.parent_id, Some(3));

        let filter = ListQuery::default().filter(&config(), None);
        assert_eq!(filter.per_page, 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page {
            items: vec![1, 2],
            total: 41,
            page: 1,
            per_page: 20,
        };
        let response = PaginatedResponse::from(page);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items, vec![1, 2]);
    }
}
