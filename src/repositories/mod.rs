pub mod hierarchy_repository;

pub use hierarchy_repository::HierarchyRepository;

/// Filter and paging shared by every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    /// Owning parent (warehouse for areas, area for locations, location for bins)
    pub parent_id: Option<i32>,
    pub active_only: bool,
    /// One-based page number
    pub page: u64,
    pub per_page: u64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            parent_id: None,
            active_only: false,
            page: 1,
            per_page: 20,
        }
    }
}

/// One page of results plus the total row count for the filter.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}
