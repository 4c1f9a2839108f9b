//! HTTP handlers. Routes are assembled in [`crate::api_v1_routes`].

pub mod bin_types;
pub mod common;
pub mod health;
pub mod hierarchy;
pub mod relationships;
pub mod storage_areas;
pub mod storage_bins;
pub mod storage_locations;
pub mod warehouses;
