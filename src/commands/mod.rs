use crate::{db::DbPool, errors::ServiceError, events::EventSender};
use async_trait::async_trait;
use std::sync::Arc;

pub mod bin_types;
pub mod codes;
pub mod relationships;
pub mod storage_areas;
pub mod storage_bins;
pub mod storage_locations;
pub mod warehouses;

/// Command trait for implementing the Command Pattern
///
/// A command carries a validated request for one mutation of the storage
/// hierarchy. `execute` checks inputs and geometry before opening a
/// transaction, performs every read and write inside that transaction, and
/// publishes its event only after the commit.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `db_pool` - Database connection pool for persistence operations
    /// * `event_sender` - Channel to publish hierarchy events
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}
