pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::mastery::types::{EventId, Item, ItemId, Outcome, ReviewEvent, TierFilter, UserId};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("storage operation timed out")]
    Timeout,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Append-only review log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one event stamped with the store's clock. The write is atomic.
    async fn append(
        &self,
        user_id: UserId,
        item_id: ItemId,
        outcome: Outcome,
    ) -> Result<EventId, StorageError>;

    /// Every event of `user_id`, ordered by `(reviewed_at, id)`.
    async fn read_events(&self, user_id: UserId) -> Result<Vec<ReviewEvent>, StorageError>;
}

/// Read-only vocabulary catalog.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn list_items(&self, filter: &TierFilter) -> Result<Vec<Item>, StorageError>;

    async fn count_items(&self, filter: &TierFilter) -> Result<u64, StorageError>;

    /// Up to `limit` items matching `filter`, drawn uniformly at random.
    async fn sample_items(&self, filter: &TierFilter, limit: usize)
        -> Result<Vec<Item>, StorageError>;

    /// Items whose id is in `ids`. Unknown ids are skipped.
    async fn get_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, StorageError>;
}
