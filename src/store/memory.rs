use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::seq::IndexedRandom;

use super::{EventStore, ItemCatalog, StorageError};
use crate::mastery::types::{EventId, Item, ItemId, Outcome, ReviewEvent, TierFilter, UserId};

/// In-process event log and catalog. Used when no database is configured
/// and by the test suite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Vec<ReviewEvent>>,
    items: RwLock<Vec<Item>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let store = Self::default();
        store.replace_items(items);
        store
    }

    pub fn replace_items(&self, items: Vec<Item>) {
        *self.items.write() = items;
    }

    /// Appends with an explicit timestamp, bypassing the wall clock.
    pub fn append_at(
        &self,
        user_id: UserId,
        item_id: ItemId,
        outcome: Outcome,
        reviewed_at: DateTime<Utc>,
    ) -> Result<EventId, StorageError> {
        self.ensure_available()?;
        let mut events = self.events.write();
        let id = events.last().map(|event| event.id + 1).unwrap_or(1);
        events.push(ReviewEvent {
            id,
            user_id,
            item_id,
            outcome,
            reviewed_at,
        });
        Ok(id)
    }

    /// Makes every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn append(
        &self,
        user_id: UserId,
        item_id: ItemId,
        outcome: Outcome,
    ) -> Result<EventId, StorageError> {
        self.append_at(user_id, item_id, outcome, Utc::now())
    }

    async fn read_events(&self, user_id: UserId) -> Result<Vec<ReviewEvent>, StorageError> {
        self.ensure_available()?;
        let mut events: Vec<ReviewEvent> = self
            .events
            .read()
            .iter()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.reviewed_at, event.id));
        Ok(events)
    }
}

#[async_trait]
impl ItemCatalog for MemoryStore {
    async fn list_items(&self, filter: &TierFilter) -> Result<Vec<Item>, StorageError> {
        self.ensure_available()?;
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| filter.matches(item.tier))
            .cloned()
            .collect())
    }

    async fn count_items(&self, filter: &TierFilter) -> Result<u64, StorageError> {
        self.ensure_available()?;
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| filter.matches(item.tier))
            .count() as u64)
    }

    async fn sample_items(
        &self,
        filter: &TierFilter,
        limit: usize,
    ) -> Result<Vec<Item>, StorageError> {
        self.ensure_available()?;
        let items = self.items.read();
        let matching: Vec<&Item> = items.iter().filter(|item| filter.matches(item.tier)).collect();
        let mut rng = rand::rng();
        Ok(matching
            .choose_multiple(&mut rng, limit)
            .map(|item| (*item).clone())
            .collect())
    }

    async fn get_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, StorageError> {
        self.ensure_available()?;
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }
}
