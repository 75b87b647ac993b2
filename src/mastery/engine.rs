use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::aggregator;
use super::config::{DenominatorPolicy, MasteryConfig};
use super::exam::{self, ExamOutcome};
use super::gate;
use super::reducer::reduce_latest;
use super::selector::{self, SelectionPolicy, SessionSelection};
use super::types::{EventId, Item, ItemId, LatestStates, MasteryStats, Outcome, TierFilter, UserId};
use crate::store::{EventStore, ItemCatalog, StorageError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("append task aborted: {0}")]
    AppendAborted(String),
    /// The append outlived the storage timeout and is still in flight.
    #[error("review append not confirmed within the storage timeout")]
    AppendUnconfirmed,
}

/// Stats payload returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_learned: u64,
    pub retained_count: u64,
    pub uncertain_count: u64,
    pub forgotten_count: u64,
    pub mastery_percentage: f64,
    pub unlocked_next_tier: bool,
}

#[derive(Debug, Clone)]
pub struct MasterySnapshot {
    pub states: LatestStates,
    pub stats: MasteryStats,
}

/// Mastery & progression engine. Holds no per-user state: every call
/// re-reads the log and catalog and recomputes from scratch.
#[derive(Clone)]
pub struct MasteryEngine {
    config: MasteryConfig,
    events: Arc<dyn EventStore>,
    catalog: Arc<dyn ItemCatalog>,
}

impl MasteryEngine {
    pub fn new(
        config: MasteryConfig,
        events: Arc<dyn EventStore>,
        catalog: Arc<dyn ItemCatalog>,
    ) -> Self {
        Self {
            config,
            events,
            catalog,
        }
    }

    pub async fn latest_states(&self, user_id: UserId) -> Result<LatestStates, EngineError> {
        let events = self.bounded(self.events.read_events(user_id)).await?;
        Ok(reduce_latest(&events))
    }

    pub async fn denominator(&self) -> Result<u64, EngineError> {
        let count = match self.config.denominator {
            DenominatorPolicy::Fixed(value) => value,
            DenominatorPolicy::Tier(tier) => {
                self.bounded(self.catalog.count_items(&TierFilter::single(tier)))
                    .await?
            }
            DenominatorPolicy::Catalog => {
                self.bounded(self.catalog.count_items(&TierFilter::All)).await?
            }
        };
        Ok(count)
    }

    pub async fn snapshot(&self, user_id: UserId) -> Result<MasterySnapshot, EngineError> {
        let (states, denominator) =
            tokio::try_join!(self.latest_states(user_id), self.denominator())?;
        let stats = aggregator::aggregate(&states, denominator);
        Ok(MasterySnapshot { states, stats })
    }

    pub async fn user_stats(&self, user_id: UserId) -> Result<UserStats, EngineError> {
        let MasterySnapshot { stats, .. } = self.snapshot(user_id).await?;
        let unlocked = gate::is_unlocked(stats.mastery_percentage, self.config.unlock_threshold);

        tracing::debug!(
            user_id,
            reviewed = stats.total_distinct_items_reviewed,
            retained = stats.retained_count,
            mastery = stats.mastery_percentage,
            unlocked,
            "computed mastery stats"
        );

        Ok(UserStats {
            total_learned: stats.total_distinct_items_reviewed,
            retained_count: stats.retained_count,
            uncertain_count: stats.uncertain_count,
            forgotten_count: stats.forgotten_count,
            mastery_percentage: stats.mastery_percentage,
            unlocked_next_tier: unlocked,
        })
    }

    /// A random sample of catalog items matching `filter`, without any
    /// per-user ordering.
    pub async fn browse_items(
        &self,
        filter: &TierFilter,
        limit: usize,
    ) -> Result<Vec<Item>, EngineError> {
        Ok(self.bounded(self.catalog.sample_items(filter, limit)).await?)
    }

    pub async fn select_session(&self, user_id: UserId) -> Result<SessionSelection, EngineError> {
        let MasterySnapshot { states, stats } = self.snapshot(user_id).await?;
        let policy = SelectionPolicy::resolve(stats.mastery_percentage, &self.config);
        let pool = self
            .bounded(self.catalog.list_items(&policy.tier_filter(&self.config)))
            .await?;
        let pool_size = pool.len();

        let items = {
            let mut rng = rand::rng();
            selector::select_items(pool, &states, self.config.session_size, &mut rng)
        };

        tracing::debug!(
            user_id,
            mode = policy.as_str(),
            pool_size,
            selected = items.len(),
            "selected learning session"
        );

        Ok(SessionSelection {
            items,
            mode: policy,
        })
    }

    pub async fn compose_exam(&self, user_id: UserId) -> Result<ExamOutcome, EngineError> {
        let states = self.latest_states(user_id).await?;

        let eligible = match exam::check_eligibility(states.mastered_ids(), &self.config) {
            Ok(eligible) => eligible,
            Err(lock) => {
                tracing::debug!(
                    user_id,
                    current = lock.current,
                    required = lock.required,
                    "exam locked"
                );
                return Ok(ExamOutcome::Locked(lock));
            }
        };

        let pool = self
            .bounded(self.catalog.get_items(eligible.mastered_ids()))
            .await?;

        let composed = {
            let mut rng = rand::rng();
            eligible.compose(pool, &mut rng)
        };

        tracing::info!(
            user_id,
            total_mastered = composed.total_mastered,
            exam_size = composed.exam_size,
            "composed exam"
        );

        Ok(ExamOutcome::Composed(composed))
    }

    /// Appends a review outcome. The write runs to completion on its own
    /// task, so neither a dropped caller nor an elapsed wait cancels it.
    /// When the wait elapses the caller gets
    /// [`EngineError::AppendUnconfirmed`]: the event may or may not be in
    /// the log and must not be blindly resubmitted.
    pub async fn submit_review(
        &self,
        user_id: UserId,
        item_id: ItemId,
        outcome: Outcome,
    ) -> Result<EventId, EngineError> {
        let known = self.bounded(self.catalog.get_items(&[item_id])).await?;
        if known.is_empty() {
            return Err(EngineError::UnknownItem(item_id));
        }

        let events = Arc::clone(&self.events);
        let task = tokio::spawn(async move {
            let result = events.append(user_id, item_id, outcome).await;
            if let Err(err) = &result {
                tracing::warn!(user_id, item_id, error = %err, "review append failed");
            }
            result
        });

        let event_id = match tokio::time::timeout(self.config.storage_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(err)) => return Err(EngineError::AppendAborted(err.to_string())),
            Err(_elapsed) => {
                tracing::warn!(
                    user_id,
                    item_id,
                    timeout_ms = self.config.storage_timeout.as_millis() as u64,
                    "review append still running, outcome unconfirmed"
                );
                return Err(EngineError::AppendUnconfirmed);
            }
        };

        tracing::info!(
            user_id,
            item_id,
            event_id,
            outcome = outcome.as_str(),
            "review appended"
        );

        Ok(event_id)
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.config.storage_timeout, operation)
            .await
            .map_err(|_| StorageError::Timeout)?
    }
}
