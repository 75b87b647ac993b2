use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::config::MasteryConfig;
use super::gate;
use super::types::{Item, LatestStates, Outcome, TierFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Below the mix threshold: base tier only.
    Focus,
    /// At or above the mix threshold: base tier interleaved with the next tier.
    Mixed,
}

impl SelectionPolicy {
    pub fn resolve(mastery_percentage: f64, config: &MasteryConfig) -> Self {
        if gate::is_unlocked(mastery_percentage, config.unlock_threshold) {
            SelectionPolicy::Mixed
        } else {
            SelectionPolicy::Focus
        }
    }

    pub fn tier_filter(self, config: &MasteryConfig) -> TierFilter {
        match self {
            SelectionPolicy::Focus => TierFilter::single(config.base_tier),
            SelectionPolicy::Mixed => TierFilter::Only(vec![config.base_tier, config.next_tier]),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SelectionPolicy::Focus => "focus",
            SelectionPolicy::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSelection {
    pub items: Vec<Item>,
    pub mode: SelectionPolicy,
}

/// Weak-first ordering key. Unseen items sort first, then by latest outcome
/// from worst to best.
pub fn priority(outcome: Option<Outcome>) -> u8 {
    match outcome {
        None => 0,
        Some(outcome) => 1 + outcome.code(),
    }
}

/// Shuffles the pool uniformly, then stable-sorts by priority, so items of
/// equal priority come out in random order. A pool smaller than `limit` is
/// returned whole.
pub fn select_items<R>(pool: Vec<Item>, states: &LatestStates, limit: usize, rng: &mut R) -> Vec<Item>
where
    R: Rng + ?Sized,
{
    let mut pool = pool;
    pool.shuffle(rng);
    pool.sort_by_key(|item| priority(states.outcome_of(item.id)));
    pool.truncate(limit);
    pool
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::mastery::reducer::reduce_latest;
    use crate::mastery::types::ReviewEvent;

    fn item(id: i64) -> Item {
        Item {
            id,
            tier: 1,
            kanji: String::new(),
            kana: format!("kana-{id}"),
            romaji: format!("romaji-{id}"),
            meaning: format!("meaning-{id}"),
            example_sentence: String::new(),
        }
    }

    fn reviewed(entries: &[(i64, Outcome)]) -> LatestStates {
        let now = Utc::now();
        let events: Vec<ReviewEvent> = entries
            .iter()
            .enumerate()
            .map(|(idx, (item_id, outcome))| ReviewEvent {
                id: idx as i64 + 1,
                user_id: 1,
                item_id: *item_id,
                outcome: *outcome,
                reviewed_at: now,
            })
            .collect();
        reduce_latest(&events)
    }

    #[test]
    fn policy_resolution_uses_inclusive_threshold() {
        let config = MasteryConfig::default();
        assert_eq!(SelectionPolicy::resolve(89.9, &config), SelectionPolicy::Focus);
        assert_eq!(SelectionPolicy::resolve(90.0, &config), SelectionPolicy::Mixed);
        assert_eq!(
            SelectionPolicy::Mixed.tier_filter(&config),
            TierFilter::Only(vec![1, 2])
        );
        assert_eq!(SelectionPolicy::Focus.tier_filter(&config), TierFilter::single(1));
    }

    #[test]
    fn priority_puts_unseen_then_worst_first() {
        assert!(priority(None) < priority(Some(Outcome::Forgotten)));
        assert!(priority(Some(Outcome::Forgotten)) < priority(Some(Outcome::Uncertain)));
        assert!(priority(Some(Outcome::Uncertain)) < priority(Some(Outcome::Retained)));
    }

    #[test]
    fn weak_items_rank_ahead_of_retained() {
        // A forgotten, B retained, C never seen.
        let states = reviewed(&[(1, Outcome::Forgotten), (2, Outcome::Retained)]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut first_two: HashMap<i64, usize> = HashMap::new();

        for _ in 0..500 {
            let picked = select_items(vec![item(1), item(2), item(3)], &states, 2, &mut rng);
            for picked_item in picked {
                *first_two.entry(picked_item.id).or_default() += 1;
            }
        }

        assert_eq!(first_two.get(&3), Some(&500));
        assert_eq!(first_two.get(&1), Some(&500));
        assert_eq!(first_two.get(&2), None);
    }

    #[test]
    fn retained_items_remain_candidates() {
        let states = reviewed(&[(1, Outcome::Retained), (2, Outcome::Retained)]);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select_items(vec![item(1), item(2)], &states, 10, &mut rng);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn equal_priority_items_are_shuffled() {
        let states = LatestStates::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut leaders: HashMap<i64, usize> = HashMap::new();

        for _ in 0..1000 {
            let pool: Vec<Item> = (1..=5).map(item).collect();
            let picked = select_items(pool, &states, 1, &mut rng);
            *leaders.entry(picked[0].id).or_default() += 1;
        }

        assert_eq!(leaders.len(), 5);
        assert!(leaders.values().all(|count| *count > 100));
    }

    #[test]
    fn small_pool_is_clamped_not_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let picked = select_items(vec![item(1)], &LatestStates::default(), 10, &mut rng);
        assert_eq!(picked.len(), 1);
        let picked = select_items(Vec::new(), &LatestStates::default(), 10, &mut rng);
        assert!(picked.is_empty());
    }
}
