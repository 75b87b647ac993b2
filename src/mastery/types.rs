use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ItemId = i64;
pub type EventId = i64;
pub type Tier = i32;

/// Recall result of a single review, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Outcome {
    Forgotten,
    Uncertain,
    Retained,
}

impl Outcome {
    pub fn code(self) -> u8 {
        match self {
            Outcome::Forgotten => 0,
            Outcome::Uncertain => 1,
            Outcome::Retained => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Outcome::Forgotten),
            1 => Some(Outcome::Uncertain),
            2 => Some(Outcome::Retained),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Forgotten => "forgotten",
            Outcome::Uncertain => "uncertain",
            Outcome::Retained => "retained",
        }
    }
}

impl From<Outcome> for u8 {
    fn from(value: Outcome) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for Outcome {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Outcome::from_code(i64::from(value)).ok_or_else(|| format!("invalid outcome code: {value}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub id: EventId,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub outcome: Outcome,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemState {
    pub item_id: ItemId,
    pub outcome: Outcome,
    pub reviewed_at: DateTime<Utc>,
}

/// Latest outcome per reviewed item. Items never reviewed are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestStates {
    states: BTreeMap<ItemId, ItemState>,
}

impl LatestStates {
    pub(crate) fn from_map(states: BTreeMap<ItemId, ItemState>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn outcome_of(&self, item_id: ItemId) -> Option<Outcome> {
        self.states.get(&item_id).map(|state| state.outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemState> {
        self.states.values()
    }

    pub fn ids_with_outcome(&self, outcome: Outcome) -> Vec<ItemId> {
        self.states
            .values()
            .filter(|state| state.outcome == outcome)
            .map(|state| state.item_id)
            .collect()
    }

    pub fn mastered_ids(&self) -> Vec<ItemId> {
        self.ids_with_outcome(Outcome::Retained)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MasteryStats {
    pub total_distinct_items_reviewed: u64,
    pub retained_count: u64,
    pub uncertain_count: u64,
    pub forgotten_count: u64,
    pub mastery_percentage: f64,
}

/// Catalog entry. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub tier: Tier,
    pub kanji: String,
    pub kana: String,
    pub romaji: String,
    pub meaning: String,
    pub example_sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TierFilter {
    #[default]
    All,
    Only(Vec<Tier>),
}

impl TierFilter {
    pub fn single(tier: Tier) -> Self {
        TierFilter::Only(vec![tier])
    }

    pub fn matches(&self, tier: Tier) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Only(tiers) => tiers.contains(&tier),
        }
    }
}
