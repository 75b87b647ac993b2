//! Latest-state reduction over the append-only review log.
//!
//! Each item keeps the event with the greatest `(reviewed_at, id)` pair, so
//! two events sharing a timestamp resolve to the one appended last. The
//! result does not depend on the order events are fed in.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::types::{EventId, ItemId, ItemState, LatestStates, ReviewEvent};

#[derive(Debug, Default)]
pub struct LatestStateReducer {
    latest: BTreeMap<ItemId, (ItemState, EventId)>,
}

impl LatestStateReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &ReviewEvent) {
        let candidate = ItemState {
            item_id: event.item_id,
            outcome: event.outcome,
            reviewed_at: event.reviewed_at,
        };

        match self.latest.entry(event.item_id) {
            Entry::Vacant(slot) => {
                slot.insert((candidate, event.id));
            }
            Entry::Occupied(mut slot) => {
                let (current, current_id) = slot.get();
                if (event.reviewed_at, event.id) > (current.reviewed_at, *current_id) {
                    slot.insert((candidate, event.id));
                }
            }
        }
    }

    pub fn finish(self) -> LatestStates {
        LatestStates::from_map(
            self.latest
                .into_iter()
                .map(|(item_id, (state, _))| (item_id, state))
                .collect(),
        )
    }
}

pub fn reduce_latest<'a, I>(events: I) -> LatestStates
where
    I: IntoIterator<Item = &'a ReviewEvent>,
{
    let mut reducer = LatestStateReducer::new();
    for event in events {
        reducer.apply(event);
    }
    reducer.finish()
}
