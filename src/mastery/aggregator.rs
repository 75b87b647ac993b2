use super::types::{LatestStates, MasteryStats, Outcome};

/// Counts latest states per outcome and scores retained items against
/// `denominator`.
///
/// The percentage is not capped: a denominator smaller than the retained
/// count yields a value above 100. A zero denominator yields 0.
pub fn aggregate(states: &LatestStates, denominator: u64) -> MasteryStats {
    let mut retained = 0u64;
    let mut uncertain = 0u64;
    let mut forgotten = 0u64;

    for state in states.iter() {
        match state.outcome {
            Outcome::Retained => retained += 1,
            Outcome::Uncertain => uncertain += 1,
            Outcome::Forgotten => forgotten += 1,
        }
    }

    MasteryStats {
        total_distinct_items_reviewed: states.len() as u64,
        retained_count: retained,
        uncertain_count: uncertain,
        forgotten_count: forgotten,
        mastery_percentage: mastery_percentage(retained, denominator),
    }
}

pub fn mastery_percentage(retained: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    retained as f64 / denominator as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::mastery::reducer::reduce_latest;
    use crate::mastery::types::ReviewEvent;

    fn states(outcomes: &[(i64, Outcome)]) -> LatestStates {
        let now = Utc::now();
        let events: Vec<ReviewEvent> = outcomes
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
    fn counts_each_bucket() {
        let states = states(&[
            (1, Outcome::Retained),
            (2, Outcome::Retained),
            (3, Outcome::Uncertain),
            (4, Outcome::Forgotten),
        ]);
        let stats = aggregate(&states, 8);
        assert_eq!(stats.total_distinct_items_reviewed, 4);
        assert_eq!(stats.retained_count, 2);
        assert_eq!(stats.uncertain_count, 1);
        assert_eq!(stats.forgotten_count, 1);
        assert!((stats.mastery_percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn small_denominator_is_not_capped() {
        let states = states(&[
            (1, Outcome::Retained),
            (2, Outcome::Retained),
            (3, Outcome::Retained),
        ]);
        let stats = aggregate(&states, 2);
        assert!((stats.mastery_percentage - 150.0).abs() < 1e-9);
    }

    #[test]
    fn zero_denominator_yields_zero() {
        let states = states(&[(1, Outcome::Retained)]);
        assert_eq!(aggregate(&states, 0).mastery_percentage, 0.0);
    }

    #[test]
    fn empty_states_are_all_zero() {
        let stats = aggregate(&LatestStates::default(), 100);
        assert_eq!(stats.total_distinct_items_reviewed, 0);
        assert_eq!(stats.mastery_percentage, 0.0);
    }
}
