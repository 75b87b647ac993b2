/// Unlock decision for the next tier. Recomputed from current mastery on
/// every call, so a regression below the threshold revokes it.
pub fn is_unlocked(mastery_percentage: f64, threshold: f64) -> bool {
    mastery_percentage >= threshold
}
