//! Exam composition over the mastered item set.
//!
//! `Locked -> Eligible -> Composed`, recomputed on every request:
//! [`check_eligibility`] yields either an [`ExamLock`] carrying the shortfall
//! or an [`EligibleExam`], and [`EligibleExam::compose`] samples the items.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::config::MasteryConfig;
use super::types::{Item, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExamLock {
    pub current: usize,
    pub required: usize,
}

impl ExamLock {
    pub fn shortfall(&self) -> usize {
        self.required.saturating_sub(self.current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleExam {
    mastered: Vec<ItemId>,
    exam_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposedExam {
    pub items: Vec<Item>,
    pub total_mastered: usize,
    pub exam_size: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExamOutcome {
    Locked(ExamLock),
    Composed(ComposedExam),
}

/// `max(floor(mastered * fraction), min_exam_size)`.
pub fn exam_size(mastered_count: usize, config: &MasteryConfig) -> usize {
    let scaled = (mastered_count as f64 * config.exam_fraction).floor() as usize;
    scaled.max(config.min_exam_size)
}

pub fn check_eligibility(
    mastered: Vec<ItemId>,
    config: &MasteryConfig,
) -> Result<EligibleExam, ExamLock> {
    let current = mastered.len();
    if current < config.min_mastered_for_exam {
        return Err(ExamLock {
            current,
            required: config.min_mastered_for_exam,
        });
    }

    Ok(EligibleExam {
        exam_size: exam_size(current, config),
        mastered,
    })
}

impl EligibleExam {
    pub fn mastered_ids(&self) -> &[ItemId] {
        &self.mastered
    }

    pub fn total_mastered(&self) -> usize {
        self.mastered.len()
    }

    pub fn exam_size(&self) -> usize {
        self.exam_size
    }

    /// Samples without replacement from `pool`, keeping only items that are
    /// in the mastered set. The pool may have shrunk since eligibility was
    /// checked, so the size is clamped to what is actually available.
    pub fn compose<R>(self, pool: Vec<Item>, rng: &mut R) -> ComposedExam
    where
        R: Rng + ?Sized,
    {
        let mut ids = self.mastered.clone();
        ids.sort_unstable();

        let mut candidates: Vec<Item> = pool
            .into_iter()
            .filter(|item| ids.binary_search(&item.id).is_ok())
            .collect();
        candidates.sort_by_key(|item| item.id);
        candidates.dedup_by_key(|item| item.id);

        let size = self.exam_size.min(candidates.len());
        let (sampled, _) = candidates.partial_shuffle(rng, size);

        ComposedExam {
            items: sampled.to_vec(),
            total_mastered: self.mastered.len(),
            exam_size: size,
        }
    }
}
