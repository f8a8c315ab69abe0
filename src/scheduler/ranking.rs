//! Solution scoring, deduplication and ranking.
//!
//! # Score
//!
//! | Bonus | Condition (per occupied slot entry) |
//! |-------|-------------------------------------|
//! | +2 | Faculty prefers both the day and the slot |
//! | +1 | Room utilization `batch_size / capacity` ≥ 0.70 |
//!
//! The score only ranks completed solutions; it never prunes the search.
//!
//! # Normalization
//! Raw scores map linearly onto `[1, 100]`
//! (`round(1 + (s - min) / (max - min) × 99)`); when all collected
//! scores are equal, every solution gets 100.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::models::{Faculty, Room, Timetable};

/// Bonus for a placement on a preferred day and slot.
pub const PREFERENCE_BONUS: i64 = 2;
/// Bonus for a well-utilized room.
pub const UTILIZATION_BONUS: i64 = 1;
/// Minimum `batch_size / capacity` earning the utilization bonus.
pub const UTILIZATION_THRESHOLD: f64 = 0.70;

/// A ranked, distinct timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Raw soft-preference score.
    pub score: i64,
    /// Score mapped onto 1..=100 among the collected solutions.
    pub score_norm: u32,
    /// BLAKE3 hex signature.
    pub signature: String,
    pub schedule: Timetable,
}

/// Computes the raw score of a timetable.
pub fn score(
    timetable: &Timetable,
    faculty: &BTreeMap<String, Faculty>,
    rooms: &BTreeMap<String, Room>,
) -> i64 {
    timetable
        .entries()
        .map(|(_, day, slot, a)| {
            let mut bonus = 0;
            if faculty
                .get(&a.faculty_id)
                .is_some_and(|f| f.prefers(day, slot))
            {
                bonus += PREFERENCE_BONUS;
            }
            if let Some(room) = rooms.get(&a.room_id) {
                let utilization = f64::from(a.batch_size) / f64::from(room.capacity.max(1));
                if utilization >= UTILIZATION_THRESHOLD {
                    bonus += UTILIZATION_BONUS;
                }
            }
            bonus
        })
        .sum()
}

/// Maps raw scores onto `[1, 100]`.
pub fn normalize_scores(scores: &[i64]) -> Vec<u32> {
    let (Some(&lo), Some(&hi)) = (scores.iter().min(), scores.iter().max()) else {
        return Vec::new();
    };
    if hi == lo {
        return vec![100; scores.len()];
    }
    let span = (hi - lo) as f64;
    scores
        .iter()
        .map(|&s| (1.0 + (s - lo) as f64 / span * 99.0).round() as u32)
        .collect()
}

/// Collects distinct solutions and ranks them.
#[derive(Debug, Clone, Default)]
pub struct SolutionPool {
    seen: HashSet<String>,
    collected: Vec<(i64, String, Timetable)>,
}

impl SolutionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a timetable unless one with the same signature is present.
    ///
    /// Returns whether it was added.
    pub fn offer(&mut self, timetable: Timetable, score: i64) -> bool {
        let signature = timetable.signature();
        if !self.seen.insert(signature.clone()) {
            return false;
        }
        self.collected.push((score, signature, timetable));
        true
    }

    pub fn len(&self) -> usize {
        self.collected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }

    /// Solutions by score, highest first; ties keep discovery order.
    pub fn into_ranked(self) -> Vec<Solution> {
        let mut collected = self.collected;
        collected.sort_by(|a, b| b.0.cmp(&a.0));
        let raw: Vec<i64> = collected.iter().map(|(s, _, _)| *s).collect();
        collected
            .into_iter()
            .zip(normalize_scores(&raw))
            .map(|((score, signature, schedule), score_norm)| Solution {
                score,
                score_norm,
                signature,
                schedule,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Assignment;

    fn tt_at(slot: u32, batch_size: u32) -> Timetable {
        let mut tt = Timetable::new();
        tt.assign(
            1,
            "Mon",
            slot,
            &Assignment::new("B1", "S1", "F1", "R1", 1).with_batch_size(batch_size),
        );
        tt
    }

    fn maps() -> (BTreeMap<String, Faculty>, BTreeMap<String, Room>) {
        let f = Faculty::new("F1", 10).with_preferences(["Mon"], [1]);
        let r = Room::lecture("R1", 40);
        (
            BTreeMap::from([(f.id.clone(), f)]),
            BTreeMap::from([(r.id.clone(), r)]),
        )
    }

    #[test]
    fn test_score_bonuses() {
        let (faculty, rooms) = maps();
        assert_eq!(score(&tt_at(1, 30), &faculty, &rooms), 3); // preferred + 0.75
        assert_eq!(score(&tt_at(2, 30), &faculty, &rooms), 1);
        assert_eq!(score(&tt_at(1, 20), &faculty, &rooms), 2);
        assert_eq!(score(&tt_at(2, 27), &faculty, &rooms), 0); // 0.675
        assert_eq!(score(&tt_at(2, 28), &faculty, &rooms), 1); // exactly 0.70
    }

    #[test]
    fn test_score_counts_each_covered_slot() {
        let (faculty, rooms) = maps();
        let mut tt = Timetable::new();
        tt.assign(
            1,
            "Tue",
            1,
            &Assignment::new("B1", "S1", "F1", "R1", 1)
                .with_duration(2)
                .with_batch_size(40),
        );
        assert_eq!(score(&tt, &faculty, &rooms), 2);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_scores(&[10, 5, 0]), vec![100, 51, 1]);
        assert_eq!(normalize_scores(&[7, 7, 7]), vec![100, 100, 100]);
        assert_eq!(normalize_scores(&[3]), vec![100]);
        assert!(normalize_scores(&[]).is_empty());
        assert!(normalize_scores(&[-4, 9, 2, 100])
            .iter()
            .all(|n| (1..=100).contains(n)));
    }

    #[test]
    fn test_pool_dedup_and_rank() {
        let mut pool = SolutionPool::new();
        assert!(pool.offer(tt_at(1, 30), 1));
        assert!(!pool.offer(tt_at(1, 30), 1));
        assert!(pool.offer(tt_at(2, 30), 5));
        assert!(pool.offer(tt_at(3, 30), 1));
        assert_eq!(pool.len(), 3);

        let ranked = pool.into_ranked();
        let scores: Vec<i64> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![5, 1, 1]);
        assert_eq!(ranked[0].score_norm, 100);
        assert_eq!(ranked[2].score_norm, 1);
        // Stable among ties: slot 1 was found before slot 3.
        assert_eq!(ranked[1].signature, tt_at(1, 30).signature());
    }

    #[test]
    fn test_solution_output_shape() {
        let mut pool = SolutionPool::new();
        pool.offer(tt_at(1, 30), 3);
        let json = serde_json::to_value(&pool.into_ranked()[0]).unwrap();
        assert_eq!(json["score"], 3);
        assert_eq!(json["score_norm"], 100);
        assert_eq!(json["signature"].as_str().map(str::len), Some(64));
        assert_eq!(json["schedule"]["1"]["Mon"]["1"][0]["room"], "R1");
    }
}
