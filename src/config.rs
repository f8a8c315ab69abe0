//! Solver configuration.
//!
//! Global constraint parameters shared by every search attempt.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::models::{Day, ShiftTable, Slot};

/// Global parameters of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Ordered teaching days.
    pub working_days: Vec<Day>,
    /// Ordered slot ordinals of a day.
    pub slots: Vec<Slot>,
    /// Wall-clock budget for the whole driver loop, in seconds.
    pub time_limit_secs: f64,
    /// Distinct solutions to collect before stopping.
    pub max_solutions: usize,
    /// Solutions to report (≤ `max_solutions`).
    pub top_k: usize,
    /// Seed of the first attempt; attempt `n` uses `random_seed + n`.
    pub random_seed: u64,
    /// Named slot groups referenced by batch shift rules.
    pub shifts: ShiftTable,
    /// Run attempts in parallel waves on independent copies.
    pub parallel_attempts: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            working_days: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .into_iter()
                .map(String::from)
                .collect(),
            slots: (1..=6).collect(),
            time_limit_secs: 60.0,
            max_solutions: 4,
            top_k: 4,
            random_seed: 42,
            shifts: ShiftTable::new(),
            parallel_attempts: false,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_days<I, D>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Day>,
    {
        self.working_days = days.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_slots(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.slots = slots.into_iter().collect();
        self
    }

    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets `max_solutions`, clamping `top_k` to it.
    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = max_solutions;
        self.top_k = self.top_k.min(max_solutions);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_shifts(mut self, shifts: ShiftTable) -> Self {
        self.shifts = shifts;
        self
    }

    pub fn with_parallel_attempts(mut self, enabled: bool) -> Self {
        self.parallel_attempts = enabled;
        self
    }

    /// Time budget as a [`Duration`].
    ///
    /// NaN, zero and negative values yield zero. Positive values too large
    /// for a `Duration` saturate to [`Duration::MAX`].
    pub fn time_limit(&self) -> Duration {
        let secs = self.time_limit_secs;
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Deadline `time_limit()` after `started`.
    ///
    /// An unrepresentable instant is halved towards `started` until the
    /// platform clock can hold it.
    pub fn deadline_from(&self, started: Instant) -> Instant {
        let mut limit = self.time_limit();
        loop {
            if let Some(deadline) = started.checked_add(limit) {
                return deadline;
            }
            limit /= 2;
        }
    }

    /// Attempt cap: `max(1, max_solutions × 20)`.
    pub fn max_attempts(&self) -> usize {
        self.max_solutions.saturating_mul(20).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.working_days, vec!["Mon", "Tue", "Wed", "Thu", "Fri"]);
        assert_eq!(cfg.slots, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(cfg.max_solutions, 4);
        assert_eq!(cfg.top_k, 4);
        assert_eq!(cfg.random_seed, 42);
        assert_eq!(cfg.time_limit(), Duration::from_secs(60));
        assert_eq!(cfg.max_attempts(), 80);
    }

    #[test]
    fn test_max_solutions_clamps_top_k() {
        let cfg = SolverConfig::new().with_max_solutions(2);
        assert_eq!(cfg.top_k, 2);
        assert_eq!(cfg.max_attempts(), 40);
        assert_eq!(SolverConfig::new().with_max_solutions(0).max_attempts(), 1);
    }

    #[test]
    fn test_invalid_time_limit_is_zero() {
        let cfg = SolverConfig::new().with_time_limit_secs(-1.0);
        assert_eq!(cfg.time_limit(), Duration::ZERO);
        let cfg = SolverConfig::new().with_time_limit_secs(f64::NAN);
        assert_eq!(cfg.time_limit(), Duration::ZERO);
    }

    #[test]
    fn test_huge_time_limit_saturates() {
        let cfg = SolverConfig::new().with_time_limit_secs(1e300);
        assert_eq!(cfg.time_limit(), Duration::MAX);
    }

    #[test]
    fn test_deadline_from_never_overflows() {
        let started = Instant::now();
        for secs in [1e19, 1e300] {
            let cfg = SolverConfig::new().with_time_limit_secs(secs);
            assert!(cfg.deadline_from(started) > started + Duration::from_secs(3600));
        }
        let cfg = SolverConfig::new().with_time_limit_secs(2.0);
        assert_eq!(cfg.deadline_from(started), started + Duration::from_secs(2));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let cfg: SolverConfig =
            serde_json::from_str(r#"{"slots": [1, 2, 3], "random_seed": 7}"#).unwrap();
        assert_eq!(cfg.slots, vec![1, 2, 3]);
        assert_eq!(cfg.random_seed, 7);
        assert_eq!(cfg.working_days.len(), 5);
        assert!(!cfg.parallel_attempts);
    }
}
