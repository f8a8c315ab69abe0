//! Evaluation context for placement rules.

use std::collections::BTreeSet;

use crate::config::SolverConfig;
use crate::models::{covered_slots, Day, ShiftTable, Slot};

/// Global state shared by every rule check: the working week and the
/// shift table.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    /// Teaching days, in order.
    pub working_days: Vec<Day>,
    /// Slot ordinals of a day, in order.
    pub slots: Vec<Slot>,
    slot_set: BTreeSet<Slot>,
    /// Named slot groups.
    pub shifts: ShiftTable,
}

impl EvaluationContext {
    /// Creates a context for the given week.
    pub fn new<I, D>(days: I, slots: impl IntoIterator<Item = Slot>) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Day>,
    {
        let slots: Vec<Slot> = slots.into_iter().collect();
        Self {
            working_days: days.into_iter().map(Into::into).collect(),
            slot_set: slots.iter().copied().collect(),
            slots,
            shifts: ShiftTable::new(),
        }
    }

    /// Builds the context from solver configuration.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.working_days.iter().cloned(), config.slots.iter().copied())
            .with_shifts(config.shifts.clone())
    }

    pub fn with_shifts(mut self, shifts: ShiftTable) -> Self {
        self.shifts = shifts;
        self
    }

    /// Whether `day` is a working day.
    pub fn is_working_day(&self, day: &str) -> bool {
        self.working_days.iter().any(|d| d == day)
    }

    /// Whether the run is non-empty and every covered slot is a global slot.
    pub fn covers(&self, start: Slot, duration: u32) -> bool {
        duration > 0
            && start.checked_add(duration).is_some()
            && covered_slots(start, duration).all(|s| self.slot_set.contains(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let cfg = SolverConfig::new().with_slots(1..=4);
        let ctx = EvaluationContext::from_config(&cfg);
        assert!(ctx.is_working_day("Wed"));
        assert!(!ctx.is_working_day("Sat"));
        assert!(ctx.covers(3, 2));
        assert!(!ctx.covers(4, 2));
    }

    #[test]
    fn test_covers_rejects_empty_and_overflowing_runs() {
        let ctx = EvaluationContext::new(["Mon"], [1, 2, Slot::MAX - 1, Slot::MAX]);
        assert!(!ctx.covers(1, 0));
        assert!(!ctx.covers(Slot::MAX, 2));
        assert!(ctx.covers(Slot::MAX - 1, 1));
    }
}
