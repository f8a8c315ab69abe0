//! Declarative placement constraints.
//!
//! Small value types attached to rooms, faculty, batches and subjects
//! that restrict where a session may land: fixed lab blocks, pinned
//! slots, blackout slots and shift rules.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Day, Slot};

/// An institution-mandated lab block: `duration` consecutive slots
/// starting at `start_slot`.
///
/// When a lab session meets an entity that declares a fixed lab slot
/// for the session's semester, the block replaces whatever start slot
/// and duration the search proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedLabSlot {
    /// First slot of the block.
    pub start_slot: Slot,
    /// Number of consecutive slots.
    #[serde(alias = "duration_slots")]
    pub duration: u32,
}

impl FixedLabSlot {
    /// Creates a fixed lab block.
    pub fn new(start_slot: Slot, duration: u32) -> Self {
        Self {
            start_slot,
            duration,
        }
    }

    /// Last slot covered by the block (inclusive).
    pub fn end_slot(&self) -> Slot {
        self.start_slot + self.duration.saturating_sub(1)
    }
}

/// A single (day, slot) coordinate.
///
/// Used for pinned slots, maintenance windows and faculty
/// unavailability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub day: Day,
    pub slot: Slot,
}

impl SlotRef {
    pub fn new(day: impl Into<Day>, slot: Slot) -> Self {
        Self {
            day: day.into(),
            slot,
        }
    }
}

/// Shift placement rule for a batch.
///
/// Lecture sessions must fall entirely inside the `lecture` shift,
/// lab sessions inside the `lab` shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRule {
    #[serde(alias = "lectures")]
    pub lecture: String,
    #[serde(alias = "labs")]
    pub lab: String,
}

impl ShiftRule {
    pub fn new(lecture: impl Into<String>, lab: impl Into<String>) -> Self {
        Self {
            lecture: lecture.into(),
            lab: lab.into(),
        }
    }

    /// Shift name required for a session of the given kind.
    pub fn shift_for(&self, is_lab: bool) -> &str {
        if is_lab {
            &self.lab
        } else {
            &self.lecture
        }
    }
}

/// Named groups of slots (e.g. `morning → {1, 2, 3}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftTable {
    shifts: BTreeMap<String, BTreeSet<Slot>>,
}

impl ShiftTable {
    /// Creates an empty shift table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: defines a shift.
    pub fn with_shift(
        mut self,
        name: impl Into<String>,
        slots: impl IntoIterator<Item = Slot>,
    ) -> Self {
        self.define(name, slots);
        self
    }

    /// Defines (or replaces) a shift.
    pub fn define(&mut self, name: impl Into<String>, slots: impl IntoIterator<Item = Slot>) {
        self.shifts.insert(name.into(), slots.into_iter().collect());
    }

    /// Whether every slot in `[start, start + duration)` belongs to `shift`.
    ///
    /// Unknown shift names contain nothing, and neither does a run past
    /// `Slot::MAX`.
    pub fn covers(&self, shift: &str, start: Slot, duration: u32) -> bool {
        match (self.shifts.get(shift), start.checked_add(duration)) {
            (Some(slots), Some(end)) => (start..end).all(|s| slots.contains(&s)),
            _ => false,
        }
    }

    /// Whether `shift` is defined.
    pub fn contains(&self, shift: &str) -> bool {
        self.shifts.contains_key(shift)
    }

    /// Number of defined shifts.
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    /// Whether no shift is defined.
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}
