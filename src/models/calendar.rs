//! Slot calendars and the resource calendar contract.
//!
//! Every room, faculty member and batch owns a [`SlotCalendar`]: an
//! availability window (allowed days and slots), a set of blocked
//! slots (maintenance, declared unavailability) and an occupancy
//! ledger `day → slot → [Assignment]`.
//!
//! # Availability
//! A run of `duration` consecutive slots starting at `start` on `day`
//! is available iff:
//! - `day` is an allowed day and every covered slot is an allowed slot,
//! - no covered slot is blocked, AND
//! - no covered slot already holds an assignment.
//!
//! Empty `available_days` / `available_slots` mean "no restriction".
//!
//! # Reversibility
//! [`ResourceCalendar::unassign`] is the exact inverse of a successful
//! [`ResourceCalendar::assign`]: the ledger (and any hour counters kept
//! by the implementor) return to the prior state, empty entries pruned.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Assignment, Day, FixedLabSlot, Semester, Slot, SlotRef};
use crate::error::CalendarError;

/// Slots covered by a run of `duration` slots starting at `start`.
///
/// Clamped at `Slot::MAX`.
#[inline]
pub fn covered_slots(start: Slot, duration: u32) -> std::ops::Range<Slot> {
    start..start.saturating_add(duration)
}

/// Per-entity slot occupancy ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotCalendar {
    /// Days on which the entity can be used. Empty = every day.
    #[serde(default)]
    pub available_days: Vec<Day>,
    /// Slots in which the entity can be used. Empty = every slot.
    #[serde(default)]
    pub available_slots: BTreeSet<Slot>,
    /// Individually blocked slots (override the availability window).
    #[serde(default)]
    pub blocked: BTreeSet<SlotRef>,
    #[serde(skip)]
    occupancy: BTreeMap<Day, BTreeMap<Slot, Vec<Assignment>>>,
}

impl SlotCalendar {
    /// Creates an unrestricted, empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the calendar to the given days.
    pub fn with_days<I, D>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Day>,
    {
        self.available_days = days.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the calendar to the given slots.
    pub fn with_slots(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.available_slots = slots.into_iter().collect();
        self
    }

    /// Blocks a single slot.
    pub fn with_blocked(mut self, day: impl Into<Day>, slot: Slot) -> Self {
        self.blocked.insert(SlotRef::new(day, slot));
        self
    }

    /// Whether `day` is inside the availability window.
    pub fn allows_day(&self, day: &str) -> bool {
        self.available_days.is_empty() || self.available_days.iter().any(|d| d == day)
    }

    /// Whether `slot` is inside the availability window.
    pub fn allows_slot(&self, slot: Slot) -> bool {
        self.available_slots.is_empty() || self.available_slots.contains(&slot)
    }

    /// Whether the whole run lies inside the availability window.
    pub fn within_window(&self, day: &str, start: Slot, duration: u32) -> bool {
        self.allows_day(day) && covered_slots(start, duration).all(|s| self.allows_slot(s))
    }

    /// Whether any slot of the run is blocked.
    pub fn is_blocked(&self, day: &str, start: Slot, duration: u32) -> bool {
        if self.blocked.is_empty() {
            return false;
        }
        covered_slots(start, duration).any(|slot| {
            self.blocked
                .iter()
                .any(|b| b.slot == slot && b.day == day)
        })
    }

    /// Whether no slot of the run holds an assignment.
    pub fn is_free(&self, day: &str, start: Slot, duration: u32) -> bool {
        match self.occupancy.get(day) {
            None => true,
            Some(slots) => covered_slots(start, duration)
                .all(|s| slots.get(&s).map_or(true, |list| list.is_empty())),
        }
    }

    /// Window, blackout and clash check combined.
    pub fn is_available(&self, day: &str, start: Slot, duration: u32) -> bool {
        self.within_window(day, start, duration)
            && !self.is_blocked(day, start, duration)
            && self.is_free(day, start, duration)
    }

    /// Appends `assignment` to every covered slot.
    ///
    /// Does not check availability; see [`ResourceCalendar::assign`].
    pub fn occupy(&mut self, day: &str, start: Slot, duration: u32, assignment: &Assignment) {
        let slots = self.occupancy.entry(day.to_string()).or_default();
        for slot in covered_slots(start, duration) {
            slots.entry(slot).or_default().push(assignment.clone());
        }
    }

    /// Removes one copy of `assignment` from every covered slot.
    ///
    /// # Panics
    /// If any covered slot does not hold `assignment`. Releasing
    /// something that was never occupied is a caller bug.
    pub fn release(&mut self, day: &str, start: Slot, duration: u32, assignment: &Assignment) {
        let slots = self
            .occupancy
            .get_mut(day)
            .unwrap_or_else(|| panic!("release on {day}: nothing occupied that day"));
        for slot in covered_slots(start, duration) {
            let list = slots
                .get_mut(&slot)
                .unwrap_or_else(|| panic!("release on {day} slot {slot}: slot is empty"));
            let pos = list
                .iter()
                .position(|a| a == assignment)
                .unwrap_or_else(|| {
                    panic!("release on {day} slot {slot}: assignment was never occupied")
                });
            list.remove(pos);
            if list.is_empty() {
                slots.remove(&slot);
            }
        }
        if slots.is_empty() {
            self.occupancy.remove(day);
        }
    }

    /// Assignments occupying `(day, slot)`.
    pub fn assignments_at(&self, day: &str, slot: Slot) -> &[Assignment] {
        self.occupancy
            .get(day)
            .and_then(|slots| slots.get(&slot))
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Number of occupied slots on `day`.
    pub fn occupied_on(&self, day: &str) -> u32 {
        self.occupancy
            .get(day)
            .map_or(0, |slots| slots.values().filter(|l| !l.is_empty()).count() as u32)
    }

    /// Number of occupied slots across the week.
    pub fn occupied_total(&self) -> u32 {
        self.occupancy
            .values()
            .map(|slots| slots.values().filter(|l| !l.is_empty()).count() as u32)
            .sum()
    }

    /// Whether nothing is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }
}

/// Contract shared by every calendar owner (room, faculty, batch).
///
/// Implementors supply access to their [`SlotCalendar`] and may hook
/// capacity checks and counters; `assign` / `unassign` are provided.
pub trait ResourceCalendar {
    /// Entity identifier (used in error reports).
    fn id(&self) -> &str;

    fn calendar(&self) -> &SlotCalendar;

    fn calendar_mut(&mut self) -> &mut SlotCalendar;

    /// Fixed lab block this entity mandates for `semester`, if any.
    fn fixed_lab_slot(&self, _semester: Semester) -> Option<FixedLabSlot> {
        None
    }

    /// Rejects an assignment the entity cannot hold regardless of slot.
    ///
    /// `duration` is the effective duration after any fixed-slot override.
    fn check_capacity(
        &self,
        _assignment: &Assignment,
        _duration: u32,
    ) -> Result<(), CalendarError> {
        Ok(())
    }

    /// Called after an assignment is committed.
    fn on_assign(&mut self, _assignment: &Assignment, _duration: u32) {}

    /// Called after an assignment is released.
    fn on_unassign(&mut self, _assignment: &Assignment, _duration: u32) {}

    /// Start slot and duration after applying the fixed lab-slot override.
    fn effective_window(&self, start: Slot, assignment: &Assignment) -> (Slot, u32) {
        if assignment.is_lab {
            if let Some(fixed) = self.fixed_lab_slot(assignment.semester) {
                return (fixed.start_slot, fixed.duration);
            }
        }
        (start, assignment.duration)
    }

    /// Whether the run is inside the window, unblocked and unoccupied.
    fn is_available(&self, day: &str, start: Slot, duration: u32) -> bool {
        self.calendar().is_available(day, start, duration)
    }

    /// Commits `assignment` at `(day, start)`.
    ///
    /// # Errors
    /// - [`CalendarError::SlotUnavailable`] if the run is not available.
    /// - [`CalendarError::CapacityExceeded`] if the implementor's
    ///   capacity hook rejects it.
    fn assign(
        &mut self,
        day: &str,
        start: Slot,
        assignment: &Assignment,
    ) -> Result<(), CalendarError> {
        let (start, duration) = self.effective_window(start, assignment);
        if !self.is_available(day, start, duration) {
            return Err(CalendarError::SlotUnavailable {
                entity: self.id().to_string(),
                day: day.to_string(),
                slot: start,
            });
        }
        self.check_capacity(assignment, duration)?;
        self.calendar_mut().occupy(day, start, duration, assignment);
        self.on_assign(assignment, duration);
        Ok(())
    }

    /// Releases an assignment previously committed with the same arguments.
    ///
    /// # Panics
    /// If the assignment is not present (see [`SlotCalendar::release`]).
    fn unassign(&mut self, day: &str, start: Slot, assignment: &Assignment) {
        let (start, duration) = self.effective_window(start, assignment);
        self.calendar_mut().release(day, start, duration, assignment);
        self.on_unassign(assignment, duration);
    }
}
