//! Calendar-owning resources: rooms, faculty and batches.
//!
//! Each resource exclusively owns a [`SlotCalendar`] and implements
//! [`ResourceCalendar`]. Rooms add a capacity check, faculty add weekly
//! hour counters with independent lab/lecture sub-caps.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §2 (class-teacher
//! and course timetabling resource model)

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{
    Assignment, Day, FixedLabSlot, ResourceCalendar, Semester, ShiftRule, Slot, SlotCalendar,
};
use crate::error::CalendarError;

/// Room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Lecture hall or classroom (theory sessions).
    Lecture,
    /// Laboratory (lab sessions).
    Lab,
}

/// A teaching room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Lecture or lab.
    #[serde(rename = "type")]
    pub kind: RoomKind,
    /// Seats.
    pub capacity: u32,
    /// Availability window; blocked slots are maintenance windows.
    #[serde(default)]
    pub calendar: SlotCalendar,
    /// Mandated lab blocks keyed by semester.
    #[serde(default)]
    pub lab_slots: BTreeMap<Semester, FixedLabSlot>,
}

impl Room {
    /// Creates a room with an unrestricted calendar.
    pub fn new(id: impl Into<String>, kind: RoomKind, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            capacity,
            calendar: SlotCalendar::new(),
            lab_slots: BTreeMap::new(),
        }
    }

    /// Creates a lecture room.
    pub fn lecture(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, RoomKind::Lecture, capacity)
    }

    /// Creates a lab room.
    pub fn lab(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, RoomKind::Lab, capacity)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_calendar(mut self, calendar: SlotCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Blocks a slot for maintenance.
    pub fn with_maintenance(mut self, day: impl Into<Day>, slot: Slot) -> Self {
        self.calendar = self.calendar.with_blocked(day, slot);
        self
    }

    /// Mandates a lab block for a semester.
    pub fn with_lab_slot(mut self, semester: Semester, slot: FixedLabSlot) -> Self {
        self.lab_slots.insert(semester, slot);
        self
    }

    /// Whether this room hosts sessions of the given kind.
    pub fn suits(&self, is_lab: bool) -> bool {
        match self.kind {
            RoomKind::Lab => is_lab,
            RoomKind::Lecture => !is_lab,
        }
    }

    /// Whether `headcount` fits in the room.
    pub fn fits(&self, headcount: u32) -> bool {
        self.capacity >= headcount
    }

    /// Whether `(day, slot)` is a maintenance window.
    pub fn under_maintenance(&self, day: &str, start: Slot, duration: u32) -> bool {
        self.calendar.is_blocked(day, start, duration)
    }
}

impl ResourceCalendar for Room {
    fn id(&self) -> &str {
        &self.id
    }

    fn calendar(&self) -> &SlotCalendar {
        &self.calendar
    }

    fn calendar_mut(&mut self) -> &mut SlotCalendar {
        &mut self.calendar
    }

    fn fixed_lab_slot(&self, semester: Semester) -> Option<FixedLabSlot> {
        self.lab_slots.get(&semester).copied()
    }

    fn check_capacity(&self, assignment: &Assignment, _duration: u32) -> Result<(), CalendarError> {
        if assignment.batch_size > self.capacity {
            return Err(CalendarError::CapacityExceeded {
                entity: self.id.clone(),
                detail: format!(
                    "batch size {} > room capacity {}",
                    assignment.batch_size, self.capacity
                ),
            });
        }
        Ok(())
    }
}

/// Running weekly hour totals of a faculty member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourCounters {
    pub total: u32,
    pub lab: u32,
    pub lecture: u32,
}

/// A faculty member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Subjects this faculty member can teach.
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    /// Availability window; blocked slots are declared unavailability.
    #[serde(default)]
    pub calendar: SlotCalendar,
    /// Preferred teaching days (soft).
    #[serde(default)]
    pub preferred_days: BTreeSet<Day>,
    /// Preferred teaching slots (soft).
    #[serde(default)]
    pub preferred_slots: BTreeSet<Slot>,
    /// Weekly teaching cap, in slots.
    pub max_hours_per_week: u32,
    #[serde(default)]
    pub max_lab_hours: Option<u32>,
    #[serde(default)]
    pub max_lecture_hours: Option<u32>,
    /// Same-day teaching cap, in slots.
    #[serde(default)]
    pub max_hours_per_day: Option<u32>,
    /// Mandated lab blocks keyed by semester.
    #[serde(default)]
    pub lab_slots: BTreeMap<Semester, FixedLabSlot>,
    /// Substitutes per subject, in order of preference.
    #[serde(default)]
    pub substitutes: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    hours: HourCounters,
}

impl Faculty {
    /// Creates a faculty member with an unrestricted calendar.
    pub fn new(id: impl Into<String>, max_hours_per_week: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            subjects: BTreeSet::new(),
            calendar: SlotCalendar::new(),
            preferred_days: BTreeSet::new(),
            preferred_slots: BTreeSet::new(),
            max_hours_per_week,
            max_lab_hours: None,
            max_lecture_hours: None,
            max_hours_per_day: None,
            lab_slots: BTreeMap::new(),
            substitutes: BTreeMap::new(),
            hours: HourCounters::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.insert(subject_id.into());
        self
    }

    pub fn with_calendar(mut self, calendar: SlotCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Declares the faculty member unavailable at a slot.
    pub fn with_unavailable(mut self, day: impl Into<Day>, slot: Slot) -> Self {
        self.calendar = self.calendar.with_blocked(day, slot);
        self
    }

    pub fn with_preferences<I, D>(mut self, days: I, slots: impl IntoIterator<Item = Slot>) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Day>,
    {
        self.preferred_days = days.into_iter().map(Into::into).collect();
        self.preferred_slots = slots.into_iter().collect();
        self
    }

    pub fn with_lab_cap(mut self, hours: u32) -> Self {
        self.max_lab_hours = Some(hours);
        self
    }

    pub fn with_lecture_cap(mut self, hours: u32) -> Self {
        self.max_lecture_hours = Some(hours);
        self
    }

    pub fn with_daily_cap(mut self, hours: u32) -> Self {
        self.max_hours_per_day = Some(hours);
        self
    }

    pub fn with_lab_slot(mut self, semester: Semester, slot: FixedLabSlot) -> Self {
        self.lab_slots.insert(semester, slot);
        self
    }

    /// Adds a substitute for one subject.
    pub fn with_substitute(
        mut self,
        subject_id: impl Into<String>,
        faculty_id: impl Into<String>,
    ) -> Self {
        self.substitutes
            .entry(subject_id.into())
            .or_default()
            .push(faculty_id.into());
        self
    }

    /// Whether the subject is in this faculty member's list.
    pub fn can_teach(&self, subject_id: &str) -> bool {
        self.subjects.contains(subject_id)
    }

    /// Whether the placement hits both a preferred day and a preferred slot.
    pub fn prefers(&self, day: &str, slot: Slot) -> bool {
        self.preferred_days.contains(day) && self.preferred_slots.contains(&slot)
    }

    /// Uses the preferences as the availability window on any axis the
    /// calendar leaves unrestricted.
    ///
    /// Records that only list preferred days and slots describe when the
    /// faculty member can teach at all.
    pub fn adopt_preferred_window(&mut self) {
        if self.calendar.available_days.is_empty() {
            self.calendar.available_days = self.preferred_days.iter().cloned().collect();
        }
        if self.calendar.available_slots.is_empty() {
            self.calendar.available_slots = self.preferred_slots.clone();
        }
    }

    /// Current hour counters.
    pub fn hours(&self) -> HourCounters {
        self.hours
    }

    /// Weekly hours still available.
    pub fn remaining_hours(&self) -> u32 {
        self.max_hours_per_week.saturating_sub(self.hours.total)
    }

    /// Whether `duration` more slots of the given kind fit under every cap.
    pub fn has_capacity_for(&self, duration: u32, is_lab: bool) -> bool {
        self.cap_breach(duration, is_lab).is_none()
    }

    fn cap_breach(&self, duration: u32, is_lab: bool) -> Option<String> {
        if self.hours.total.saturating_add(duration) > self.max_hours_per_week {
            return Some(format!(
                "weekly hours {}+{duration} > {}",
                self.hours.total, self.max_hours_per_week
            ));
        }
        let (used, cap, label) = if is_lab {
            (self.hours.lab, self.max_lab_hours, "lab")
        } else {
            (self.hours.lecture, self.max_lecture_hours, "lecture")
        };
        match cap {
            Some(cap) if used.saturating_add(duration) > cap => {
                Some(format!("{label} hours {used}+{duration} > {cap}"))
            }
            _ => None,
        }
    }
}

impl ResourceCalendar for Faculty {
    fn id(&self) -> &str {
        &self.id
    }

    fn calendar(&self) -> &SlotCalendar {
        &self.calendar
    }

    fn calendar_mut(&mut self) -> &mut SlotCalendar {
        &mut self.calendar
    }

    fn fixed_lab_slot(&self, semester: Semester) -> Option<FixedLabSlot> {
        self.lab_slots.get(&semester).copied()
    }

    fn check_capacity(&self, assignment: &Assignment, duration: u32) -> Result<(), CalendarError> {
        match self.cap_breach(duration, assignment.is_lab) {
            Some(detail) => Err(CalendarError::CapacityExceeded {
                entity: self.id.clone(),
                detail,
            }),
            None => Ok(()),
        }
    }

    fn on_assign(&mut self, assignment: &Assignment, duration: u32) {
        self.hours.total += duration;
        if assignment.is_lab {
            self.hours.lab += duration;
        } else {
            self.hours.lecture += duration;
        }
    }

    fn on_unassign(&mut self, assignment: &Assignment, duration: u32) {
        self.hours.total = self.hours.total.saturating_sub(duration);
        if assignment.is_lab {
            self.hours.lab = self.hours.lab.saturating_sub(duration);
        } else {
            self.hours.lecture = self.hours.lecture.saturating_sub(duration);
        }
    }
}

/// A student batch (or lab sub-batch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    pub semester: Semester,
    /// Headcount.
    pub strength: u32,
    /// Subjects the batch takes.
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Parent batch for sub-batches; must share the semester.
    #[serde(default)]
    pub parent_batch: Option<String>,
    #[serde(default)]
    pub calendar: SlotCalendar,
    #[serde(default)]
    pub max_hours_per_day: Option<u32>,
    #[serde(default)]
    pub max_hours_per_week: Option<u32>,
    #[serde(default)]
    pub shift_rule: Option<ShiftRule>,
}

impl Batch {
    /// Creates a batch with an unrestricted calendar.
    pub fn new(id: impl Into<String>, semester: Semester, strength: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            semester,
            strength,
            subjects: Vec::new(),
            parent_batch: None,
            calendar: SlotCalendar::new(),
            max_hours_per_day: None,
            max_hours_per_week: None,
            shift_rule: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.push(subject_id.into());
        self
    }

    pub fn with_calendar(mut self, calendar: SlotCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_batch = Some(parent_id.into());
        self
    }

    pub fn with_daily_cap(mut self, hours: u32) -> Self {
        self.max_hours_per_day = Some(hours);
        self
    }

    pub fn with_weekly_cap(mut self, hours: u32) -> Self {
        self.max_hours_per_week = Some(hours);
        self
    }

    pub fn with_shift_rule(mut self, rule: ShiftRule) -> Self {
        self.shift_rule = Some(rule);
        self
    }

    /// Whether this is a sub-batch.
    pub fn is_subgroup(&self) -> bool {
        self.parent_batch.is_some()
    }
}

impl ResourceCalendar for Batch {
    fn id(&self) -> &str {
        &self.id
    }

    fn calendar(&self) -> &SlotCalendar {
        &self.calendar
    }

    fn calendar_mut(&mut self) -> &mut SlotCalendar {
        &mut self.calendar
    }
}
