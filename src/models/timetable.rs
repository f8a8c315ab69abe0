//! Timetable (solution) model.
//!
//! A timetable maps `semester → day → slot → [Assignment]`. It is the
//! aggregate view the search engine maintains alongside the per-entity
//! calendars; every commit and rollback touches both.
//!
//! # Signature
//! [`Timetable::signature`] canonicalizes the schedule by walking
//! (semester, day, slot) in sorted order, rendering each assignment as
//! `semester|day|slot|batch|room|subject` (sorted within a slot), and
//! hashing the joined text with BLAKE3. Two timetables with the same
//! signature are the same solution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::calendar::covered_slots;
use super::{Day, Semester, Slot};

/// One committed teaching occurrence, as stored in calendars and the
/// timetable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "batch")]
    pub batch_id: String,
    #[serde(rename = "subject")]
    pub subject_id: String,
    #[serde(rename = "faculty")]
    pub faculty_id: String,
    #[serde(rename = "room")]
    pub room_id: String,
    pub semester: Semester,
    /// Consecutive slots occupied.
    pub duration: u32,
    pub is_lab: bool,
    /// Headcount of the batch (for room capacity and utilization).
    pub batch_size: u32,
}

impl Assignment {
    /// Creates a single-slot theory assignment.
    pub fn new(
        batch_id: impl Into<String>,
        subject_id: impl Into<String>,
        faculty_id: impl Into<String>,
        room_id: impl Into<String>,
        semester: Semester,
    ) -> Self {
        Self {
            batch_id: batch_id.into(),
            subject_id: subject_id.into(),
            faculty_id: faculty_id.into(),
            room_id: room_id.into(),
            semester,
            duration: 1,
            is_lab: false,
            batch_size: 0,
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_lab(mut self, is_lab: bool) -> Self {
        self.is_lab = is_lab;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// A double booking found in a timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Double-booked entity (room, faculty or batch ID).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of timetable violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationType {
    RoomClash,
    FacultyClash,
    BatchClash,
}

/// `day → slot → assignments` for one semester.
pub type DaySchedule = BTreeMap<Day, BTreeMap<Slot, Vec<Assignment>>>;

/// A complete or partial weekly timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    schedule: BTreeMap<Semester, DaySchedule>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timetable with an empty list at every
    /// (semester, day, slot) of the grid.
    pub fn with_grid(
        semesters: impl IntoIterator<Item = Semester>,
        days: &[Day],
        slots: &[Slot],
    ) -> Self {
        let schedule = semesters
            .into_iter()
            .map(|sem| {
                let grid = days
                    .iter()
                    .map(|d| (d.clone(), slots.iter().map(|&s| (s, Vec::new())).collect()))
                    .collect();
                (sem, grid)
            })
            .collect();
        Self { schedule }
    }

    /// Records `assignment` at every slot it covers from `start`.
    pub fn assign(&mut self, semester: Semester, day: &str, start: Slot, assignment: &Assignment) {
        let slots = self
            .schedule
            .entry(semester)
            .or_default()
            .entry(day.to_string())
            .or_default();
        for slot in covered_slots(start, assignment.duration) {
            slots.entry(slot).or_default().push(assignment.clone());
        }
    }

    /// Removes `assignment` from every slot it covers from `start`.
    ///
    /// Grid cells are kept (possibly empty).
    ///
    /// # Panics
    /// If the assignment is not recorded at one of those slots.
    pub fn unassign(
        &mut self,
        semester: Semester,
        day: &str,
        start: Slot,
        assignment: &Assignment,
    ) {
        for slot in covered_slots(start, assignment.duration) {
            let list = self
                .schedule
                .get_mut(&semester)
                .and_then(|days| days.get_mut(day))
                .and_then(|slots| slots.get_mut(&slot))
                .unwrap_or_else(|| panic!("timetable has no cell {semester}/{day}/{slot}"));
            let pos = list
                .iter()
                .position(|a| a == assignment)
                .unwrap_or_else(|| {
                    panic!("assignment not recorded at {semester}/{day}/{slot}")
                });
            list.remove(pos);
        }
    }

    /// The nested schedule map.
    pub fn schedule(&self) -> &BTreeMap<Semester, DaySchedule> {
        &self.schedule
    }

    /// Flat view: one item per (semester, day, slot, assignment) cell entry.
    pub fn entries(&self) -> impl Iterator<Item = (Semester, &str, Slot, &Assignment)> + '_ {
        self.schedule.iter().flat_map(|(&sem, days)| {
            days.iter().flat_map(move |(day, slots)| {
                slots.iter().flat_map(move |(&slot, list)| {
                    list.iter().map(move |a| (sem, day.as_str(), slot, a))
                })
            })
        })
    }

    /// Number of occupied slot entries.
    pub fn assignment_count(&self) -> usize {
        self.entries().count()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.assignment_count() == 0
    }

    /// Entries belonging to a batch.
    pub fn entries_for_batch<'a>(
        &'a self,
        batch_id: &'a str,
    ) -> impl Iterator<Item = (Semester, &'a str, Slot, &'a Assignment)> + 'a {
        self.entries().filter(move |(_, _, _, a)| a.batch_id == batch_id)
    }

    /// Stable BLAKE3 hex digest identifying this timetable.
    pub fn signature(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for (sem, days) in &self.schedule {
            for (day, slots) in days {
                for (slot, list) in slots {
                    let mut cell: Vec<String> = list
                        .iter()
                        .map(|a| {
                            format!(
                                "{sem}|{day}|{slot}|{}|{}|{}",
                                a.batch_id, a.room_id, a.subject_id
                            )
                        })
                        .collect();
                    cell.sort();
                    parts.extend(cell);
                }
            }
        }
        blake3::hash(parts.join("|").as_bytes()).to_hex().to_string()
    }

    /// Re-derives room, faculty and batch occupancy from the flat
    /// schedule and reports every (entity, day, slot) held more than once.
    pub fn conflicts(&self) -> Vec<Violation> {
        let mut usage: BTreeMap<(ViolationType, &str, &str, Slot), usize> = BTreeMap::new();
        for (_, day, slot, a) in self.entries() {
            for key in [
                (ViolationType::RoomClash, a.room_id.as_str()),
                (ViolationType::FacultyClash, a.faculty_id.as_str()),
                (ViolationType::BatchClash, a.batch_id.as_str()),
            ] {
                *usage.entry((key.0, key.1, day, slot)).or_insert(0) += 1;
            }
        }

        usage
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|((kind, entity, day, slot), count)| Violation {
                violation_type: kind,
                entity_id: entity.to_string(),
                message: format!("{entity} booked {count} times on {day} slot {slot}"),
                severity: 90,
            })
            .collect()
    }

    /// Whether no entity is double-booked.
    pub fn is_clash_free(&self) -> bool {
        self.conflicts().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(batch: &str, room: &str, faculty: &str) -> Assignment {
        Assignment::new(batch, "S1", faculty, room, 1).with_batch_size(30)
    }

    fn days() -> Vec<Day> {
        vec!["Mon".to_string(), "Tue".to_string()]
    }

    #[test]
    fn test_grid_prepopulated() {
        let tt = Timetable::with_grid([1, 3], &days(), &[1, 2, 3]);
        assert_eq!(tt.schedule().len(), 2);
        assert_eq!(tt.schedule()[&3]["Tue"].len(), 3);
        assert!(tt.is_empty());
    }

    #[test]
    fn test_assign_covers_duration() {
        let mut tt = Timetable::new();
        let lab = lecture("B1", "L1", "F1").with_duration(2).with_lab(true);
        tt.assign(3, "Mon", 4, &lab);

        assert_eq!(tt.assignment_count(), 2);
        assert_eq!(tt.schedule()[&3]["Mon"][&4], vec![lab.clone()]);
        assert_eq!(tt.schedule()[&3]["Mon"][&5], vec![lab]);
    }

    #[test]
    fn test_unassign_restores_grid() {
        let mut tt = Timetable::with_grid([1], &days(), &[1, 2]);
        let before = tt.clone();
        let a = lecture("B1", "R1", "F1");
        tt.assign(1, "Tue", 2, &a);
        tt.unassign(1, "Tue", 2, &a);
        assert_eq!(tt, before);
    }

    #[test]
    #[should_panic(expected = "not recorded")]
    fn test_unassign_missing_panics() {
        let mut tt = Timetable::with_grid([1], &days(), &[1]);
        tt.unassign(1, "Mon", 1, &lecture("B1", "R1", "F1"));
    }

    #[test]
    fn test_signature_ignores_insertion_order() {
        let a = lecture("B1", "R1", "F1");
        let b = lecture("B2", "R2", "F2");

        let mut t1 = Timetable::new();
        t1.assign(1, "Mon", 1, &a);
        t1.assign(1, "Mon", 1, &b);

        let mut t2 = Timetable::new();
        t2.assign(1, "Mon", 1, &b);
        t2.assign(1, "Mon", 1, &a);

        assert_eq!(t1.signature(), t2.signature());
        assert_eq!(t1.signature().len(), 64);
    }

    #[test]
    fn test_signature_distinguishes_placement() {
        let a = lecture("B1", "R1", "F1");
        let mut t1 = Timetable::new();
        t1.assign(1, "Mon", 1, &a);
        let mut t2 = Timetable::new();
        t2.assign(1, "Mon", 2, &a);
        assert_ne!(t1.signature(), t2.signature());
    }

    #[test]
    fn test_signature_ignores_faculty_and_empty_cells() {
        // Faculty is not part of the canonical key.
        let mut t1 = Timetable::with_grid([1], &days(), &[1, 2]);
        t1.assign(1, "Mon", 1, &lecture("B1", "R1", "F1"));
        let mut t2 = Timetable::new();
        t2.assign(1, "Mon", 1, &lecture("B1", "R1", "F2"));
        assert_eq!(t1.signature(), t2.signature());
    }

    #[test]
    fn test_conflicts_detects_each_resource() {
        let mut tt = Timetable::new();
        tt.assign(1, "Mon", 1, &lecture("B1", "R1", "F1"));
        tt.assign(2, "Mon", 1, &lecture("B2", "R1", "F2")); // room clash across semesters
        tt.assign(1, "Mon", 2, &lecture("B1", "R1", "F1"));
        tt.assign(1, "Mon", 2, &lecture("B3", "R3", "F1")); // faculty clash

        let conflicts = tt.conflicts();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .any(|v| v.violation_type == ViolationType::RoomClash && v.entity_id == "R1"));
        assert!(conflicts
            .iter()
            .any(|v| v.violation_type == ViolationType::FacultyClash && v.entity_id == "F1"));
        assert!(!tt.is_clash_free());
    }

    #[test]
    fn test_entries_for_batch() {
        let mut tt = Timetable::new();
        tt.assign(1, "Mon", 1, &lecture("B1", "R1", "F1"));
        tt.assign(1, "Tue", 1, &lecture("B2", "R1", "F1"));
        assert_eq!(tt.entries_for_batch("B1").count(), 1);
    }

    #[test]
    fn test_assignment_serializes_with_short_keys() {
        let json = serde_json::to_value(lecture("B1", "R1", "F1")).unwrap();
        assert_eq!(json["batch"], "B1");
        assert_eq!(json["room"], "R1");
        assert_eq!(json["faculty"], "F1");
        assert_eq!(json["subject"], "S1");
        assert_eq!(json["is_lab"], false);
    }
}
