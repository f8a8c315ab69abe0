//! Subject model.
//!
//! Subjects are immutable reference data: kind, weekly load, session
//! length and optional pinning. They own no calendar.

use serde::{Deserialize, Serialize};

use super::{FixedLabSlot, SlotRef};

/// Theory or lab, decided once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Theory,
    Lab,
}

/// A subject taught to one or more batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SubjectKind,
    /// Weekly teaching load, in slots.
    pub hours_per_week: u32,
    /// Consecutive slots per session.
    #[serde(default = "default_duration")]
    pub duration_slots: u32,
    /// Mandated lab block for every session of this subject.
    #[serde(default)]
    pub fixed_lab_slot: Option<FixedLabSlot>,
    /// Pinned (day, start slot).
    #[serde(default)]
    pub fixed_slot: Option<SlotRef>,
    /// Pinned room.
    #[serde(default)]
    pub fixed_room: Option<String>,
    /// Faculty allowed to stand in when no regular teacher fits.
    #[serde(default)]
    pub alternate_faculty: Vec<String>,
}

fn default_duration() -> u32 {
    1
}

impl Subject {
    /// Creates a subject of one-slot sessions.
    pub fn new(id: impl Into<String>, kind: SubjectKind, hours_per_week: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            hours_per_week,
            duration_slots: 1,
            fixed_lab_slot: None,
            fixed_slot: None,
            fixed_room: None,
            alternate_faculty: Vec::new(),
        }
    }

    /// Creates a theory subject.
    pub fn theory(id: impl Into<String>, hours_per_week: u32) -> Self {
        Self::new(id, SubjectKind::Theory, hours_per_week)
    }

    /// Creates a lab subject.
    pub fn lab(id: impl Into<String>, hours_per_week: u32) -> Self {
        Self::new(id, SubjectKind::Lab, hours_per_week)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_duration(mut self, duration_slots: u32) -> Self {
        self.duration_slots = duration_slots;
        self
    }

    pub fn with_fixed_lab_slot(mut self, slot: FixedLabSlot) -> Self {
        self.fixed_lab_slot = Some(slot);
        self
    }

    pub fn with_fixed_slot(mut self, slot: SlotRef) -> Self {
        self.fixed_slot = Some(slot);
        self
    }

    pub fn with_fixed_room(mut self, room_id: impl Into<String>) -> Self {
        self.fixed_room = Some(room_id.into());
        self
    }

    pub fn with_alternate(mut self, faculty_id: impl Into<String>) -> Self {
        self.alternate_faculty.push(faculty_id.into());
        self
    }

    pub fn is_lab(&self) -> bool {
        self.kind == SubjectKind::Lab
    }

    /// `ceil(hours_per_week / duration_slots)`, at least 1 when any
    /// hours are required; 0 when none are.
    pub fn sessions_per_week(&self) -> u32 {
        if self.hours_per_week == 0 {
            return 0;
        }
        self.hours_per_week
            .div_ceil(self.duration_slots.max(1))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_per_week() {
        assert_eq!(Subject::theory("S1", 5).with_duration(2).sessions_per_week(), 3);
        assert_eq!(Subject::theory("S1", 4).with_duration(2).sessions_per_week(), 2);
        assert_eq!(Subject::theory("S1", 3).sessions_per_week(), 3);
        assert_eq!(Subject::lab("L1", 1).with_duration(3).sessions_per_week(), 1);
        assert_eq!(Subject::theory("S1", 0).sessions_per_week(), 0);
    }

    #[test]
    fn test_kind() {
        assert!(Subject::lab("L1", 2).is_lab());
        assert!(!Subject::theory("S1", 2).is_lab());
    }

    #[test]
    fn test_deserialize_defaults() {
        let s: Subject =
            serde_json::from_str(r#"{"id": "S1", "type": "theory", "hours_per_week": 3}"#).unwrap();
        assert_eq!(s.duration_slots, 1);
        assert_eq!(s.kind, SubjectKind::Theory);
        assert!(s.fixed_slot.is_none());
        assert!(s.alternate_faculty.is_empty());
    }
}
