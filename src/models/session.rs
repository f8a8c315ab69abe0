//! Session model.

use serde::{Deserialize, Serialize};

use super::{Assignment, Semester};

/// One required weekly occurrence of a (batch, subject) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub batch_id: String,
    pub subject_id: String,
    pub semester: Semester,
    /// Consecutive slots needed.
    pub duration: u32,
    /// Batch headcount.
    pub batch_size: u32,
    pub is_lab: bool,
    /// 1-based index among the sessions of the same (batch, subject).
    pub occurrence: u32,
}

impl Session {
    /// The assignment this session commits when placed with `room` and
    /// `faculty` for `duration` slots.
    pub fn assignment(&self, room_id: &str, faculty_id: &str, duration: u32) -> Assignment {
        Assignment::new(
            self.batch_id.as_str(),
            self.subject_id.as_str(),
            faculty_id,
            room_id,
            self.semester,
        )
        .with_duration(duration)
        .with_lab(self.is_lab)
        .with_batch_size(self.batch_size)
    }
}
