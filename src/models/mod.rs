//! Timetabling domain models.
//!
//! Provides the record types for describing a weekly timetabling
//! problem and its solutions.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | School | Training centre |
//! |-------------|------------|--------|-----------------|
//! | Batch | Section/Division | Class | Cohort |
//! | Subject | Course | Subject | Module |
//! | Faculty | Lecturer | Teacher | Trainer |
//! | Room | Hall/Lab | Classroom | Workshop |
//! | Timetable | Semester Timetable | Weekly Plan | Roster |

mod calendar;
mod constraint;
mod resource;
mod session;
mod subject;
mod timetable;

/// Day token (e.g. `"Mon"`).
pub type Day = String;
/// Ordinal slot within a day.
pub type Slot = u32;
/// Semester number.
pub type Semester = u32;

pub use calendar::{covered_slots, ResourceCalendar, SlotCalendar};
pub use constraint::{FixedLabSlot, ShiftRule, ShiftTable, SlotRef};
pub use resource::{Batch, Faculty, HourCounters, Room, RoomKind};
pub use session::Session;
pub use subject::{Subject, SubjectKind};
pub use timetable::{Assignment, DaySchedule, Timetable, Violation, ViolationType};
