//! Built-in placement rules.
//!
//! # Categories
//!
//! - **Assignment**: SUBJECT_ELIGIBILITY, ROOM_KIND, ROOM_CAPACITY
//! - **Time**: WORKING_WEEK, WINDOW, BLACKOUT, FIXED_PIN, SHIFT
//! - **Occupancy**: NO_CLASH, DAILY_CAP, WEEKLY_CAP
//!
//! Per-resource rules take a [`Target`] naming which calendar they read.

use super::{EvaluationContext, Placement, PlacementRule, RuleScope};
use crate::models::{ResourceCalendar, SlotCalendar};

/// The resource a per-resource rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Room,
    Faculty,
    Batch,
}

impl Target {
    fn calendar<'a>(&self, placement: &Placement<'a>) -> &'a SlotCalendar {
        match self {
            Target::Room => placement.room.calendar(),
            Target::Faculty => placement.faculty.calendar(),
            Target::Batch => placement.batch.calendar(),
        }
    }

    fn scope(&self) -> RuleScope {
        match self {
            Target::Faculty => RuleScope::Faculty,
            Target::Room | Target::Batch => RuleScope::Placement,
        }
    }
}

// ======================== Assignment rules ========================

/// Faculty must list the subject, unless standing in as a substitute.
#[derive(Debug, Clone, Copy)]
pub struct SubjectEligibility;

impl PlacementRule for SubjectEligibility {
    fn name(&self) -> &'static str {
        "SUBJECT_ELIGIBILITY"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Faculty
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        p.substituted || p.faculty.can_teach(&p.subject.id)
    }

    fn description(&self) -> &'static str {
        "Faculty is qualified for the subject"
    }
}

/// Lab sessions go to lab rooms, theory sessions to lecture rooms.
#[derive(Debug, Clone, Copy)]
pub struct RoomKindMatch;

impl PlacementRule for RoomKindMatch {
    fn name(&self) -> &'static str {
        "ROOM_KIND"
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        p.room.suits(p.session.is_lab)
    }

    fn description(&self) -> &'static str {
        "Room type matches session type"
    }
}

/// Room seats the whole batch.
#[derive(Debug, Clone, Copy)]
pub struct RoomCapacity;

impl PlacementRule for RoomCapacity {
    fn name(&self) -> &'static str {
        "ROOM_CAPACITY"
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        p.room.fits(p.session.batch_size)
    }

    fn description(&self) -> &'static str {
        "Room capacity covers batch strength"
    }
}

// ======================== Time rules ========================

/// Day is a working day and every covered slot is a global slot.
#[derive(Debug, Clone, Copy)]
pub struct WorkingWeek;

impl PlacementRule for WorkingWeek {
    fn name(&self) -> &'static str {
        "WORKING_WEEK"
    }

    fn check(&self, p: &Placement<'_>, context: &EvaluationContext) -> bool {
        context.is_working_day(p.day) && context.covers(p.start, p.duration)
    }
}

/// Day and covered slots lie inside the target's availability window.
#[derive(Debug, Clone, Copy)]
pub struct WithinWindow(pub Target);

impl PlacementRule for WithinWindow {
    fn name(&self) -> &'static str {
        match self.0 {
            Target::Room => "WINDOW_ROOM",
            Target::Faculty => "WINDOW_FACULTY",
            Target::Batch => "WINDOW_BATCH",
        }
    }

    fn scope(&self) -> RuleScope {
        self.0.scope()
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        self.0.calendar(p).within_window(p.day, p.start, p.duration)
    }
}

/// No covered slot is blocked for the target.
///
/// Rooms block maintenance windows, faculty block declared unavailability.
#[derive(Debug, Clone, Copy)]
pub struct Blackout(pub Target);

impl PlacementRule for Blackout {
    fn name(&self) -> &'static str {
        match self.0 {
            Target::Room => "MAINTENANCE",
            Target::Faculty => "UNAVAILABILITY",
            Target::Batch => "BLACKOUT_BATCH",
        }
    }

    fn scope(&self) -> RuleScope {
        self.0.scope()
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        !self.0.calendar(p).is_blocked(p.day, p.start, p.duration)
    }
}

/// Subject pinning: a fixed (day, start slot) and/or a fixed room.
#[derive(Debug, Clone, Copy)]
pub struct FixedPinning;

impl PlacementRule for FixedPinning {
    fn name(&self) -> &'static str {
        "FIXED_PIN"
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        let slot_ok = p
            .subject
            .fixed_slot
            .as_ref()
            .map_or(true, |pin| pin.day == p.day && pin.slot == p.start);
        let room_ok = p
            .subject
            .fixed_room
            .as_deref()
            .map_or(true, |room| room == p.room.id);
        slot_ok && room_ok
    }

    fn description(&self) -> &'static str {
        "Pinned day/slot and room are honoured"
    }
}

/// Batch shift rule: lectures inside the lecture shift, labs inside the
/// lab shift.
#[derive(Debug, Clone, Copy)]
pub struct ShiftCompliance;

impl PlacementRule for ShiftCompliance {
    fn name(&self) -> &'static str {
        "SHIFT"
    }

    fn check(&self, p: &Placement<'_>, context: &EvaluationContext) -> bool {
        match &p.batch.shift_rule {
            None => true,
            Some(rule) => {
                context
                    .shifts
                    .covers(rule.shift_for(p.session.is_lab), p.start, p.duration)
            }
        }
    }
}

// ======================== Occupancy rules ========================

/// No covered slot of the target already holds an assignment.
#[derive(Debug, Clone, Copy)]
pub struct NoClash(pub Target);

impl PlacementRule for NoClash {
    fn name(&self) -> &'static str {
        match self.0 {
            Target::Room => "NO_CLASH_ROOM",
            Target::Faculty => "NO_CLASH_FACULTY",
            Target::Batch => "NO_CLASH_BATCH",
        }
    }

    fn scope(&self) -> RuleScope {
        self.0.scope()
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        self.0.calendar(p).is_free(p.day, p.start, p.duration)
    }
}

/// Same-day occupied slots stay within the target's daily cap.
///
/// Rooms have no daily cap; `DailyHourCap(Target::Room)` always passes.
#[derive(Debug, Clone, Copy)]
pub struct DailyHourCap(pub Target);

impl PlacementRule for DailyHourCap {
    fn name(&self) -> &'static str {
        match self.0 {
            Target::Faculty => "DAILY_CAP_FACULTY",
            _ => "DAILY_CAP_BATCH",
        }
    }

    fn scope(&self) -> RuleScope {
        self.0.scope()
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        let cap = match self.0 {
            Target::Faculty => p.faculty.max_hours_per_day,
            Target::Batch => p.batch.max_hours_per_day,
            Target::Room => None,
        };
        cap.map_or(true, |cap| {
            self.0.calendar(p).occupied_on(p.day) + p.duration <= cap
        })
    }
}

/// Weekly load stays within the target's caps.
///
/// Faculty check total plus the lab/lecture sub-cap; batches check
/// their optional weekly cap.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyHourCap(pub Target);

impl PlacementRule for WeeklyHourCap {
    fn name(&self) -> &'static str {
        match self.0 {
            Target::Faculty => "WEEKLY_CAP_FACULTY",
            _ => "WEEKLY_CAP_BATCH",
        }
    }

    fn scope(&self) -> RuleScope {
        self.0.scope()
    }

    fn check(&self, p: &Placement<'_>, _context: &EvaluationContext) -> bool {
        match self.0 {
            Target::Faculty => p.faculty.has_capacity_for(p.duration, p.session.is_lab),
            Target::Batch => p.batch.max_hours_per_week.map_or(true, |cap| {
                p.batch.calendar.occupied_total() + p.duration <= cap
            }),
            Target::Room => true,
        }
    }
}
