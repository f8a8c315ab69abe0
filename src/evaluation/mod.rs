//! Placement rules and the constraint evaluator.
//!
//! Answers "is this specific placement legal right now?" for a candidate
//! (session, room, faculty, day, start slot) against the current
//! calendars. Rules are pure predicates; the evaluator composes them.
//!
//! # Usage
//!
//! ```
//! use u_timetable::evaluation::{rules, ConstraintEvaluator, Target};
//!
//! let evaluator = ConstraintEvaluator::new()
//!     .with_rule(rules::RoomKindMatch)
//!     .with_rule(rules::NoClash(Target::Room));
//! assert_eq!(evaluator.len(), 2);
//! ```
//!
//! # Scopes
//! Rules whose outcome depends on the chosen faculty member report
//! [`RuleScope::Faculty`]. A candidate failing only faculty-scoped rules
//! is a substitution opportunity rather than a dead end.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod context;
mod engine;
pub mod rules;

pub use context::EvaluationContext;
pub use engine::ConstraintEvaluator;
pub use rules::Target;

use crate::models::{Assignment, Batch, Faculty, Room, Session, Slot, Subject};
use std::fmt::Debug;

/// Which part of a candidate a rule depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Room, batch, subject or time only.
    Placement,
    /// The chosen faculty member.
    Faculty,
}

/// A fully specified candidate placement.
///
/// `start`/`duration` are the effective values, after any fixed lab
/// block has been applied.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub session: &'a Session,
    pub subject: &'a Subject,
    pub room: &'a Room,
    pub faculty: &'a Faculty,
    pub batch: &'a Batch,
    pub day: &'a str,
    pub start: Slot,
    pub duration: u32,
    /// Faculty is standing in for the regular teacher.
    pub substituted: bool,
}

impl Placement<'_> {
    /// The assignment committing this placement would record.
    pub fn assignment(&self) -> Assignment {
        self.session
            .assignment(&self.room.id, &self.faculty.id, self.duration)
    }
}

/// A hard placement constraint.
///
/// # Contract
/// `check` must be pure: it may read the calendars referenced by the
/// placement but never mutate them.
pub trait PlacementRule: Send + Sync + Debug {
    /// Rule name (e.g., "ROOM_KIND", "NO_CLASH_FACULTY").
    fn name(&self) -> &'static str;

    /// What the rule depends on.
    fn scope(&self) -> RuleScope {
        RuleScope::Placement
    }

    /// Whether the placement satisfies the rule.
    fn check(&self, placement: &Placement<'_>, context: &EvaluationContext) -> bool;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
