//! Candidate domain enumeration.
//!
//! For one session, lists every (room, faculty, day, start slot) tuple
//! that passes the evaluator against the current calendars.
//!
//! # Order
//! Batch-allowed working days → global start slots → rooms (by id) of
//! the matching kind and sufficient capacity → faculty (by id) eligible
//! for the subject. The search shuffles the result with its attempt
//! seed, so this order only matters for determinism.
//!
//! # Fixed lab blocks
//! For lab sessions, the fixed blocks declared by the subject, the room
//! (for the semester) and the faculty member (for the semester) must
//! agree. The only accepted start slot is then the block's start, and
//! the block's length replaces the session duration.
//!
//! # Substitution
//! When a candidate passes every placement-scoped rule but the faculty
//! member fails a faculty-scoped one (clash, unavailability, caps), the
//! faculty member's substitutes for the subject and then the subject's
//! alternate faculty are tried in order; the first that passes is
//! offered in place of the primary.
//!
//! The result holds each (room, faculty, day, start) tuple once. A tuple
//! reachable both directly and as a stand-in keeps the direct offer.

use std::collections::{BTreeMap, HashMap};

use crate::evaluation::{ConstraintEvaluator, EvaluationContext, Placement, RuleScope};
use crate::models::{
    Batch, Faculty, FixedLabSlot, ResourceCalendar, Room, Session, Slot, Subject,
};

/// One candidate placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainValue {
    pub room_id: String,
    pub faculty_id: String,
    pub day: String,
    pub start_slot: Slot,
    /// Effective duration (fixed lab block applied).
    pub duration: u32,
    /// Faculty is a substitute.
    pub substituted: bool,
}

/// Enumerates candidate domains.
#[derive(Debug, Clone, Copy)]
pub struct DomainEnumerator<'a> {
    evaluator: &'a ConstraintEvaluator,
    context: &'a EvaluationContext,
}

/// Resolves the effective (start, duration) of a candidate.
///
/// Returns `None` when declared fixed lab blocks disagree or `start` is
/// not the block's start.
pub fn resolve_window(
    session: &Session,
    subject: &Subject,
    room: &Room,
    faculty: &Faculty,
    start: Slot,
) -> Option<(Slot, u32)> {
    if !session.is_lab {
        return Some((start, session.duration));
    }

    let declared = [
        subject.fixed_lab_slot,
        room.fixed_lab_slot(session.semester),
        faculty.fixed_lab_slot(session.semester),
    ];
    let mut fixed: Option<FixedLabSlot> = None;
    for block in declared.into_iter().flatten() {
        match fixed {
            Some(prev) if prev != block => return None,
            _ => fixed = Some(block),
        }
    }

    match fixed {
        None => Some((start, session.duration)),
        Some(block) if block.start_slot == start => Some((block.start_slot, block.duration)),
        Some(_) => None,
    }
}

impl<'a> DomainEnumerator<'a> {
    pub fn new(evaluator: &'a ConstraintEvaluator, context: &'a EvaluationContext) -> Self {
        Self { evaluator, context }
    }

    /// Lists the candidates of `session` against the current calendars.
    pub fn enumerate(
        &self,
        session: &Session,
        subject: &Subject,
        batch: &Batch,
        rooms: &BTreeMap<String, Room>,
        faculty: &BTreeMap<String, Faculty>,
    ) -> Vec<DomainValue> {
        let eligible: Vec<&Faculty> = faculty
            .values()
            .filter(|f| f.can_teach(&subject.id))
            .collect();
        // Nobody teaches the subject: alternates stand in directly.
        let (primaries, substituted) = if eligible.is_empty() {
            let alternates: Vec<&Faculty> = subject
                .alternate_faculty
                .iter()
                .filter_map(|id| faculty.get(id))
                .collect();
            (alternates, true)
        } else {
            (eligible, false)
        };

        // (room, faculty, day, start) → index into `domain`
        let mut seen: HashMap<(String, String, String, Slot), usize> = HashMap::new();
        let mut domain: Vec<DomainValue> = Vec::new();

        for day in &self.context.working_days {
            if !batch.calendar.allows_day(day) {
                continue;
            }
            for &start in &self.context.slots {
                for room in rooms.values() {
                    if !room.suits(session.is_lab) || !room.fits(session.batch_size) {
                        continue;
                    }
                    for &primary in &primaries {
                        let candidate = self
                            .try_faculty(
                                session, subject, batch, room, primary, day, start, substituted,
                            )
                            .or_else(|| {
                                self.substitute(
                                    session, subject, batch, room, primary, faculty, day, start,
                                )
                            });
                        let Some(value) = candidate else { continue };
                        let key = (
                            value.room_id.clone(),
                            value.faculty_id.clone(),
                            value.day.clone(),
                            value.start_slot,
                        );
                        match seen.get(&key) {
                            // A regular offer supersedes the same tuple as a stand-in.
                            Some(&at) => {
                                if domain[at].substituted && !value.substituted {
                                    domain[at] = value;
                                }
                            }
                            None => {
                                seen.insert(key, domain.len());
                                domain.push(value);
                            }
                        }
                    }
                }
            }
        }

        domain
    }

    #[allow(clippy::too_many_arguments)]
    fn try_faculty(
        &self,
        session: &Session,
        subject: &Subject,
        batch: &Batch,
        room: &Room,
        faculty: &Faculty,
        day: &str,
        start: Slot,
        substituted: bool,
    ) -> Option<DomainValue> {
        let placement =
            self.placement(session, subject, batch, room, faculty, day, start, substituted)?;
        self.evaluator
            .is_feasible(&placement, self.context)
            .then(|| DomainValue {
                room_id: room.id.clone(),
                faculty_id: faculty.id.clone(),
                day: day.to_string(),
                start_slot: placement.start,
                duration: placement.duration,
                substituted,
            })
    }

    /// Offers a stand-in when `primary` fails only faculty-scoped rules.
    #[allow(clippy::too_many_arguments)]
    fn substitute(
        &self,
        session: &Session,
        subject: &Subject,
        batch: &Batch,
        room: &Room,
        primary: &Faculty,
        faculty: &BTreeMap<String, Faculty>,
        day: &str,
        start: Slot,
    ) -> Option<DomainValue> {
        let placement = self.placement(session, subject, batch, room, primary, day, start, false)?;
        if !self
            .evaluator
            .check_scope(&placement, self.context, RuleScope::Placement)
        {
            return None;
        }

        primary
            .substitutes
            .get(&subject.id)
            .into_iter()
            .flatten()
            .chain(&subject.alternate_faculty)
            .filter(|id| **id != primary.id)
            .filter_map(|id| faculty.get(id))
            .find_map(|stand_in| {
                self.try_faculty(session, subject, batch, room, stand_in, day, start, true)
            })
    }

    #[allow(clippy::too_many_arguments)]
    fn placement<'p>(
        &self,
        session: &'p Session,
        subject: &'p Subject,
        batch: &'p Batch,
        room: &'p Room,
        faculty: &'p Faculty,
        day: &'p str,
        start: Slot,
        substituted: bool,
    ) -> Option<Placement<'p>> {
        let (start, duration) = resolve_window(session, subject, room, faculty, start)?;
        Some(Placement {
            session,
            subject,
            room,
            faculty,
            batch,
            day,
            start,
            duration,
            substituted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, SlotCalendar};

    fn by_id<T, F: Fn(&T) -> String>(items: Vec<T>, key: F) -> BTreeMap<String, T> {
        items.into_iter().map(|i| (key(&i), i)).collect()
    }

    fn theory_session() -> Session {
        Session {
            batch_id: "B1".into(),
            subject_id: "S1".into(),
            semester: 1,
            duration: 1,
            batch_size: 30,
            is_lab: false,
            occurrence: 1,
        }
    }

    fn lab_session() -> Session {
        Session {
            subject_id: "LAB".into(),
            semester: 3,
            duration: 2,
            is_lab: true,
            ..theory_session()
        }
    }

    fn context() -> EvaluationContext {
        EvaluationContext::new(["Mon", "Tue"], 1..=6)
    }

    #[test]
    fn test_domain_covers_rooms_faculty_and_time() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = context();
        let rooms = by_id(
            vec![Room::lecture("R1", 40), Room::lecture("R2", 20), Room::lab("L1", 40)],
            |r| r.id.clone(),
        );
        let faculty = by_id(
            vec![
                Faculty::new("F1", 10).with_subject("S1"),
                Faculty::new("F2", 10).with_subject("S1"),
                Faculty::new("F3", 10),
            ],
            |f| f.id.clone(),
        );
        let batch = Batch::new("B1", 1, 30);
        let subject = Subject::theory("S1", 3);

        let domain = DomainEnumerator::new(&evaluator, &ctx)
            .enumerate(&theory_session(), &subject, &batch, &rooms, &faculty);

        // 2 days × 6 slots × R1 only × {F1, F2}
        assert_eq!(domain.len(), 24);
        assert!(domain.iter().all(|v| v.room_id == "R1"));
        assert!(domain.iter().all(|v| v.faculty_id != "F3" && !v.substituted));
        assert_eq!(domain[0].day, "Mon");
        assert_eq!(domain[0].start_slot, 1);
    }

    #[test]
    fn test_domain_respects_batch_days_and_clashes() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = context();
        let rooms = by_id(vec![Room::lecture("R1", 40)], |r| r.id.clone());
        let faculty = by_id(vec![Faculty::new("F1", 10).with_subject("S1")], |f| f.id.clone());
        let mut batch =
            Batch::new("B1", 1, 30).with_calendar(SlotCalendar::new().with_days(["Tue"]));
        batch
            .assign("Tue", 1, &Assignment::new("B1", "S2", "F9", "R9", 1))
            .unwrap();

        let domain = DomainEnumerator::new(&evaluator, &ctx).enumerate(
            &theory_session(),
            &Subject::theory("S1", 3),
            &batch,
            &rooms,
            &faculty,
        );
        assert_eq!(domain.len(), 5);
        assert!(domain.iter().all(|v| v.day == "Tue" && v.start_slot != 1));
    }

    #[test]
    fn test_fixed_lab_block_pins_start_and_duration() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = context();
        let rooms = by_id(
            vec![Room::lab("L1", 40).with_lab_slot(3, FixedLabSlot::new(4, 2))],
            |r| r.id.clone(),
        );
        let faculty = by_id(vec![Faculty::new("F1", 10).with_subject("LAB")], |f| f.id.clone());
        let batch = Batch::new("B1", 3, 30);
        let subject = Subject::lab("LAB", 2).with_duration(2);

        let domain = DomainEnumerator::new(&evaluator, &ctx)
            .enumerate(&lab_session(), &subject, &batch, &rooms, &faculty);
        assert_eq!(domain.len(), 2);
        assert!(domain.iter().all(|v| v.start_slot == 4 && v.duration == 2));
    }

    #[test]
    fn test_conflicting_fixed_blocks_reject() {
        let room = Room::lab("L1", 40).with_lab_slot(3, FixedLabSlot::new(4, 2));
        let fac = Faculty::new("F1", 10).with_lab_slot(3, FixedLabSlot::new(1, 2));
        let subject = Subject::lab("LAB", 2).with_duration(2);
        assert_eq!(resolve_window(&lab_session(), &subject, &room, &fac, 4), None);
        assert_eq!(resolve_window(&lab_session(), &subject, &room, &fac, 1), None);

        let agreeing = Faculty::new("F1", 10).with_lab_slot(3, FixedLabSlot::new(4, 2));
        assert_eq!(resolve_window(&lab_session(), &subject, &room, &agreeing, 4), Some((4, 2)));
        assert_eq!(
            resolve_window(&theory_session(), &subject, &room, &fac, 2),
            Some((2, 1))
        );
    }

    #[test]
    fn test_exhausted_faculty_never_offered() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = context();
        let rooms = by_id(vec![Room::lecture("R1", 40)], |r| r.id.clone());
        let mut busy = Faculty::new("F1", 1).with_subject("S1");
        busy.assign("Mon", 6, &Assignment::new("B9", "S1", "F1", "R9", 1))
            .unwrap();
        assert_eq!(busy.remaining_hours(), 0);
        let faculty = by_id(vec![busy], |f| f.id.clone());

        let domain = DomainEnumerator::new(&evaluator, &ctx).enumerate(
            &theory_session(),
            &Subject::theory("S1", 3),
            &Batch::new("B1", 1, 30),
            &rooms,
            &faculty,
        );
        assert!(domain.is_empty());
    }

    #[test]
    fn test_substitute_replaces_unavailable_faculty() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = EvaluationContext::new(["Mon"], 1..=2);
        let rooms = by_id(vec![Room::lecture("R1", 40)], |r| r.id.clone());
        let faculty = by_id(
            vec![
                Faculty::new("F1", 10)
                    .with_subject("S1")
                    .with_unavailable("Mon", 1)
                    .with_substitute("S1", "F2"),
                Faculty::new("F2", 10),
            ],
            |f| f.id.clone(),
        );

        let domain = DomainEnumerator::new(&evaluator, &ctx).enumerate(
            &theory_session(),
            &Subject::theory("S1", 3),
            &Batch::new("B1", 1, 30),
            &rooms,
            &faculty,
        );
        assert_eq!(domain.len(), 2);
        assert_eq!(domain[0].faculty_id, "F2");
        assert!(domain[0].substituted);
        assert_eq!(domain[1].faculty_id, "F1");
        assert_eq!(domain[1].start_slot, 2);
    }

    #[test]
    fn test_alternates_used_when_nobody_eligible() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = EvaluationContext::new(["Mon"], 1..=1);
        let rooms = by_id(vec![Room::lecture("R1", 40)], |r| r.id.clone());
        let faculty = by_id(vec![Faculty::new("F7", 10)], |f| f.id.clone());
        let subject = Subject::theory("S1", 3).with_alternate("F7");

        let domain = DomainEnumerator::new(&evaluator, &ctx).enumerate(
            &theory_session(),
            &subject,
            &Batch::new("B1", 1, 30),
            &rooms,
            &faculty,
        );
        assert_eq!(domain.len(), 1);
        assert_eq!(domain[0].faculty_id, "F7");
        assert!(domain[0].substituted);
    }

    #[test]
    fn test_alternate_who_teaches_subject_offered_once() {
        let evaluator = ConstraintEvaluator::standard();
        let ctx = EvaluationContext::new(["Mon"], 1..=1);
        let rooms = by_id(vec![Room::lecture("R1", 40)], |r| r.id.clone());
        let faculty = by_id(
            vec![
                Faculty::new("F1", 10).with_subject("S1").with_unavailable("Mon", 1),
                Faculty::new("F2", 10).with_subject("S1"),
            ],
            |f| f.id.clone(),
        );
        let subject = Subject::theory("S1", 3).with_alternate("F2");

        let domain = DomainEnumerator::new(&evaluator, &ctx).enumerate(
            &theory_session(),
            &subject,
            &Batch::new("B1", 1, 30),
            &rooms,
            &faculty,
        );
        assert_eq!(domain.len(), 1);
        assert_eq!(domain[0].faculty_id, "F2");
        assert!(!domain[0].substituted);
    }
}
