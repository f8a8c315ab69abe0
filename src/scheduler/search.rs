//! Randomized backtracking search.
//!
//! One attempt = one depth-first pass over the ordered sessions with
//! its own deep copy of every calendar and its own seeded RNG.
//!
//! # Algorithm
//! At depth `idx`, enumerate the domain of `sessions[idx]`, shuffle it
//! with the attempt RNG, and for each candidate commit room → faculty →
//! batch → timetable. A failed commit is rolled back in reverse order
//! and the next candidate tried. A successful commit recurses; if the
//! subtree fails, the commit is undone exactly before moving on.
//!
//! The deadline is polled on entry to every node. Past it, the search
//! unwinds (undoing every commit) and reports [`AttemptOutcome::TimedOut`].
//!
//! # Reference
//! Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3 (Backtracking Search for CSPs)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::time::Instant;

use tracing::trace;

use super::domain::{DomainEnumerator, DomainValue};
use crate::error::CalendarError;
use crate::models::{
    Assignment, Batch, Faculty, ResourceCalendar, Room, Session, Subject, Timetable,
};

/// Result of one search attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Every session placed.
    Success(Timetable),
    /// Search tree exhausted for this seed.
    Exhausted,
    /// Deadline reached before completion.
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Complete,
    Exhausted,
    TimedOut,
}

/// State of one attempt.
pub(crate) struct Search<'a> {
    sessions: &'a [Session],
    subjects: &'a BTreeMap<String, Subject>,
    enumerator: DomainEnumerator<'a>,
    rooms: BTreeMap<String, Room>,
    faculty: BTreeMap<String, Faculty>,
    batches: BTreeMap<String, Batch>,
    timetable: Timetable,
    rng: StdRng,
    deadline: Instant,
    nodes: u64,
}

impl<'a> Search<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        sessions: &'a [Session],
        subjects: &'a BTreeMap<String, Subject>,
        enumerator: DomainEnumerator<'a>,
        rooms: BTreeMap<String, Room>,
        faculty: BTreeMap<String, Faculty>,
        batches: BTreeMap<String, Batch>,
        timetable: Timetable,
        seed: u64,
        deadline: Instant,
    ) -> Self {
        Self {
            sessions,
            subjects,
            enumerator,
            rooms,
            faculty,
            batches,
            timetable,
            rng: StdRng::seed_from_u64(seed),
            deadline,
            nodes: 0,
        }
    }

    /// Runs the attempt to completion.
    pub(crate) fn run(mut self) -> AttemptOutcome {
        let status = self.backtrack(0);
        trace!(nodes = self.nodes, ?status, "search finished");
        match status {
            Status::Complete => AttemptOutcome::Success(self.timetable),
            Status::Exhausted => AttemptOutcome::Exhausted,
            Status::TimedOut => AttemptOutcome::TimedOut,
        }
    }

    fn backtrack(&mut self, idx: usize) -> Status {
        if Instant::now() >= self.deadline {
            return Status::TimedOut;
        }
        let sessions = self.sessions;
        let Some(session) = sessions.get(idx) else {
            return Status::Complete;
        };
        self.nodes += 1;

        let mut domain = self.domain(session);
        trace!(depth = idx, size = domain.len(), "expanding");
        domain.shuffle(&mut self.rng);

        for value in domain {
            let assignment = session.assignment(&value.room_id, &value.faculty_id, value.duration);
            if let Err(err) = self.commit(session, &value, &assignment) {
                trace!(depth = idx, %err, "candidate rejected");
                continue;
            }
            match self.backtrack(idx + 1) {
                Status::Complete => return Status::Complete,
                Status::TimedOut => {
                    self.rollback(session, &value, &assignment);
                    return Status::TimedOut;
                }
                Status::Exhausted => self.rollback(session, &value, &assignment),
            }
        }

        Status::Exhausted
    }

    fn domain(&self, session: &Session) -> Vec<DomainValue> {
        match (
            self.subjects.get(&session.subject_id),
            self.batches.get(&session.batch_id),
        ) {
            (Some(subject), Some(batch)) => {
                self.enumerator
                    .enumerate(session, subject, batch, &self.rooms, &self.faculty)
            }
            _ => Vec::new(),
        }
    }

    /// Commits a candidate to every calendar, or to none.
    fn commit(
        &mut self,
        session: &Session,
        value: &DomainValue,
        assignment: &Assignment,
    ) -> Result<(), CalendarError> {
        let (day, start) = (value.day.as_str(), value.start_slot);

        let room = lookup(&mut self.rooms, &value.room_id, day, start)?;
        room.assign(day, start, assignment)?;

        let faculty = match lookup(&mut self.faculty, &value.faculty_id, day, start) {
            Ok(faculty) => faculty,
            Err(err) => {
                self.release_room(value, assignment);
                return Err(err);
            }
        };
        if let Err(err) = faculty.assign(day, start, assignment) {
            self.release_room(value, assignment);
            return Err(err);
        }

        let batch_result = lookup(&mut self.batches, &session.batch_id, day, start)
            .and_then(|batch| batch.assign(day, start, assignment));
        if let Err(err) = batch_result {
            self.release_faculty(value, assignment);
            self.release_room(value, assignment);
            return Err(err);
        }

        self.timetable
            .assign(session.semester, day, start, assignment);
        Ok(())
    }

    /// Exact inverse of a successful [`Search::commit`].
    fn rollback(&mut self, session: &Session, value: &DomainValue, assignment: &Assignment) {
        let (day, start) = (value.day.as_str(), value.start_slot);
        self.timetable
            .unassign(session.semester, day, start, assignment);
        if let Some(batch) = self.batches.get_mut(&session.batch_id) {
            batch.unassign(day, start, assignment);
        }
        self.release_faculty(value, assignment);
        self.release_room(value, assignment);
    }

    fn release_room(&mut self, value: &DomainValue, assignment: &Assignment) {
        if let Some(room) = self.rooms.get_mut(&value.room_id) {
            room.unassign(&value.day, value.start_slot, assignment);
        }
    }

    fn release_faculty(&mut self, value: &DomainValue, assignment: &Assignment) {
        if let Some(faculty) = self.faculty.get_mut(&value.faculty_id) {
            faculty.unassign(&value.day, value.start_slot, assignment);
        }
    }
}

fn lookup<'m, T>(
    map: &'m mut BTreeMap<String, T>,
    id: &str,
    day: &str,
    slot: u32,
) -> Result<&'m mut T, CalendarError> {
    map.get_mut(id).ok_or_else(|| CalendarError::SlotUnavailable {
        entity: id.to_string(),
        day: day.to_string(),
        slot,
    })
}
