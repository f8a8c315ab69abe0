//! Multi-solution driver.
//!
//! Repeats the backtracking search with seeds `random_seed`,
//! `random_seed + 1`, … until `max_solutions` distinct signatures are
//! collected, the attempt cap (`max(1, max_solutions × 20)`) is hit or
//! the wall-clock budget runs out.
//!
//! Each attempt works on its own deep copy of every calendar, so with
//! `parallel_attempts` a wave of seeds runs on the rayon pool and the
//! outcomes are merged in seed order. Results are identical to the
//! sequential run as long as no attempt times out.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info};

use super::domain::DomainEnumerator;
use super::ranking::{score, Solution, SolutionPool};
use super::search::{AttemptOutcome, Search};
use super::sessions::generate_sessions;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::evaluation::{ConstraintEvaluator, EvaluationContext};
use crate::models::{Batch, Faculty, Room, Session, Subject, Timetable};
use crate::validation::validate_input;

/// Engine input: already-expanded reference records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableProblem {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub faculty: Vec<Faculty>,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl TimetableProblem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty.push(faculty);
        self
    }

    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batches.push(batch);
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }
}

/// Timetabling engine.
///
/// # Example
/// ```
/// use u_timetable::config::SolverConfig;
/// use u_timetable::models::{Batch, Faculty, Room, Subject};
/// use u_timetable::scheduler::{TimetableProblem, TimetableSolver};
///
/// let problem = TimetableProblem::new()
///     .with_room(Room::lecture("R1", 40))
///     .with_faculty(Faculty::new("F1", 10).with_subject("MATH"))
///     .with_batch(Batch::new("B1", 1, 30).with_subject("MATH"))
///     .with_subject(Subject::theory("MATH", 3));
///
/// let solver = TimetableSolver::new(problem, SolverConfig::default()).unwrap();
/// let solutions = solver.run().unwrap();
/// assert!(!solutions.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TimetableSolver {
    rooms: BTreeMap<String, Room>,
    faculty: BTreeMap<String, Faculty>,
    batches: BTreeMap<String, Batch>,
    subjects: BTreeMap<String, Subject>,
    config: SolverConfig,
    evaluator: ConstraintEvaluator,
    context: EvaluationContext,
}

fn index_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> &str) -> BTreeMap<String, T> {
    items.into_iter().map(|i| (id(&i).to_string(), i)).collect()
}

impl TimetableSolver {
    /// Validates the input and builds the engine with the standard rules.
    ///
    /// # Errors
    /// [`SolverError::InvalidInput`] listing every validation issue.
    pub fn new(problem: TimetableProblem, config: SolverConfig) -> Result<Self, SolverError> {
        validate_input(&problem, &config).map_err(SolverError::InvalidInput)?;

        let mut faculty = problem.faculty;
        faculty.iter_mut().for_each(Faculty::adopt_preferred_window);

        Ok(Self {
            rooms: index_by_id(problem.rooms, |r| r.id.as_str()),
            faculty: index_by_id(faculty, |f| f.id.as_str()),
            batches: index_by_id(problem.batches, |b| b.id.as_str()),
            subjects: index_by_id(problem.subjects, |s| s.id.as_str()),
            context: EvaluationContext::from_config(&config),
            config,
            evaluator: ConstraintEvaluator::standard(),
        })
    }

    /// Replaces the rule set.
    pub fn with_evaluator(mut self, evaluator: ConstraintEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Ordered session list for the whole problem.
    pub fn generate_sessions(&self) -> Vec<Session> {
        generate_sessions(self.batches.values(), &self.subjects)
    }

    /// One search attempt on fresh copies of every calendar.
    pub fn attempt(&self, sessions: &[Session], seed: u64, deadline: Instant) -> AttemptOutcome {
        let semesters = self.batches.values().map(|b| b.semester);
        let grid = Timetable::with_grid(semesters, &self.context.working_days, &self.context.slots);
        Search::new(
            sessions,
            &self.subjects,
            DomainEnumerator::new(&self.evaluator, &self.context),
            self.rooms.clone(),
            self.faculty.clone(),
            self.batches.clone(),
            grid,
            seed,
            deadline,
        )
        .run()
    }

    /// Collects up to `max_solutions` distinct timetables, best first.
    ///
    /// # Errors
    /// [`SolverError::NoFeasibleSolution`] when no attempt completed.
    pub fn solve(
        &self,
        sessions: &[Session],
        max_solutions: usize,
    ) -> Result<Vec<Solution>, SolverError> {
        let started = Instant::now();
        let deadline = self.config.deadline_from(started);
        let max_attempts = max_solutions.saturating_mul(20).max(1);
        let wave = if self.config.parallel_attempts {
            rayon::current_num_threads().max(1)
        } else {
            1
        };

        info!(
            sessions = sessions.len(),
            max_solutions,
            max_attempts,
            wave,
            "starting timetable search"
        );

        let mut pool = SolutionPool::new();
        let mut attempts = 0usize;
        let mut timed_out = false;

        while pool.len() < max_solutions && attempts < max_attempts && !timed_out {
            if Instant::now() >= deadline {
                timed_out = true;
                break;
            }
            let batch_len = wave.min(max_attempts - attempts);
            let seeds: Vec<u64> = (attempts..attempts + batch_len)
                .map(|n| self.config.random_seed.wrapping_add(n as u64))
                .collect();
            let outcomes: Vec<(u64, AttemptOutcome)> = if batch_len > 1 {
                seeds
                    .par_iter()
                    .map(|&seed| (seed, self.attempt(sessions, seed, deadline)))
                    .collect()
            } else {
                seeds
                    .iter()
                    .map(|&seed| (seed, self.attempt(sessions, seed, deadline)))
                    .collect()
            };

            for (seed, outcome) in outcomes {
                attempts += 1;
                match outcome {
                    AttemptOutcome::Success(timetable) => {
                        if pool.len() >= max_solutions {
                            continue;
                        }
                        let raw = score(&timetable, &self.faculty, &self.rooms);
                        let added = pool.offer(timetable, raw);
                        debug!(seed, score = raw, added, "attempt succeeded");
                    }
                    AttemptOutcome::Exhausted => debug!(seed, "attempt exhausted"),
                    AttemptOutcome::TimedOut => {
                        debug!(seed, "attempt timed out");
                        timed_out = true;
                    }
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis();
        info!(
            attempts,
            solutions = pool.len(),
            timed_out,
            elapsed_ms = elapsed_ms as u64,
            "timetable search finished"
        );

        if pool.is_empty() {
            return Err(SolverError::NoFeasibleSolution {
                attempts,
                elapsed_ms,
            });
        }
        Ok(pool.into_ranked())
    }

    /// Generates sessions, solves for `max_solutions` and keeps `top_k`.
    pub fn run(&self) -> Result<Vec<Solution>, SolverError> {
        let sessions = self.generate_sessions();
        let mut solutions = self.solve(&sessions, self.config.max_solutions)?;
        solutions.truncate(self.config.top_k);
        Ok(solutions)
    }
}
